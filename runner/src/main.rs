// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for playing, checking and viewing rounds
// ═══════════════════════════════════════════════════════════════════════

mod round;

use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jass_agents::{Agent, RandomAgent};
use jass_engine::encoding::{observation_to_json, state_from_json, state_to_json_pretty};
use jass_engine::rules::{audit_trick_scores, GameRule, RuleSchieber};
use jass_engine::setup::deal_seeded;
use jass_engine::state::RoundState;
use jass_engine::types::Player;
use jass_engine::visibility::observation_from_state;
use round::{play_round, RunError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jass-runner", about = "Play and inspect single Jass (Schieber) rounds")]
struct Cli {
    /// Log engine decisions (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one round with random agents
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Dealer seat: 0=North, 1=East, 2=South, 3=West
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..4))]
        dealer: u8,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
        /// Skip the invariant check after every transition
        #[arg(long)]
        no_check: bool,
    },
    /// Decode a state document, check it and list the legal actions
    Check {
        #[arg(short, long)]
        file: String,
    },
    /// Print the observation of one player for a state document
    Observe {
        #[arg(short, long)]
        file: String,
        /// Seat 0..3
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..4))]
        player: u8,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Play { seed, dealer, json, no_check } => cmd_play(seed, seat(dealer), json, !no_check),
        Commands::Check { file } => cmd_check(&file),
        Commands::Observe { file, player } => cmd_observe(&file, seat(player)),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Seat numbers are range-checked by clap.
fn seat(index: u8) -> Player {
    Player::ALL[index as usize % 4]
}

fn read_state(path: &str) -> Result<RoundState, RunError> {
    let text = fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_string(),
        source,
    })?;
    Ok(state_from_json(&text)?)
}

fn cmd_play(seed: u64, dealer: Player, json: bool, check: bool) -> Result<(), RunError> {
    let mut agents: [Box<dyn Agent>; 4] =
        [0, 1, 2, 3].map(|i| Box::new(RandomAgent::new(seed.wrapping_add(i + 1))) as Box<dyn Agent>);
    let state = play_round(&mut agents, deal_seeded(seed), dealer, check)?;

    if json {
        println!("{}", state_to_json_pretty(&state)?);
        return Ok(());
    }

    println!("=== Jass (Schieber) round: seed={}, dealer={} ===\n", seed, dealer);
    if let (Some(trump), Some(declared)) = (state.trump, state.declared_trump) {
        let how = if state.forehand == Some(true) { "forehand" } else { "after push" };
        println!("Trump: {} (declared by {}, {})\n", trump, declared, how);
    }
    for i in 0..state.tricks.nr_tricks {
        let cards: Vec<String> = state.tricks.cards[i].iter().flatten().map(|c| c.to_string()).collect();
        let (first, winner) = (state.tricks.first_player[i], state.tricks.winner[i]);
        println!(
            "  Trick {}: {:<16} led by {:<6} won by {:<6} {:>3} pts",
            i + 1,
            cards.join(" "),
            first.map_or("-".to_string(), |p| p.to_string()),
            winner.map_or("-".to_string(), |p| p.to_string()),
            state.tricks.points[i],
        );
    }
    println!();
    println!("  North/South: {:>3}", state.points[0]);
    println!("  East/West:   {:>3}", state.points[1]);
    Ok(())
}

fn cmd_check(path: &str) -> Result<(), RunError> {
    let state = read_state(path)?;
    let rule = RuleSchieber;
    rule.check_invariants(&state)?;
    println!("{}: consistent ({} cards played, phase {:?})", path, state.tricks.nr_played_cards, state.phase());

    if let Some(trump) = state.trump {
        let mismatches = audit_trick_scores(&rule, &state.tricks, trump);
        for m in &mismatches {
            println!(
                "  trick {}: stored {} pts / {:?}, rules give {} pts / {}",
                m.trick + 1,
                m.stored_points,
                m.stored_winner,
                m.computed_points,
                m.computed_winner
            );
        }
    }

    match state.player {
        Some(player) => {
            let actions: Vec<String> = rule
                .valid_actions_from_state(&state)
                .iter()
                .map(|a| a.to_string())
                .collect();
            println!("{} to act, valid actions: {}", player, actions.join(", "));
        }
        None => println!("round finished: {} / {}", state.points[0], state.points[1]),
    }
    Ok(())
}

fn cmd_observe(path: &str, player: Player) -> Result<(), RunError> {
    let state = read_state(path)?;
    let obs = observation_from_state(&state, player);
    println!("{}", observation_to_json(&obs)?);
    Ok(())
}
