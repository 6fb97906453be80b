// ═══════════════════════════════════════════════════════════════════════
// Round driver — runs one complete headless round with agents
// ═══════════════════════════════════════════════════════════════════════

use jass_agents::Agent;
use jass_engine::cards::CardSet;
use jass_engine::engine::RoundSim;
use jass_engine::error::{DecodeError, GameError, InvariantViolation};
use jass_engine::rules::GameRule;
use jass_engine::state::RoundState;
use jass_engine::types::Player;
use thiserror::Error;
use tracing::{debug, info};

/// Trump selection takes at most 2 decisions, play exactly 36.
const MAX_DECISIONS: usize = 38;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("round exceeded {0} decisions without finishing")]
    Stuck(usize),
}

/// Play one round: agent `i` sits at `Player::from_index(i)`.
/// With `check`, the invariant checker runs after every transition.
/// Returns the terminal state.
pub fn play_round(
    agents: &mut [Box<dyn Agent>; 4],
    hands: [CardSet; 4],
    dealer: Player,
    check: bool,
) -> Result<RoundState, RunError> {
    let mut sim = RoundSim::schieber(hands, dealer);
    let mut decision_count = 0;

    while !sim.is_done() {
        if decision_count >= MAX_DECISIONS {
            return Err(RunError::Stuck(MAX_DECISIONS));
        }
        let obs = sim.observation()?;
        let agent = &mut agents[obs.player_view.index()];
        let action = agent.decide(&obs)?;
        debug!(player = %obs.player_view, agent = agent.name(), ?action, "decision");

        sim.apply(action)?;
        decision_count += 1;

        if check {
            sim.rule().check_invariants(sim.state())?;
        }
    }

    let state = sim.into_state();
    info!(team_0 = state.points[0], team_1 = state.points[1], "round finished");
    Ok(state)
}
