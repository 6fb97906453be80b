// ═══════════════════════════════════════════════════════════════════════
// Rules — legal cards, trick winner, trick points, state consistency
//
// Everything here is a pure function of its inputs. A rule variant only
// decides which cards may be played and how tricks are scored; how trump
// is selected and how turns advance is the simulator's job.
// ═══════════════════════════════════════════════════════════════════════

use tracing::warn;

use crate::cards::{higher_trumps, is_higher_trump, Card, CardSet, JACK, LAST_TRICK_BONUS, NUM_CARDS};
use crate::error::InvariantViolation;
use crate::state::{declaring_player, RoundState, TrickTable, CARDS_PER_TRICK, NUM_TRICKS};
use crate::types::{Action, Phase, Player, Suit, Trump, TrumpAction};
use crate::visibility::Observation;

/// A rule variant of the game.
pub trait GameRule {
    /// Cards in `hand` that may be played as move `move_nr` (0..=3) of a
    /// trick whose earlier moves are `trick[..move_nr]`.
    fn legal_cards(
        &self,
        hand: CardSet,
        trick: &[Option<Card>; CARDS_PER_TRICK],
        move_nr: usize,
        trump: Trump,
    ) -> CardSet;

    /// Points of a completed trick.
    fn trick_points(&self, trick: &[Card; CARDS_PER_TRICK], is_last: bool, trump: Trump) -> u32;

    /// Winner of a completed trick led by `first_player`.
    fn trick_winner(&self, trick: &[Card; CARDS_PER_TRICK], first_player: Player, trump: Trump) -> Player;

    /// Validate the internal consistency of a full round state.
    fn check_invariants(&self, state: &RoundState) -> Result<(), InvariantViolation>;

    // ── Provided ───────────────────────────────────────────────────────

    /// Legal cards for the player to act in `state`; empty outside of play.
    fn legal_cards_from_state(&self, state: &RoundState) -> CardSet {
        match (state.phase(), state.player, state.trump, state.current_trick()) {
            (Phase::Playing, Some(player), Some(trump), Some(trick)) => {
                self.legal_cards(state.hand(player), trick, state.tricks.nr_cards_in_trick, trump)
            }
            _ => CardSet::EMPTY,
        }
    }

    /// Legal cards for the viewer of `obs`. The observation must belong to
    /// the player to act; otherwise the result is empty.
    fn legal_cards_from_obs(&self, obs: &Observation) -> CardSet {
        if !obs.is_own_turn() {
            return CardSet::EMPTY;
        }
        match (obs.phase(), obs.trump, obs.current_trick()) {
            (Phase::Playing, Some(trump), Some(trick)) => {
                self.legal_cards(obs.hand, trick, obs.tricks.nr_cards_in_trick, trump)
            }
            _ => CardSet::EMPTY,
        }
    }

    /// Every action the player to act may take.
    fn valid_actions_from_state(&self, state: &RoundState) -> Vec<Action> {
        match state.phase() {
            Phase::Playing => self.legal_cards_from_state(state).iter().map(Action::Card).collect(),
            phase => trump_actions(phase),
        }
    }

    fn valid_actions_from_obs(&self, obs: &Observation) -> Vec<Action> {
        match obs.phase() {
            Phase::Playing => self.legal_cards_from_obs(obs).iter().map(Action::Card).collect(),
            phase => trump_actions(phase),
        }
    }
}

fn trump_actions(phase: Phase) -> Vec<Action> {
    let declare = Trump::ALL.iter().map(|&t| Action::Trump(TrumpAction::Declare(t)));
    match phase {
        Phase::AwaitingTrumpForehand => declare.chain([Action::Trump(TrumpAction::Push)]).collect(),
        Phase::AwaitingTrumpRearhand => declare.collect(),
        Phase::Playing | Phase::Done => Vec::new(),
    }
}

/// Rules of the Schieber variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSchieber;

/// Weakest trump among the cards of the 2nd and 3rd actors, if any of them trumped.
fn lowest_trump_played(trick: &[Option<Card>; CARDS_PER_TRICK], move_nr: usize, trump_suit: Suit) -> Option<Card> {
    trick[1..move_nr.min(CARDS_PER_TRICK)]
        .iter()
        .flatten()
        .copied()
        .filter(|c| c.suit() == trump_suit)
        .fold(None, |lowest, card| match lowest {
            Some(low) if !is_higher_trump(card, low) => Some(low),
            _ => Some(card),
        })
}

impl GameRule for RuleSchieber {
    fn legal_cards(
        &self,
        hand: CardSet,
        trick: &[Option<Card>; CARDS_PER_TRICK],
        move_nr: usize,
        trump: Trump,
    ) -> CardSet {
        // leading a trick: anything goes
        let led = match (move_nr, trick[0]) {
            (0, _) | (_, None) => return hand,
            (_, Some(card)) => card,
        };
        let led_suit = led.suit();
        let led_cards = hand.suit(led_suit);

        let trump_suit = match trump.suit() {
            Some(suit) => suit,
            // obe / une: follow suit if possible
            None => return if led_cards.is_empty() { hand } else { led_cards },
        };
        let trump_cards = hand.suit(trump_suit);

        if led_suit == trump_suit {
            return match trump_cards.len() {
                0 => hand,
                // the lone trump jack never has to be played
                1 if trump_cards.contains(Card::new(trump_suit, JACK)) => hand,
                _ => trump_cards,
            };
        }

        match lowest_trump_played(trick, move_nr, trump_suit) {
            None => {
                if led_cards.is_empty() {
                    hand
                } else {
                    led_cards | trump_cards
                }
            }
            Some(lowest) => {
                // only trumps left: no undertrump restriction
                if trump_cards == hand {
                    return hand;
                }
                let higher = trump_cards & higher_trumps(lowest);
                let lower = trump_cards - higher;
                if led_cards.is_empty() {
                    hand - lower
                } else {
                    led_cards | higher
                }
            }
        }
    }

    fn trick_points(&self, trick: &[Card; CARDS_PER_TRICK], is_last: bool, trump: Trump) -> u32 {
        let points: u32 = trick.iter().map(|c| c.points(trump)).sum();
        if is_last {
            points + LAST_TRICK_BONUS
        } else {
            points
        }
    }

    fn trick_winner(&self, trick: &[Card; CARDS_PER_TRICK], first_player: Player, trump: Trump) -> Player {
        let led_suit = trick[0].suit();
        let mut winner = 0;

        match trump.suit() {
            None => {
                // within a suit a higher id is a lower card
                for (i, &card) in trick.iter().enumerate().skip(1) {
                    if card.suit() != led_suit {
                        continue;
                    }
                    let better = match trump {
                        Trump::UneUfe => card > trick[winner],
                        _ => card < trick[winner],
                    };
                    if better {
                        winner = i;
                    }
                }
            }
            Some(trump_suit) if led_suit == trump_suit => {
                for (i, &card) in trick.iter().enumerate().skip(1) {
                    if card.suit() == trump_suit && is_higher_trump(trick[winner], card) {
                        winner = i;
                    }
                }
            }
            Some(trump_suit) => {
                let mut trump_played = false;
                for (i, &card) in trick.iter().enumerate().skip(1) {
                    if card.suit() == trump_suit {
                        if !trump_played || is_higher_trump(trick[winner], card) {
                            winner = i;
                            trump_played = true;
                        }
                    } else if !trump_played && card.suit() == led_suit && card < trick[winner] {
                        winner = i;
                    }
                }
            }
        }

        first_player.after(winner)
    }

    fn check_invariants(&self, state: &RoundState) -> Result<(), InvariantViolation> {
        check_trump_declaration(state)?;

        let tricks = &state.tricks;
        if tricks.nr_played_cards > NUM_CARDS {
            return Err(InvariantViolation::TooManyPlayed(tricks.nr_played_cards));
        }
        if tricks.nr_played_cards != 4 * tricks.nr_tricks + tricks.nr_cards_in_trick
            || tricks.nr_cards_in_trick >= CARDS_PER_TRICK
        {
            return Err(InvariantViolation::PlayedCount {
                played: tricks.nr_played_cards,
                tricks: tricks.nr_tricks,
                in_trick: tricks.nr_cards_in_trick,
            });
        }

        if let Some(trick) = (0..tricks.nr_tricks.min(NUM_TRICKS)).find(|&i| tricks.winner[i].is_none()) {
            return Err(InvariantViolation::MissingWinner { trick });
        }

        // leader chain
        let forehand_player = state.dealer.next();
        if tricks.nr_played_cards > 0 && tricks.first_player[0] != Some(forehand_player) {
            return Err(InvariantViolation::FirstLeader {
                expected: Some(forehand_player),
                found: tricks.first_player[0],
            });
        }
        for i in 1..=tricks.nr_tricks.min(NUM_TRICKS - 1) {
            let in_progress_unset = i == tricks.nr_tricks && tricks.first_player[i].is_none();
            if tricks.winner[i - 1] != tricks.first_player[i] && !in_progress_unset {
                return Err(InvariantViolation::LeaderChain {
                    trick: i,
                    expected: tricks.winner[i - 1],
                    found: tricks.first_player[i],
                });
            }
        }

        // every card exactly once across hands and tricks
        let mut seen = CardSet::EMPTY;
        let mut total = 0;
        let held = state.hands.iter().flat_map(|h| h.iter());
        let played = tricks.cards.iter().flatten().flatten().copied();
        for card in held.chain(played) {
            if seen.contains(card) {
                return Err(InvariantViolation::DuplicateCard(card));
            }
            seen.insert(card);
            total += 1;
        }
        if total != NUM_CARDS {
            return Err(InvariantViolation::CardCount { found: total });
        }

        let expected = tricks.team_points();
        for team in 0..2 {
            if expected[team] != state.points[team] {
                return Err(InvariantViolation::TeamPoints {
                    team,
                    expected: expected[team],
                    found: state.points[team],
                });
            }
        }

        match tricks.current_trick() {
            None => {
                if let Some(player) = state.player {
                    return Err(InvariantViolation::ActorAfterEnd(player));
                }
            }
            Some(trick) => {
                let found = trick.iter().flatten().count();
                let expected = tricks.nr_played_cards % CARDS_PER_TRICK;
                if found != expected {
                    return Err(InvariantViolation::CurrentTrick { expected, found });
                }
            }
        }

        Ok(())
    }
}

fn check_trump_declaration(state: &RoundState) -> Result<(), InvariantViolation> {
    let fail = |msg: String| Err(InvariantViolation::TrumpDeclaration(msg));
    match state.forehand {
        Some(true) => {
            let expected = declaring_player(state.dealer, true);
            if state.trump.is_none() {
                return fail("declared forehand but no trump set".to_string());
            }
            if state.declared_trump != Some(expected) {
                return fail(format!("declared by {:?}, forehand is {}", state.declared_trump, expected));
            }
        }
        Some(false) => {
            let expected = declaring_player(state.dealer, false);
            if state.trump.is_some() && state.declared_trump != Some(expected) {
                return fail(format!("declared by {:?}, rearhand is {}", state.declared_trump, expected));
            }
        }
        None => {
            if let Some(trump) = state.trump {
                return fail(format!("trump {} set before any trump action", trump));
            }
        }
    }
    Ok(())
}

/// Disagreement between a stored trick result and the one the rules compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrickAudit {
    pub trick: usize,
    pub stored_points: u32,
    pub computed_points: u32,
    pub stored_winner: Option<Player>,
    pub computed_winner: Player,
}

/// Recompute points and winner of every completed trick and report the
/// tricks whose stored values differ. Stored values are left untouched.
pub fn audit_trick_scores<R: GameRule + ?Sized>(rule: &R, tricks: &TrickTable, trump: Trump) -> Vec<TrickAudit> {
    let mut mismatches = Vec::new();
    for i in 0..tricks.nr_tricks.min(NUM_TRICKS) {
        let (Some(cards), Some(first)) = (tricks.complete_trick(i), tricks.first_player[i]) else {
            continue;
        };
        let computed_points = rule.trick_points(&cards, i == NUM_TRICKS - 1, trump);
        let computed_winner = rule.trick_winner(&cards, first, trump);
        if computed_points != tricks.points[i] || Some(computed_winner) != tricks.winner[i] {
            warn!(
                trick = i,
                stored_points = tricks.points[i],
                computed_points,
                ?computed_winner,
                "stored trick result differs from recomputed result"
            );
            mismatches.push(TrickAudit {
                trick: i,
                stored_points: tricks.points[i],
                computed_points,
                stored_winner: tricks.winner[i],
                computed_winner,
            });
        }
    }
    mismatches
}
