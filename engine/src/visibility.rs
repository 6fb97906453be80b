// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// In a round of Jass, information is split between:
//   PUBLIC  — dealer, trump and who declared it, every played trick,
//             trick winners and points, team totals, who is to act
//   PRIVATE — a player's own remaining hand
//
// An Observation is the round as one player is allowed to see it.
// Decision-makers MUST only receive an Observation, never the RoundState.
// It is an owned snapshot: nothing in it borrows from the state, so later
// mutation of the round cannot leak into an observation already handed out.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardSet};
use crate::encoding::ObservationRecord;
use crate::state::{phase_of, RoundState, TrickTable, CARDS_PER_TRICK};
use crate::types::{Phase, Player, Trump};

/// The view of a round that a specific player is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ObservationRecord", into = "ObservationRecord")]
pub struct Observation {
    // ── Public info ────────────────────────────────────────
    pub dealer: Player,
    /// Player of the next action; `None` once the round is over.
    pub player: Option<Player>,
    /// Player whose hand is visible in this observation.
    pub player_view: Player,
    pub trump: Option<Trump>,
    pub forehand: Option<bool>,
    pub declared_trump: Option<Player>,
    pub tricks: TrickTable,
    pub points: [u32; 2],

    // ── Private info (only for the viewer) ─────────────────
    pub hand: CardSet,
}

impl Observation {
    pub fn phase(&self) -> Phase {
        phase_of(self.trump, self.forehand, self.tricks.nr_played_cards)
    }

    pub fn current_trick(&self) -> Option<&[Option<Card>; CARDS_PER_TRICK]> {
        self.tricks.current_trick()
    }

    /// True if the viewer is the player to act.
    pub fn is_own_turn(&self) -> bool {
        self.player == Some(self.player_view)
    }

    /// Points of the viewer's team and of the opponents.
    pub fn points_own_other(&self) -> (u32, u32) {
        let team = self.player_view.team();
        (self.points[team], self.points[1 - team])
    }
}

/// Build the observation of `viewer`.
pub fn observation_from_state(state: &RoundState, viewer: Player) -> Observation {
    let hand = if state.is_done() { CardSet::EMPTY } else { state.hand(viewer) };
    Observation {
        dealer: state.dealer,
        player: state.player,
        player_view: viewer,
        trump: state.trump,
        forehand: state.forehand,
        declared_trump: state.declared_trump,
        tricks: state.tricks.clone(),
        points: state.points,
        hand,
    }
}

/// Rebuild a full state from an observation and the hands of all players.
/// The hands must be consistent with the observation.
pub fn state_from_observation(obs: &Observation, hands: [CardSet; 4]) -> RoundState {
    RoundState {
        dealer: obs.dealer,
        player: obs.player,
        trump: obs.trump,
        forehand: obs.forehand,
        declared_trump: obs.declared_trump,
        hands,
        tricks: obs.tricks.clone(),
        points: obs.points,
    }
}
