// ═══════════════════════════════════════════════════════════════════════
// Agent Traits — interface that all decision-makers implement
//
// KEY DESIGN PRINCIPLE:
//   An `Agent` receives an `Observation` (not the RoundState), which only
//   contains information the player is allowed to see: the public trick
//   history and its own hand. The other three hands never reach it.
//
//   A `CheatingAgent` sees the full RoundState. It exists for analysis
//   and baselines, not for fair play.
// ═══════════════════════════════════════════════════════════════════════

use jass_engine::cards::Card;
use jass_engine::error::GameError;
use jass_engine::state::RoundState;
use jass_engine::types::{Action, Phase, TrumpAction};
use jass_engine::visibility::Observation;

/// A decision-maker that plays from its own observation.
pub trait Agent: Send {
    /// Human-readable name for this agent (e.g., "Random", "Remote").
    fn name(&self) -> &str;

    /// Choose a trump action. Push is only valid while the forehand has
    /// not decided (`obs.forehand` is `None`).
    fn action_trump(&mut self, obs: &Observation) -> TrumpAction;

    /// Choose a card to play. Called only in the play phase when it is
    /// the viewer's turn, so at least one card is legal.
    fn action_play_card(&mut self, obs: &Observation) -> Card;

    /// Universal entry point — dispatches on the phase of the observation.
    fn decide(&mut self, obs: &Observation) -> Result<Action, GameError> {
        if !obs.is_own_turn() {
            return Err(GameError::NoCurrentPlayer);
        }
        match obs.phase() {
            Phase::AwaitingTrumpForehand | Phase::AwaitingTrumpRearhand => {
                Ok(Action::Trump(self.action_trump(obs)))
            }
            Phase::Playing => Ok(Action::Card(self.action_play_card(obs))),
            Phase::Done => Err(GameError::WrongPhase(Phase::Done)),
        }
    }
}

/// A decision-maker that sees the full round state, all hands included.
pub trait CheatingAgent: Send {
    fn name(&self) -> &str;

    fn action_trump(&mut self, state: &RoundState) -> TrumpAction;

    fn action_play_card(&mut self, state: &RoundState) -> Card;

    fn decide(&mut self, state: &RoundState) -> Result<Action, GameError> {
        match state.phase() {
            Phase::AwaitingTrumpForehand | Phase::AwaitingTrumpRearhand => {
                Ok(Action::Trump(self.action_trump(state)))
            }
            Phase::Playing => Ok(Action::Card(self.action_play_card(state))),
            Phase::Done => Err(GameError::WrongPhase(Phase::Done)),
        }
    }
}
