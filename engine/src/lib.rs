pub mod types;
pub mod cards;
pub mod error;
pub mod state;
pub mod visibility;
pub mod rules;
pub mod setup;
pub mod engine;
pub mod encoding;
pub mod history;
pub mod log_entry;

pub use types::*;
pub use cards::{Card, CardSet, NUM_CARDS};
pub use error::{DecodeError, GameError, InvariantViolation};
pub use state::{RoundState, TrickTable};
pub use visibility::{observation_from_state, state_from_observation, Observation};
pub use rules::{GameRule, RuleSchieber};
pub use engine::RoundSim;

#[cfg(test)]
mod tests;
