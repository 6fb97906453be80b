// ═══════════════════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

use crate::cards::Card;
use crate::types::{Phase, Player};

/// Usage errors of the round state machine. Any of these is fatal to the
/// round: the caller issued a transition the rules do not allow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("action not allowed in phase {0:?}")]
    WrongPhase(Phase),
    #[error("trump code {0} is outside the valid range")]
    InvalidTrumpCode(i32),
    #[error("full action index {0} is outside the action space")]
    InvalidFullAction(usize),
    #[error("push is only allowed for the forehand player")]
    PushNotAllowed,
    #[error("{player} does not hold {card}")]
    CardNotInHand { player: Player, card: Card },
    #[error("no player to act, the round is finished")]
    NoCurrentPlayer,
    #[error("rearhand trump selection requested for a round declared forehand")]
    NotPushed,
    #[error("card number {0} is outside 0..36")]
    CardNumberOutOfRange(usize),
    #[error("trick {0} cannot take or resolve a card: leader or earlier cards missing")]
    InconsistentTrick(usize),
    #[error("round is not complete ({0} of 36 cards played)")]
    RoundNotComplete(usize),
}

/// Failures while decoding the canonical round record.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("no version information in record")]
    MissingVersion,
    #[error("unexpected format version {found:?}, expected {expected:?}")]
    VersionMismatch { found: String, expected: &'static str },
    #[error("unknown card {0:?}")]
    UnknownCard(String),
    #[error("no first player set in trick {0}")]
    MissingFirstPlayer(usize),
    #[error("{field} value {value} is not a valid player")]
    InvalidPlayer { field: &'static str, value: i32 },
    #[error("trump value {0} is not valid")]
    InvalidTrump(i32),
    #[error("forehand value {0} is not one of -1, 0, 1")]
    InvalidForehand(i32),
    #[error("expected 4 player entries, found {0}")]
    WrongPlayerCount(usize),
    #[error("too many tricks: {0}")]
    TooManyTricks(usize),
    #[error("trick {index} has {count} cards")]
    TrickSize { index: usize, count: usize },
    #[error("trick {0} is incomplete but not the last trick")]
    GapInTricks(usize),
    #[error("hand data for player {player} in observation for player {view}")]
    HandForWrongPlayer { player: usize, view: usize },
    #[error("trick {trick} claims {points} points, at most {max} are possible")]
    InvalidPoints { trick: usize, points: u32, max: u32 },
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A broken consistency rule of a round state. These indicate a bug in
/// whatever produced the state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("trump declaration inconsistent: {0}")]
    TrumpDeclaration(String),
    #[error("first trick led by {found:?}, expected {expected:?}")]
    FirstLeader { expected: Option<Player>, found: Option<Player> },
    #[error("trick {trick} led by {found:?}, but previous trick was won by {expected:?}")]
    LeaderChain { trick: usize, expected: Option<Player>, found: Option<Player> },
    #[error("played card count {played} != 4 * {tricks} + {in_trick}")]
    PlayedCount { played: usize, tricks: usize, in_trick: usize },
    #[error("{found} cards in hands and tricks, expected 36")]
    CardCount { found: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("team {team} has {found} points, tricks give {expected}")]
    TeamPoints { team: usize, expected: u32, found: u32 },
    #[error("current trick holds {found} cards, expected {expected}")]
    CurrentTrick { expected: usize, found: usize },
    #[error("completed trick {trick} has no winner")]
    MissingWinner { trick: usize },
    #[error("{0} is still to act after all cards were played")]
    ActorAfterEnd(Player),
    #[error("{0} cards played, at most 36 exist")]
    TooManyPlayed(usize),
}
