// ═══════════════════════════════════════════════════════════════════════
// Core types — players, suits, trumps and the action space
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::GameError;

// ── Players ────────────────────────────────────────────────────────────

/// Seats are numbered clockwise; play proceeds counter-clockwise,
/// so the player after North is West.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    North,
    East,
    South,
    West,
}

impl Player {
    pub const ALL: [Player; 4] = [Player::North, Player::East, Player::South, Player::West];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Player> {
        Player::ALL.get(index).copied()
    }

    /// The player who acts after this one.
    pub fn next(self) -> Player {
        Player::ALL[(self.index() + 3) % 4]
    }

    pub fn partner(self) -> Player {
        Player::ALL[(self.index() + 2) % 4]
    }

    /// Team 0 is North/South, team 1 is East/West.
    pub fn team(self) -> usize {
        self.index() % 2
    }

    pub fn same_team(self, other: Player) -> bool {
        self.team() == other.team()
    }

    /// Player sitting `offset` positions after `self` in play order.
    pub fn after(self, offset: usize) -> Player {
        Player::ALL[(self.index() + 4 - offset % 4) % 4]
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::North => write!(f, "North"),
            Player::East => write!(f, "East"),
            Player::South => write!(f, "South"),
            Player::West => write!(f, "West"),
        }
    }
}

// ── Suits ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Diamonds,
    Hearts,
    Spades,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Diamonds, Suit::Hearts, Suit::Spades, Suit::Clubs];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
            Suit::Clubs => 'C',
        }
    }

    pub fn from_letter(letter: char) -> Option<Suit> {
        Suit::ALL.into_iter().find(|s| s.letter() == letter)
    }
}

// ── Trump ──────────────────────────────────────────────────────────────

/// Trump mode of a round: one of the four suits, or one of the two
/// rank-order modes (ObeAbe: highest card of the led suit wins,
/// UneUfe: lowest card of the led suit wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trump {
    Diamonds,
    Hearts,
    Spades,
    Clubs,
    ObeAbe,
    UneUfe,
}

impl Trump {
    pub const ALL: [Trump; 6] = [
        Trump::Diamonds,
        Trump::Hearts,
        Trump::Spades,
        Trump::Clubs,
        Trump::ObeAbe,
        Trump::UneUfe,
    ];

    /// Wire code: 0..=3 for suits, 4 ObeAbe, 5 UneUfe.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Trump> {
        usize::try_from(code).ok().and_then(|i| Trump::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The trump suit, or `None` for the rank-order modes.
    pub fn suit(self) -> Option<Suit> {
        match self {
            Trump::Diamonds => Some(Suit::Diamonds),
            Trump::Hearts => Some(Suit::Hearts),
            Trump::Spades => Some(Suit::Spades),
            Trump::Clubs => Some(Suit::Clubs),
            Trump::ObeAbe | Trump::UneUfe => None,
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Trump::Diamonds => "D",
            Trump::Hearts => "H",
            Trump::Spades => "S",
            Trump::Clubs => "C",
            Trump::ObeAbe => "O",
            Trump::UneUfe => "U",
        }
    }
}

impl std::fmt::Display for Trump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trump::Diamonds => write!(f, "Diamonds"),
            Trump::Hearts => write!(f, "Hearts"),
            Trump::Spades => write!(f, "Spades"),
            Trump::Clubs => write!(f, "Clubs"),
            Trump::ObeAbe => write!(f, "Obe-Abe"),
            Trump::UneUfe => write!(f, "Une-Ufe"),
        }
    }
}

/// Code of the push action ("Schieben").
pub const PUSH: i32 = 10;

/// Alternative push code used by one-hot encoders; normalised to `PUSH`.
pub const PUSH_ALT: i32 = 6;

/// A decision during trump selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrumpAction {
    Declare(Trump),
    Push,
}

impl TrumpAction {
    pub fn code(self) -> i32 {
        match self {
            TrumpAction::Declare(trump) => trump.code(),
            TrumpAction::Push => PUSH,
        }
    }

    pub fn from_code(code: i32) -> Result<TrumpAction, GameError> {
        match code {
            PUSH | PUSH_ALT => Ok(TrumpAction::Push),
            _ => Trump::from_code(code)
                .map(TrumpAction::Declare)
                .ok_or(GameError::InvalidTrumpCode(code)),
        }
    }
}

// ── Full action space ──────────────────────────────────────────────────

/// Offset of trump actions in the full action space (cards occupy 0..36).
pub const TRUMP_FULL_OFFSET: usize = 36;

/// Index of push in the full action space.
pub const TRUMP_FULL_PUSH: usize = TRUMP_FULL_OFFSET + PUSH_ALT as usize;

/// Size of the full action space: 36 cards, 6 trumps, push.
pub const ACTION_SET_FULL_SIZE: usize = TRUMP_FULL_PUSH + 1;

/// Any action a player can take in a round. Serialized as its index in
/// the full action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Action {
    Trump(TrumpAction),
    Card(Card),
}

impl Action {
    pub fn to_full(self) -> usize {
        match self {
            Action::Card(card) => card.index(),
            Action::Trump(TrumpAction::Declare(trump)) => TRUMP_FULL_OFFSET + trump.index(),
            Action::Trump(TrumpAction::Push) => TRUMP_FULL_PUSH,
        }
    }

    pub fn from_full(full: usize) -> Result<Action, GameError> {
        if full < TRUMP_FULL_OFFSET {
            return Card::from_index(full)
                .map(Action::Card)
                .ok_or(GameError::InvalidFullAction(full));
        }
        if full == TRUMP_FULL_PUSH {
            return Ok(Action::Trump(TrumpAction::Push));
        }
        Trump::ALL
            .get(full - TRUMP_FULL_OFFSET)
            .map(|&t| Action::Trump(TrumpAction::Declare(t)))
            .ok_or(GameError::InvalidFullAction(full))
    }
}

impl TryFrom<usize> for Action {
    type Error = GameError;

    fn try_from(full: usize) -> Result<Action, GameError> {
        Action::from_full(full)
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> usize {
        action.to_full()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Card(card) => write!(f, "{}", card),
            Action::Trump(TrumpAction::Declare(trump)) => write!(f, "{}", trump),
            Action::Trump(TrumpAction::Push) => write!(f, "Push"),
        }
    }
}

// ── Phases ─────────────────────────────────────────────────────────────

/// Position of a round in the trump-selection / play state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    AwaitingTrumpForehand,
    AwaitingTrumpRearhand,
    Playing,
    Done,
}
