// ═══════════════════════════════════════════════════════════════════════
// Round state — the authoritative record of one round
//
// The state holds only data. All consistent mutation goes through the
// simulator in engine.rs; the rules in rules.rs read it.
//
// The trick in progress is never stored as a separate reference: it is
// always row `nr_tricks` of the trick table, reached via accessors.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardSet, NUM_CARDS};
use crate::encoding::RoundRecord;
use crate::types::{Phase, Player, Trump};

pub const NUM_TRICKS: usize = 9;
pub const CARDS_PER_TRICK: usize = 4;

/// History of the tricks of a round, shared by the full state and by
/// observations (everything here is public information).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrickTable {
    /// Cards of each trick in play order, `None` where not yet played.
    pub cards: [[Option<Card>; CARDS_PER_TRICK]; NUM_TRICKS],
    /// Winner of each completed trick.
    pub winner: [Option<Player>; NUM_TRICKS],
    /// Points of each completed trick (last-trick bonus included).
    pub points: [u32; NUM_TRICKS],
    /// Player leading each trick, set as soon as it is known.
    pub first_player: [Option<Player>; NUM_TRICKS],
    /// Number of completed tricks.
    pub nr_tricks: usize,
    /// Number of cards in the trick in progress.
    pub nr_cards_in_trick: usize,
    /// Total number of cards played (derived).
    pub nr_played_cards: usize,
}

impl Default for TrickTable {
    fn default() -> Self {
        TrickTable::new()
    }
}

impl TrickTable {
    pub fn new() -> TrickTable {
        TrickTable {
            cards: [[None; CARDS_PER_TRICK]; NUM_TRICKS],
            winner: [None; NUM_TRICKS],
            points: [0; NUM_TRICKS],
            first_player: [None; NUM_TRICKS],
            nr_tricks: 0,
            nr_cards_in_trick: 0,
            nr_played_cards: 0,
        }
    }

    /// Index of the trick in progress, `None` once all 36 cards are played.
    pub fn current_index(&self) -> Option<usize> {
        (self.nr_played_cards < NUM_CARDS && self.nr_tricks < NUM_TRICKS).then_some(self.nr_tricks)
    }

    pub fn current_trick(&self) -> Option<&[Option<Card>; CARDS_PER_TRICK]> {
        self.current_index().map(|i| &self.cards[i])
    }

    /// Player leading the trick in progress, if known.
    pub fn current_first_player(&self) -> Option<Player> {
        self.current_index().and_then(|i| self.first_player[i])
    }

    /// The `card_nr`-th card played in the round (0-based).
    pub fn card_played(&self, card_nr: usize) -> Option<Card> {
        let (trick, pos) = (card_nr / CARDS_PER_TRICK, card_nr % CARDS_PER_TRICK);
        self.cards.get(trick).and_then(|t| t[pos])
    }

    /// All four cards of trick `index`, if it has been filled.
    pub fn complete_trick(&self, index: usize) -> Option<[Card; CARDS_PER_TRICK]> {
        let trick = self.cards.get(index)?;
        Some([trick[0]?, trick[1]?, trick[2]?, trick[3]?])
    }

    /// Player who played position `pos` of trick `index`.
    pub fn player_at(&self, index: usize, pos: usize) -> Option<Player> {
        self.first_player.get(index).copied().flatten().map(|p| p.after(pos))
    }

    pub fn played_cards(&self) -> CardSet {
        self.cards.iter().flatten().flatten().copied().collect()
    }

    /// Team points recomputed from the winners and points of completed tricks.
    /// Saturates instead of overflowing on a corrupted table.
    pub fn team_points(&self) -> [u32; 2] {
        let mut points: [u32; 2] = [0; 2];
        for i in 0..self.nr_tricks.min(NUM_TRICKS) {
            if let Some(winner) = self.winner[i] {
                points[winner.team()] = points[winner.team()].saturating_add(self.points[i]);
            }
        }
        points
    }
}

/// The player who declared trump, given the dealer and whether trump was
/// declared forehand.
pub fn declaring_player(dealer: Player, forehand: bool) -> Player {
    if forehand {
        dealer.next()
    } else {
        dealer.next().partner()
    }
}

/// State-machine phase implied by the trump / forehand / card-count fields.
pub fn phase_of(trump: Option<Trump>, forehand: Option<bool>, nr_played_cards: usize) -> Phase {
    match (trump, forehand) {
        (None, None) => Phase::AwaitingTrumpForehand,
        (None, Some(_)) => Phase::AwaitingTrumpRearhand,
        (Some(_), _) if nr_played_cards >= NUM_CARDS => Phase::Done,
        (Some(_), _) => Phase::Playing,
    }
}

/// Full state of a round. Serializes as the canonical round record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoundRecord", into = "RoundRecord")]
pub struct RoundState {
    pub dealer: Player,
    /// Player of the next action; `None` once the round is over.
    pub player: Option<Player>,
    pub trump: Option<Trump>,
    /// `None` before any trump action, `Some(true)` if declared forehand,
    /// `Some(false)` once pushed to the rearhand.
    pub forehand: Option<bool>,
    /// Player who declared trump (derived).
    pub declared_trump: Option<Player>,
    /// Current hand of every player, indexed by `Player::index`.
    pub hands: [CardSet; 4],
    pub tricks: TrickTable,
    /// Points of team 0 (North/South) and team 1 (East/West).
    pub points: [u32; 2],
}

impl RoundState {
    /// Freshly dealt round: trump undeclared, forehand (dealer's next) to act.
    pub fn new(dealer: Player, hands: [CardSet; 4]) -> RoundState {
        RoundState {
            dealer,
            player: Some(dealer.next()),
            trump: None,
            forehand: None,
            declared_trump: None,
            hands,
            tricks: TrickTable::new(),
            points: [0; 2],
        }
    }

    pub fn phase(&self) -> Phase {
        phase_of(self.trump, self.forehand, self.tricks.nr_played_cards)
    }

    pub fn hand(&self, player: Player) -> CardSet {
        self.hands[player.index()]
    }

    pub fn is_done(&self) -> bool {
        self.tricks.nr_played_cards == NUM_CARDS
    }

    pub fn current_trick(&self) -> Option<&[Option<Card>; CARDS_PER_TRICK]> {
        self.tricks.current_trick()
    }

    /// The `card_nr`-th card played in the round.
    pub fn card_played(&self, card_nr: usize) -> Option<Card> {
        self.tricks.card_played(card_nr)
    }
}
