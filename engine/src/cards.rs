// ═══════════════════════════════════════════════════════════════════════
// Cards, card sets and static scoring / ranking tables
// ═══════════════════════════════════════════════════════════════════════

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub};
use std::str::FromStr;

use crate::error::DecodeError;
use crate::types::{Suit, Trump};

pub const NUM_CARDS: usize = 36;
pub const CARDS_PER_SUIT: usize = 9;

// ── Rank offsets within a suit ─────────────────────────────────────────

pub const ACE: u8 = 0;
pub const KING: u8 = 1;
pub const QUEEN: u8 = 2;
pub const JACK: u8 = 3;
pub const TEN: u8 = 4;
pub const NINE: u8 = 5;
pub const EIGHT: u8 = 6;
pub const SEVEN: u8 = 7;
pub const SIX: u8 = 8;

const RANK_STRINGS: [&str; CARDS_PER_SUIT] = ["A", "K", "Q", "J", "10", "9", "8", "7", "6"];

// ── Card ───────────────────────────────────────────────────────────────

/// A card id 0..36. Suit is `id / 9`, rank offset is `id % 9`
/// (A, K, Q, J, 10, 9, 8, 7, 6), so within a suit a lower id is a
/// higher card in natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    pub const fn new(suit: Suit, rank: u8) -> Card {
        Card(suit as u8 * CARDS_PER_SUIT as u8 + rank)
    }

    pub fn from_index(index: usize) -> Option<Card> {
        (index < NUM_CARDS).then_some(Card(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn suit(self) -> Suit {
        Suit::ALL[self.index() / CARDS_PER_SUIT]
    }

    pub fn rank(self) -> u8 {
        self.0 % CARDS_PER_SUIT as u8
    }

    pub fn is_jack(self) -> bool {
        self.rank() == JACK
    }

    /// Score of this card under the given trump.
    pub fn points(self, trump: Trump) -> u32 {
        POINT_VALUES[trump.index()][self.index()]
    }

    /// All 36 cards in id order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..NUM_CARDS as u8).map(Card)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit().letter(), RANK_STRINGS[self.rank() as usize])
    }
}

impl FromStr for Card {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Card, DecodeError> {
        let mut chars = s.chars();
        let suit = chars
            .next()
            .and_then(Suit::from_letter)
            .ok_or_else(|| DecodeError::UnknownCard(s.to_string()))?;
        let rank = RANK_STRINGS
            .iter()
            .position(|&r| r == chars.as_str())
            .ok_or_else(|| DecodeError::UnknownCard(s.to_string()))?;
        Ok(Card::new(suit, rank as u8))
    }
}

#[allow(dead_code)]
pub mod ids {
    //! Named constants for every card, handy in tests and hand-written deals.
    use super::Card;

    pub const DA: Card = Card(0);
    pub const DK: Card = Card(1);
    pub const DQ: Card = Card(2);
    pub const DJ: Card = Card(3);
    pub const D10: Card = Card(4);
    pub const D9: Card = Card(5);
    pub const D8: Card = Card(6);
    pub const D7: Card = Card(7);
    pub const D6: Card = Card(8);
    pub const HA: Card = Card(9);
    pub const HK: Card = Card(10);
    pub const HQ: Card = Card(11);
    pub const HJ: Card = Card(12);
    pub const H10: Card = Card(13);
    pub const H9: Card = Card(14);
    pub const H8: Card = Card(15);
    pub const H7: Card = Card(16);
    pub const H6: Card = Card(17);
    pub const SA: Card = Card(18);
    pub const SK: Card = Card(19);
    pub const SQ: Card = Card(20);
    pub const SJ: Card = Card(21);
    pub const S10: Card = Card(22);
    pub const S9: Card = Card(23);
    pub const S8: Card = Card(24);
    pub const S7: Card = Card(25);
    pub const S6: Card = Card(26);
    pub const CA: Card = Card(27);
    pub const CK: Card = Card(28);
    pub const CQ: Card = Card(29);
    pub const CJ: Card = Card(30);
    pub const C10: Card = Card(31);
    pub const C9: Card = Card(32);
    pub const C8: Card = Card(33);
    pub const C7: Card = Card(34);
    pub const C6: Card = Card(35);
}

// ── CardSet ────────────────────────────────────────────────────────────

/// A set of cards, one bit per card id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CardSet(u64);

const FULL_MASK: u64 = (1 << NUM_CARDS) - 1;
const SUIT_MASK: u64 = (1 << CARDS_PER_SUIT) - 1;

impl CardSet {
    pub const EMPTY: CardSet = CardSet(0);
    pub const FULL: CardSet = CardSet(FULL_MASK);

    pub fn from_bits(bits: u64) -> CardSet {
        CardSet(bits & FULL_MASK)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn of_suit(suit: Suit) -> CardSet {
        CardSet(SUIT_MASK << (suit.index() * CARDS_PER_SUIT))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, card: Card) -> bool {
        self.0 & (1 << card.0) != 0
    }

    pub fn insert(&mut self, card: Card) {
        self.0 |= 1 << card.0;
    }

    pub fn remove(&mut self, card: Card) {
        self.0 &= !(1 << card.0);
    }

    /// Cards of this set belonging to `suit`.
    pub fn suit(self, suit: Suit) -> CardSet {
        self & CardSet::of_suit(suit)
    }

    pub fn has_suit(self, suit: Suit) -> bool {
        !self.suit(suit).is_empty()
    }

    /// Number of cards held in each suit, in suit order D, H, S, C.
    pub fn suit_counts(self) -> [usize; 4] {
        Suit::ALL.map(|s| self.suit(s).len())
    }

    pub fn iter(self) -> CardSetIter {
        CardSetIter(self.0)
    }

    pub fn to_vec(self) -> Vec<Card> {
        self.iter().collect()
    }

    /// Card strings in id order, e.g. `["DA", "H10"]`.
    pub fn to_strings(self) -> Vec<String> {
        self.iter().map(|c| c.to_string()).collect()
    }

    pub fn from_strings<S: AsRef<str>>(cards: &[S]) -> Result<CardSet, DecodeError> {
        cards.iter().map(|s| s.as_ref().parse::<Card>()).collect()
    }
}

pub struct CardSetIter(u64);

impl Iterator for CardSetIter {
    type Item = Card;

    fn next(&mut self) -> Option<Card> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(Card(id))
    }
}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = CardSetIter;

    fn into_iter(self) -> CardSetIter {
        self.iter()
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> CardSet {
        let mut set = CardSet::EMPTY;
        for card in iter {
            set.insert(card);
        }
        set
    }
}

impl From<Card> for CardSet {
    fn from(card: Card) -> CardSet {
        CardSet(1 << card.0)
    }
}

impl BitOr for CardSet {
    type Output = CardSet;
    fn bitor(self, rhs: CardSet) -> CardSet {
        CardSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for CardSet {
    fn bitor_assign(&mut self, rhs: CardSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CardSet {
    type Output = CardSet;
    fn bitand(self, rhs: CardSet) -> CardSet {
        CardSet(self.0 & rhs.0)
    }
}

impl BitAndAssign for CardSet {
    fn bitand_assign(&mut self, rhs: CardSet) {
        self.0 &= rhs.0;
    }
}

impl Sub for CardSet {
    type Output = CardSet;
    fn sub(self, rhs: CardSet) -> CardSet {
        CardSet(self.0 & !rhs.0)
    }
}

impl Not for CardSet {
    type Output = CardSet;
    fn not(self) -> CardSet {
        CardSet(!self.0 & FULL_MASK)
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for card in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", card)?;
            first = false;
        }
        Ok(())
    }
}

// ── Scoring table ──────────────────────────────────────────────────────

/// Points per card (columns, card id order) for each trump (rows, trump code order).
#[rustfmt::skip]
pub static POINT_VALUES: [[u32; NUM_CARDS]; 6] = [
    // DA DK DQ DJ D10 D9 D8 D7 D6 HA HK HQ HJ H10 H9 H8 H7 H6 SA SK SQ SJ S10 S9 S8 S7 S6 CA CK CQ CJ C10 C9 C8 C7 C6
    [11, 4, 3,20, 10,14, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0],
    [11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3,20, 10,14, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0],
    [11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3,20, 10,14, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0],
    [11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3, 2, 10, 0, 0, 0, 0,11, 4, 3,20, 10,14, 0, 0, 0],
    [11, 4, 3, 2, 10, 0, 8, 0, 0,11, 4, 3, 2, 10, 0, 8, 0, 0,11, 4, 3, 2, 10, 0, 8, 0, 0,11, 4, 3, 2, 10, 0, 8, 0, 0],
    [ 0, 4, 3, 2, 10, 0, 8, 0,11, 0, 4, 3, 2, 10, 0, 8, 0,11, 0, 4, 3, 2, 10, 0, 8, 0,11, 0, 4, 3, 2, 10, 0, 8, 0,11],
];

/// Bonus for winning the last trick.
pub const LAST_TRICK_BONUS: u32 = 5;

/// Most points one trick can carry: trump jack and nine, two aces, last-trick bonus.
pub const MAX_TRICK_POINTS: u32 = 20 + 14 + 11 + 11 + LAST_TRICK_BONUS;

// ── Trump ranking ──────────────────────────────────────────────────────

/// `HIGHER_TRUMP_RANK[a][b]`: within the trump suit, rank `b` beats rank `a`.
/// Trump order from high to low: J, 9, A, K, Q, 10, 8, 7, 6.
#[rustfmt::skip]
const HIGHER_TRUMP_RANK: [[bool; CARDS_PER_SUIT]; CARDS_PER_SUIT] = {
    const T: bool = true;
    const F: bool = false;
    [
        //A  K  Q  J  10 9  8  7  6
        [F, F, F, T, F, T, F, F, F], // A
        [T, F, F, T, F, T, F, F, F], // K
        [T, T, F, T, F, T, F, F, F], // Q
        [F, F, F, F, F, F, F, F, F], // J
        [T, T, T, T, F, T, F, F, F], // 10
        [F, F, F, T, F, F, F, F, F], // 9
        [T, T, T, T, T, T, F, F, F], // 8
        [T, T, T, T, T, T, T, F, F], // 7
        [T, T, T, T, T, T, T, T, F], // 6
    ]
};

/// True if `other` is a strictly higher trump than `card` (both of the same suit).
pub fn is_higher_trump(card: Card, other: Card) -> bool {
    card.suit() == other.suit() && HIGHER_TRUMP_RANK[card.rank() as usize][other.rank() as usize]
}

/// True if `other` is a lower trump than `card`, or the card itself
/// (both of the same suit).
pub fn is_lower_or_equal_trump(card: Card, other: Card) -> bool {
    card.suit() == other.suit() && !HIGHER_TRUMP_RANK[card.rank() as usize][other.rank() as usize]
}

/// Cards of the same suit that outrank `card` as trump.
pub fn higher_trumps(card: Card) -> CardSet {
    CardSet::of_suit(card.suit())
        .iter()
        .filter(|&other| is_higher_trump(card, other))
        .collect()
}

/// Cards of the same suit that do not outrank `card` as trump (includes `card`).
pub fn lower_trumps(card: Card) -> CardSet {
    CardSet::of_suit(card.suit()) - higher_trumps(card)
}
