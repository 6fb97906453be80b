// ═══════════════════════════════════════════════════════════════════════
// Round setup — dealing and the initial RoundState
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cards::{Card, CardSet, NUM_CARDS};
use crate::state::RoundState;
use crate::types::Player;

const CARDS_PER_PLAYER: usize = NUM_CARDS / 4;

/// Shuffle the deck and deal 9 cards to each player.
pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> [CardSet; 4] {
    let mut deck: Vec<Card> = Card::all().collect();
    deck.shuffle(rng);

    let mut hands = [CardSet::EMPTY; 4];
    for (hand, cards) in hands.iter_mut().zip(deck.chunks(CARDS_PER_PLAYER)) {
        *hand = cards.iter().copied().collect();
    }
    hands
}

/// Deal with a ChaCha8 generator seeded from `seed`.
pub fn deal_seeded(seed: u64) -> [CardSet; 4] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deal(&mut rng)
}

/// Create a freshly dealt round. Seed controls the shuffle for reproducibility.
pub fn create_initial_state(dealer: Player, seed: u64) -> RoundState {
    RoundState::new(dealer, deal_seeded(seed))
}
