// ═══════════════════════════════════════════════════════════════════════
// Random Agent — picks uniformly among the valid actions.
// Serves as baseline, as stand-in for unreachable remote players, and
// for testing engine stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{Agent, CheatingAgent};
use jass_engine::cards::{Card, CardSet};
use jass_engine::rules::{GameRule, RuleSchieber};
use jass_engine::state::RoundState;
use jass_engine::types::{Trump, TrumpAction};
use jass_engine::visibility::Observation;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

pub struct RandomAgent {
    rule: RuleSchieber,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rule: RuleSchieber,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Push with probability ½ while allowed, otherwise one of the six trumps.
    fn choose_trump(&mut self, may_push: bool) -> TrumpAction {
        if may_push && self.rng.gen_bool(0.5) {
            return TrumpAction::Push;
        }
        let trump = Trump::ALL[self.rng.gen_range(0..Trump::ALL.len())];
        TrumpAction::Declare(trump)
    }

    fn choose_card(&mut self, valid: CardSet) -> Card {
        let cards = valid.to_vec();
        *cards.choose(&mut self.rng).expect("no valid card to choose from")
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "Random" }

    fn action_trump(&mut self, obs: &Observation) -> TrumpAction {
        let action = self.choose_trump(obs.forehand.is_none());
        trace!(player = %obs.player_view, ?action, "random trump");
        action
    }

    fn action_play_card(&mut self, obs: &Observation) -> Card {
        let valid = self.rule.legal_cards_from_obs(obs);
        let card = self.choose_card(valid);
        trace!(player = %obs.player_view, %card, "random card");
        card
    }
}

impl CheatingAgent for RandomAgent {
    fn name(&self) -> &str { "Random" }

    fn action_trump(&mut self, state: &RoundState) -> TrumpAction {
        self.choose_trump(state.forehand.is_none())
    }

    fn action_play_card(&mut self, state: &RoundState) -> Card {
        let valid = self.rule.legal_cards_from_state(state);
        self.choose_card(valid)
    }
}
