// ═══════════════════════════════════════════════════════════════════════
// Round Simulator — trump selection and card play state machine
//
// Architecture:
//   The simulator is a pure state machine. It never does I/O or asks a
//   decision-maker. A driver reads `observation()`, asks the acting
//   player, and feeds the answer back via `declare_trump()`,
//   `play_card()` or `apply()`.
//
// Flow:
//   AwaitingTrumpForehand ──push──▶ AwaitingTrumpRearhand
//            │                              │
//            └───────── declare ────────────┴──▶ Playing ──36 cards──▶ Done
//
// The simulator checks phase, hand membership and that the trick in
// progress can take the card. Legality of a card is the caller's
// business (see `GameRule::legal_cards_from_state`).
// ═══════════════════════════════════════════════════════════════════════

use tracing::{debug, info, trace};

use crate::cards::{Card, CardSet, NUM_CARDS};
use crate::error::GameError;
use crate::rules::{GameRule, RuleSchieber};
use crate::state::{RoundState, CARDS_PER_TRICK, NUM_TRICKS};
use crate::types::{Action, Phase, Player, TrumpAction};
use crate::visibility::{observation_from_state, Observation};

/// Drives one round under rule variant `R`.
#[derive(Debug, Clone)]
pub struct RoundSim<R: GameRule = RuleSchieber> {
    rule: R,
    state: RoundState,
}

impl RoundSim<RuleSchieber> {
    /// Round under the Schieber rules, dealt `hands` with `dealer`.
    pub fn schieber(hands: [CardSet; 4], dealer: Player) -> Self {
        let mut sim = RoundSim::new(RuleSchieber);
        sim.start_round(hands, dealer);
        sim
    }
}

impl<R: GameRule> RoundSim<R> {
    /// A simulator with an empty round (North deals, nobody holds cards).
    /// Call `start_round` before use.
    pub fn new(rule: R) -> Self {
        RoundSim {
            rule,
            state: RoundState::new(Player::North, [CardSet::EMPTY; 4]),
        }
    }

    /// Continue a round from an existing state, e.g. a decoded record.
    pub fn from_state(rule: R, state: RoundState) -> Self {
        RoundSim { rule, state }
    }

    /// Reset to a freshly dealt round.
    pub fn start_round(&mut self, hands: [CardSet; 4], dealer: Player) {
        self.state = RoundState::new(dealer, hands);
        debug!(%dealer, forehand = %dealer.next(), "round started");
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn into_state(self) -> RoundState {
        self.state
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Observation of the player to act.
    pub fn observation(&self) -> Result<Observation, GameError> {
        let player = self.state.player.ok_or(GameError::NoCurrentPlayer)?;
        Ok(observation_from_state(&self.state, player))
    }

    pub fn observation_for(&self, player: Player) -> Observation {
        observation_from_state(&self.state, player)
    }

    /// Legal cards of the player to act; empty outside of play.
    pub fn legal_cards(&self) -> CardSet {
        self.rule.legal_cards_from_state(&self.state)
    }

    pub fn valid_actions(&self) -> Vec<Action> {
        self.rule.valid_actions_from_state(&self.state)
    }

    /// Apply any action of the full action space.
    pub fn apply(&mut self, action: Action) -> Result<(), GameError> {
        match action {
            Action::Trump(trump) => self.declare_trump(trump),
            Action::Card(card) => self.play_card(card),
        }
    }

    // ── Trump selection ────────────────────────────────────────────────

    pub fn declare_trump(&mut self, action: TrumpAction) -> Result<(), GameError> {
        let phase = self.state.phase();
        let player = self.state.player.ok_or(GameError::NoCurrentPlayer)?;

        match (phase, action) {
            (Phase::AwaitingTrumpForehand, TrumpAction::Push) => {
                self.state.forehand = Some(false);
                self.state.player = Some(player.partner());
                debug!(%player, rearhand = %player.partner(), "trump pushed");
            }
            (Phase::AwaitingTrumpForehand, TrumpAction::Declare(trump)) => {
                self.state.trump = Some(trump);
                self.state.forehand = Some(true);
                self.state.declared_trump = Some(player);
                self.state.tricks.first_player[0] = Some(player);
                debug!(%player, %trump, "trump declared forehand");
            }
            (Phase::AwaitingTrumpRearhand, TrumpAction::Push) => {
                return Err(GameError::PushNotAllowed);
            }
            (Phase::AwaitingTrumpRearhand, TrumpAction::Declare(trump)) => {
                let leader = self.state.dealer.next();
                self.state.trump = Some(trump);
                self.state.declared_trump = Some(player);
                self.state.player = Some(leader);
                self.state.tricks.first_player[0] = Some(leader);
                debug!(%player, %trump, "trump declared rearhand");
            }
            (phase, _) => return Err(GameError::WrongPhase(phase)),
        }
        Ok(())
    }

    // ── Card play ──────────────────────────────────────────────────────

    pub fn play_card(&mut self, card: Card) -> Result<(), GameError> {
        let phase = self.state.phase();
        if phase != Phase::Playing {
            return Err(GameError::WrongPhase(phase));
        }
        let player = self.state.player.ok_or(GameError::NoCurrentPlayer)?;
        if !self.state.hand(player).contains(card) {
            return Err(GameError::CardNotInHand { player, card });
        }
        self.check_trick_slot()?;

        let tricks = &mut self.state.tricks;
        let index = tricks.nr_tricks;
        let pos = tricks.nr_cards_in_trick;

        self.state.hands[player.index()].remove(card);
        tricks.cards[index][pos] = Some(card);
        if pos == 0 {
            tricks.first_player[index] = Some(player);
        }
        tricks.nr_cards_in_trick += 1;
        tricks.nr_played_cards += 1;
        trace!(%player, %card, trick = index, pos, "card played");

        if tricks.nr_cards_in_trick < CARDS_PER_TRICK {
            self.state.player = Some(player.next());
        } else {
            self.end_trick()?;
        }
        Ok(())
    }

    /// The trick in progress must have room for a card, and once started
    /// it must have a leader and no gaps. Only a state handed to
    /// `from_state` can break this.
    fn check_trick_slot(&self) -> Result<(), GameError> {
        let tricks = &self.state.tricks;
        let index = tricks.nr_tricks;
        let pos = tricks.nr_cards_in_trick;
        let broken = index >= NUM_TRICKS
            || pos >= CARDS_PER_TRICK
            || (pos > 0 && tricks.first_player[index].is_none())
            || tricks.cards[index][..pos].iter().any(Option::is_none);
        if broken {
            return Err(GameError::InconsistentTrick(index));
        }
        Ok(())
    }

    fn end_trick(&mut self) -> Result<(), GameError> {
        let trump = self.state.trump.ok_or(GameError::WrongPhase(self.state.phase()))?;
        let tricks = &mut self.state.tricks;
        let index = tricks.nr_tricks;
        let (Some(cards), Some(first)) = (tricks.complete_trick(index), tricks.first_player[index]) else {
            return Err(GameError::InconsistentTrick(index));
        };

        let is_last = tricks.nr_played_cards == NUM_CARDS;
        let points = self.rule.trick_points(&cards, is_last, trump);
        let winner = self.rule.trick_winner(&cards, first, trump);

        tricks.points[index] = points;
        tricks.winner[index] = Some(winner);
        tricks.nr_tricks += 1;
        tricks.nr_cards_in_trick = 0;
        self.state.points[winner.team()] += points;
        debug!(trick = index, %winner, points, "trick complete");

        if tricks.nr_tricks < NUM_TRICKS {
            tricks.first_player[tricks.nr_tricks] = Some(winner);
            self.state.player = Some(winner);
        } else {
            self.state.player = None;
            info!(
                team_0 = self.state.points[0],
                team_1 = self.state.points[1],
                "round complete"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::ids::*;
    use crate::types::Trump;

    fn small_round() -> RoundSim {
        let hands = [
            [DA, DK].into_iter().collect(),
            [HA, HK].into_iter().collect(),
            [SA, SK].into_iter().collect(),
            [CA, CK].into_iter().collect(),
        ];
        // East deals, so North is forehand
        RoundSim::schieber(hands, Player::East)
    }

    #[test]
    fn test_push_moves_to_partner() {
        let mut sim = small_round();
        assert_eq!(sim.state().player, Some(Player::North));
        sim.declare_trump(TrumpAction::Push).unwrap();
        assert_eq!(sim.phase(), Phase::AwaitingTrumpRearhand);
        assert_eq!(sim.state().player, Some(Player::South));
        assert_eq!(sim.declare_trump(TrumpAction::Push), Err(GameError::PushNotAllowed));

        sim.declare_trump(TrumpAction::Declare(Trump::Clubs)).unwrap();
        assert_eq!(sim.phase(), Phase::Playing);
        assert_eq!(sim.state().player, Some(Player::North));
        assert_eq!(sim.state().declared_trump, Some(Player::South));
        assert_eq!(sim.state().forehand, Some(false));
        assert_eq!(sim.state().tricks.first_player[0], Some(Player::North));
    }

    #[test]
    fn test_usage_errors() {
        let mut sim = small_round();
        assert_eq!(sim.play_card(SA), Err(GameError::WrongPhase(Phase::AwaitingTrumpForehand)));
        sim.declare_trump(TrumpAction::Declare(Trump::ObeAbe)).unwrap();
        assert_eq!(
            sim.declare_trump(TrumpAction::Declare(Trump::Hearts)),
            Err(GameError::WrongPhase(Phase::Playing))
        );
        assert_eq!(
            sim.play_card(SA),
            Err(GameError::CardNotInHand { player: Player::North, card: SA })
        );
        // rejected calls leave the state untouched
        assert_eq!(sim.state().tricks.nr_played_cards, 0);
    }

    #[test]
    fn test_trick_resolution() {
        let mut sim = small_round();
        sim.declare_trump(TrumpAction::Declare(Trump::Spades)).unwrap();
        // N, W, S, E
        for card in [DA, CA, SK, HA] {
            sim.play_card(card).unwrap();
        }
        let state = sim.state();
        assert_eq!(state.tricks.nr_tricks, 1);
        assert_eq!(state.tricks.winner[0], Some(Player::South));
        assert_eq!(state.tricks.points[0], 11 + 11 + 4 + 11);
        assert_eq!(state.points, [37, 0]);
        assert_eq!(state.player, Some(Player::South));
        assert_eq!(state.tricks.first_player[1], Some(Player::South));
    }

    #[test]
    fn test_broken_trick_rejected() {
        let mut sim = small_round();
        sim.declare_trump(TrumpAction::Declare(Trump::Hearts)).unwrap();
        sim.play_card(DA).unwrap();

        // leader of the trick in progress lost
        let mut state = sim.state().clone();
        state.tricks.first_player[0] = None;
        let mut broken = RoundSim::from_state(RuleSchieber, state.clone());
        assert_eq!(broken.play_card(CA), Err(GameError::InconsistentTrick(0)));
        assert_eq!(broken.state(), &state);

        // a gap before the next free slot
        let mut state = sim.state().clone();
        state.tricks.cards[0][0] = None;
        let mut broken = RoundSim::from_state(RuleSchieber, state.clone());
        assert_eq!(broken.play_card(CA), Err(GameError::InconsistentTrick(0)));
        assert_eq!(broken.state(), &state);
    }
}
