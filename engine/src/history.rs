// ═══════════════════════════════════════════════════════════════════════
// History — reconstructing earlier positions of a completed round
//
// A completed round carries every card in play order, so any earlier
// state can be rebuilt: cards not yet played at a given point are exactly
// the cards each player still held. Used to produce training samples
// from logged rounds.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardSet, NUM_CARDS};
use crate::error::{DecodeError, GameError};
use crate::state::{RoundState, TrickTable, CARDS_PER_TRICK, NUM_TRICKS};
use crate::types::Player;
use crate::visibility::{observation_from_state, Observation};

fn require_complete(game: &RoundState) -> Result<(), GameError> {
    if game.is_done() {
        Ok(())
    } else {
        Err(GameError::RoundNotComplete(game.tricks.nr_played_cards))
    }
}

/// Add the cards of trick `index` from position `from` on to the hands of
/// the players who played them.
fn collect_trick(hands: &mut [CardSet; 4], tricks: &TrickTable, index: usize, from: usize) -> Result<(), GameError> {
    let first = tricks.first_player[index].ok_or(GameError::RoundNotComplete(tricks.nr_played_cards))?;
    for pos in from..CARDS_PER_TRICK {
        if let Some(card) = tricks.cards[index][pos] {
            hands[first.after(pos).index()].insert(card);
        }
    }
    Ok(())
}

/// Hands as dealt, recovered from the tricks of a completed round.
pub fn starting_hands(game: &RoundState) -> Result<[CardSet; 4], GameError> {
    require_complete(game)?;
    let mut hands = [CardSet::EMPTY; 4];
    for index in 0..NUM_TRICKS {
        collect_trick(&mut hands, &game.tricks, index, 0)?;
    }
    Ok(hands)
}

/// State of a completed round just before card number `cards_played`
/// (0..=35) was played.
pub fn state_at_card(game: &RoundState, cards_played: usize) -> Result<RoundState, GameError> {
    require_complete(game)?;
    if cards_played >= NUM_CARDS {
        return Err(GameError::CardNumberOutOfRange(cards_played));
    }
    let (nr_tricks, nr_cards_in_trick) = (cards_played / CARDS_PER_TRICK, cards_played % CARDS_PER_TRICK);
    let source = &game.tricks;

    let mut tricks = TrickTable::new();
    tricks.nr_tricks = nr_tricks;
    tricks.nr_cards_in_trick = nr_cards_in_trick;
    tricks.nr_played_cards = cards_played;
    // the next leader is already known once the previous trick is done
    tricks.first_player[..=nr_tricks].copy_from_slice(&source.first_player[..=nr_tricks]);
    tricks.cards[..nr_tricks].copy_from_slice(&source.cards[..nr_tricks]);
    tricks.cards[nr_tricks][..nr_cards_in_trick].copy_from_slice(&source.cards[nr_tricks][..nr_cards_in_trick]);
    tricks.winner[..nr_tricks].copy_from_slice(&source.winner[..nr_tricks]);
    tricks.points[..nr_tricks].copy_from_slice(&source.points[..nr_tricks]);

    let leader = source.first_player[nr_tricks].ok_or(GameError::RoundNotComplete(source.nr_played_cards))?;

    let mut hands = [CardSet::EMPTY; 4];
    collect_trick(&mut hands, source, nr_tricks, nr_cards_in_trick)?;
    for index in nr_tricks + 1..NUM_TRICKS {
        collect_trick(&mut hands, source, index, 0)?;
    }

    let points = tricks.team_points();
    Ok(RoundState {
        dealer: game.dealer,
        player: Some(leader.after(nr_cards_in_trick)),
        trump: game.trump,
        forehand: game.forehand,
        declared_trump: game.declared_trump,
        hands,
        tricks,
        points,
    })
}

/// State at a trump decision of a completed round: for the forehand
/// player, or for the rearhand player after a push. Requesting the
/// rearhand state of a round declared forehand is an error.
pub fn state_for_trump(game: &RoundState, forehand: bool) -> Result<RoundState, GameError> {
    let hands = starting_hands(game)?;
    let mut state = RoundState::new(game.dealer, hands);
    if !forehand {
        if game.forehand != Some(false) {
            return Err(GameError::NotPushed);
        }
        state.forehand = Some(false);
        state.player = Some(game.dealer.next().partner());
    }
    Ok(state)
}

/// Observations at the trump decisions of a completed round. The second
/// one is only present when the round was pushed.
pub fn observations_for_trump(game: &RoundState) -> Result<(Observation, Option<Observation>), GameError> {
    let forehand = state_for_trump(game, true)?;
    let forehand_obs = observation_from_state(&forehand, game.dealer.next());
    let rearhand_obs = match game.forehand {
        Some(false) => {
            let rearhand = state_for_trump(game, false)?;
            Some(observation_from_state(&rearhand, game.dealer.next().partner()))
        }
        _ => None,
    };
    Ok((forehand_obs, rearhand_obs))
}

// ── Training labels ────────────────────────────────────────────────────

/// Outcome of one card play in a completed round, seen from the player
/// who played it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LabelPlayRecord", into = "LabelPlayRecord")]
pub struct LabelPlay {
    pub card_played: Card,
    pub points_in_trick_own: u32,
    pub points_in_trick_other: u32,
    pub trick_winner: Player,
    pub points_in_game_own: u32,
    pub points_in_game_other: u32,
    /// Hands at the start of the round.
    pub hands: [CardSet; 4],
}

impl LabelPlay {
    /// Label for card number `card_nr` (0..=35). `hands` are the starting
    /// hands of the round; pass them in when labelling many cards of the
    /// same round.
    pub fn from_round(game: &RoundState, card_nr: usize, hands: [CardSet; 4]) -> Result<LabelPlay, GameError> {
        require_complete(game)?;
        if card_nr >= NUM_CARDS {
            return Err(GameError::CardNumberOutOfRange(card_nr));
        }
        let (trick, pos) = (card_nr / CARDS_PER_TRICK, card_nr % CARDS_PER_TRICK);
        let incomplete = GameError::RoundNotComplete(game.tricks.nr_played_cards);
        let card = game.tricks.cards[trick][pos].ok_or(incomplete.clone())?;
        let player = game.tricks.player_at(trick, pos).ok_or(incomplete.clone())?;
        let winner = game.tricks.winner[trick].ok_or(incomplete)?;

        let trick_points = game.tricks.points[trick];
        let (own, other) = if player.same_team(winner) { (trick_points, 0) } else { (0, trick_points) };
        let team = player.team();

        Ok(LabelPlay {
            card_played: card,
            points_in_trick_own: own,
            points_in_trick_other: other,
            trick_winner: winner,
            points_in_game_own: game.points[team],
            points_in_game_other: game.points[1 - team],
            hands,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LabelPlayRecord {
    card_played: usize,
    points_in_trick_own: u32,
    points_in_trick_other: u32,
    trick_winner: usize,
    points_in_game_own: u32,
    points_in_game_other: u32,
    hands_player_0: Vec<String>,
    hands_player_1: Vec<String>,
    hands_player_2: Vec<String>,
    hands_player_3: Vec<String>,
}

impl From<LabelPlay> for LabelPlayRecord {
    fn from(label: LabelPlay) -> LabelPlayRecord {
        let [h0, h1, h2, h3] = label.hands.map(CardSet::to_strings);
        LabelPlayRecord {
            card_played: label.card_played.index(),
            points_in_trick_own: label.points_in_trick_own,
            points_in_trick_other: label.points_in_trick_other,
            trick_winner: label.trick_winner.index(),
            points_in_game_own: label.points_in_game_own,
            points_in_game_other: label.points_in_game_other,
            hands_player_0: h0,
            hands_player_1: h1,
            hands_player_2: h2,
            hands_player_3: h3,
        }
    }
}

impl TryFrom<LabelPlayRecord> for LabelPlay {
    type Error = DecodeError;

    fn try_from(record: LabelPlayRecord) -> Result<LabelPlay, DecodeError> {
        let card_played = Card::from_index(record.card_played)
            .ok_or_else(|| DecodeError::UnknownCard(record.card_played.to_string()))?;
        let trick_winner = Player::from_index(record.trick_winner).ok_or(DecodeError::InvalidPlayer {
            field: "trick_winner",
            value: record.trick_winner as i32,
        })?;
        Ok(LabelPlay {
            card_played,
            points_in_trick_own: record.points_in_trick_own,
            points_in_trick_other: record.points_in_trick_other,
            trick_winner,
            points_in_game_own: record.points_in_game_own,
            points_in_game_other: record.points_in_game_other,
            hands: [
                CardSet::from_strings(&record.hands_player_0)?,
                CardSet::from_strings(&record.hands_player_1)?,
                CardSet::from_strings(&record.hands_player_2)?,
                CardSet::from_strings(&record.hands_player_3)?,
            ],
        })
    }
}
