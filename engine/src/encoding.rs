// ═══════════════════════════════════════════════════════════════════════
// Canonical round encoding (format "V0.2")
//
// RoundState and Observation serialize through the record types below,
// so every decode passes through validation:
//   - the version tag must be present and equal to FORMAT_VERSION
//   - every emitted trick must name its first player
//   - cards are suit+rank strings ("DA", "H10", "C6")
//   - an observation may only carry the hand of its view player
// Team points are not part of the record; they are re-derived from the
// trick winners and points on decode.
//
// Example (mid-play state):
//   {"version":"V0.2","trump":0,"dealer":3,"currentPlayer":1,"forehand":1,
//    "tricks":[{"cards":["DA","DK","DQ","DJ"],"points":48,"win":2,"first":0},
//              {"cards":["CA"],"first":2}],
//    "player":[{"hand":[..]},{"hand":[..]},{"hand":[..]},{"hand":[..]}],
//    "jassTyp":"SCHIEBER"}
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardSet, MAX_TRICK_POINTS};
use crate::error::DecodeError;
use crate::state::{declaring_player, RoundState, TrickTable, CARDS_PER_TRICK, NUM_TRICKS};
use crate::types::{Player, Trump};
use crate::visibility::Observation;

pub const FORMAT_VERSION: &str = "V0.2";
pub const JASS_TYPE_SCHIEBER: &str = "SCHIEBER";

/// Encoding of "not set" for player, trump and forehand fields.
const UNSET: i32 = -1;

// ── Records ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    #[serde(default)]
    pub hand: Vec<String>,
}

/// Wire form of a full round state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    #[serde(default)]
    pub version: Option<String>,
    pub trump: i32,
    pub dealer: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_player: Option<i32>,
    pub forehand: i32,
    pub tricks: Vec<TrickRecord>,
    pub player: Vec<HandRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jass_typ: Option<String>,
}

/// Wire form of an observation: a round record plus `playerView`, with
/// only the view player's hand populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    #[serde(default)]
    pub version: Option<String>,
    pub trump: i32,
    pub dealer: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_player: Option<i32>,
    pub player_view: i32,
    pub forehand: i32,
    pub tricks: Vec<TrickRecord>,
    pub player: Vec<HandRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jass_typ: Option<String>,
}

// ── Field helpers ──────────────────────────────────────────────────────

fn player_code(player: Option<Player>) -> i32 {
    player.map_or(UNSET, |p| p.index() as i32)
}

fn decode_player(field: &'static str, value: i32) -> Result<Player, DecodeError> {
    usize::try_from(value)
        .ok()
        .and_then(Player::from_index)
        .ok_or(DecodeError::InvalidPlayer { field, value })
}

/// Player field where -1 (or absence) means "not set".
fn decode_optional_player(field: &'static str, value: Option<i32>) -> Result<Option<Player>, DecodeError> {
    match value {
        None | Some(UNSET) => Ok(None),
        Some(v) => decode_player(field, v).map(Some),
    }
}

fn decode_trump(value: i32) -> Result<Option<Trump>, DecodeError> {
    if value == UNSET {
        return Ok(None);
    }
    Trump::from_code(value).map(Some).ok_or(DecodeError::InvalidTrump(value))
}

fn forehand_code(forehand: Option<bool>) -> i32 {
    match forehand {
        None => UNSET,
        Some(true) => 1,
        Some(false) => 0,
    }
}

fn decode_forehand(value: i32) -> Result<Option<bool>, DecodeError> {
    match value {
        UNSET => Ok(None),
        1 => Ok(Some(true)),
        0 => Ok(Some(false)),
        v => Err(DecodeError::InvalidForehand(v)),
    }
}

fn check_version(version: Option<&str>) -> Result<(), DecodeError> {
    match version {
        None => Err(DecodeError::MissingVersion),
        Some(FORMAT_VERSION) => Ok(()),
        Some(found) => Err(DecodeError::VersionMismatch {
            found: found.to_string(),
            expected: FORMAT_VERSION,
        }),
    }
}

// ── Tricks ─────────────────────────────────────────────────────────────

/// Records for tricks `0..min(nr_tricks + 1, 9)`, skipping a trick with
/// neither cards nor a known first player.
pub fn encode_tricks(tricks: &TrickTable) -> Vec<TrickRecord> {
    let count = (tricks.nr_tricks + 1).min(NUM_TRICKS);
    (0..count)
        .filter_map(|i| {
            let cards: Vec<String> = tricks.cards[i].iter().flatten().map(Card::to_string).collect();
            let complete = cards.len() == CARDS_PER_TRICK;
            let record = TrickRecord {
                points: complete.then_some(tricks.points[i]),
                win: if complete { tricks.winner[i].map(|p| p.index() as i32) } else { None },
                first: tricks.first_player[i].map(|p| p.index() as i32),
                cards,
            };
            (!record.cards.is_empty() || record.first.is_some()).then_some(record)
        })
        .collect()
}

pub fn decode_tricks(records: &[TrickRecord]) -> Result<TrickTable, DecodeError> {
    if records.len() > NUM_TRICKS {
        return Err(DecodeError::TooManyTricks(records.len()));
    }
    let mut table = TrickTable::new();
    for (i, record) in records.iter().enumerate() {
        let count = record.cards.len();
        if count > CARDS_PER_TRICK {
            return Err(DecodeError::TrickSize { index: i, count });
        }
        // only the last emitted trick may be partial
        if count < CARDS_PER_TRICK && i + 1 < records.len() {
            return Err(DecodeError::GapInTricks(i));
        }
        for (pos, card) in record.cards.iter().enumerate() {
            table.cards[i][pos] = Some(card.parse()?);
        }
        let first = record.first.ok_or(DecodeError::MissingFirstPlayer(i))?;
        table.first_player[i] = Some(decode_player("first", first)?);
        table.winner[i] = decode_optional_player("win", record.win)?;
        let points = record.points.unwrap_or(0);
        if points > MAX_TRICK_POINTS {
            return Err(DecodeError::InvalidPoints { trick: i, points, max: MAX_TRICK_POINTS });
        }
        table.points[i] = points;
        table.nr_played_cards += count;
    }
    table.nr_tricks = table.nr_played_cards / CARDS_PER_TRICK;
    table.nr_cards_in_trick = table.nr_played_cards % CARDS_PER_TRICK;
    Ok(table)
}

fn decode_hands(records: &[HandRecord]) -> Result<[CardSet; 4], DecodeError> {
    if records.len() != 4 {
        return Err(DecodeError::WrongPlayerCount(records.len()));
    }
    let mut hands = [CardSet::EMPTY; 4];
    for (hand, record) in hands.iter_mut().zip(records) {
        *hand = CardSet::from_strings(&record.hand)?;
    }
    Ok(hands)
}

/// Derived declaring player: only known once trump is set.
fn derive_declared_trump(dealer: Player, trump: Option<Trump>, forehand: Option<bool>) -> Option<Player> {
    trump.map(|_| declaring_player(dealer, forehand.unwrap_or(true)))
}

// ── RoundState ─────────────────────────────────────────────────────────

impl From<RoundState> for RoundRecord {
    fn from(state: RoundState) -> RoundRecord {
        RoundRecord::from(&state)
    }
}

impl From<&RoundState> for RoundRecord {
    fn from(state: &RoundState) -> RoundRecord {
        RoundRecord {
            version: Some(FORMAT_VERSION.to_string()),
            trump: state.trump.map_or(UNSET, Trump::code),
            dealer: state.dealer.index() as i32,
            current_player: state.player.map(|p| p.index() as i32),
            forehand: forehand_code(state.forehand),
            tricks: encode_tricks(&state.tricks),
            player: state.hands.iter().map(|h| HandRecord { hand: h.to_strings() }).collect(),
            jass_typ: Some(JASS_TYPE_SCHIEBER.to_string()),
        }
    }
}

impl TryFrom<RoundRecord> for RoundState {
    type Error = DecodeError;

    fn try_from(record: RoundRecord) -> Result<RoundState, DecodeError> {
        check_version(record.version.as_deref())?;
        let dealer = decode_player("dealer", record.dealer)?;
        let trump = decode_trump(record.trump)?;
        let forehand = decode_forehand(record.forehand)?;
        let tricks = decode_tricks(&record.tricks)?;
        let hands = decode_hands(&record.player)?;
        let points = tricks.team_points();

        Ok(RoundState {
            dealer,
            player: decode_optional_player("currentPlayer", record.current_player)?,
            trump,
            forehand,
            declared_trump: derive_declared_trump(dealer, trump, forehand),
            hands,
            tricks,
            points,
        })
    }
}

// ── Observation ────────────────────────────────────────────────────────

impl From<Observation> for ObservationRecord {
    fn from(obs: Observation) -> ObservationRecord {
        ObservationRecord::from(&obs)
    }
}

impl From<&Observation> for ObservationRecord {
    fn from(obs: &Observation) -> ObservationRecord {
        let mut player = vec![HandRecord::default(); 4];
        player[obs.player_view.index()].hand = obs.hand.to_strings();
        ObservationRecord {
            version: Some(FORMAT_VERSION.to_string()),
            trump: obs.trump.map_or(UNSET, Trump::code),
            dealer: obs.dealer.index() as i32,
            current_player: obs.player.map(|p| p.index() as i32),
            player_view: obs.player_view.index() as i32,
            forehand: forehand_code(obs.forehand),
            tricks: encode_tricks(&obs.tricks),
            player,
            jass_typ: Some(JASS_TYPE_SCHIEBER.to_string()),
        }
    }
}

impl TryFrom<ObservationRecord> for Observation {
    type Error = DecodeError;

    fn try_from(record: ObservationRecord) -> Result<Observation, DecodeError> {
        check_version(record.version.as_deref())?;
        let dealer = decode_player("dealer", record.dealer)?;
        let player_view = decode_player("playerView", record.player_view)?;
        let trump = decode_trump(record.trump)?;
        let forehand = decode_forehand(record.forehand)?;
        let tricks = decode_tricks(&record.tricks)?;
        let hands = decode_hands(&record.player)?;

        for (i, hand) in hands.iter().enumerate() {
            if i != player_view.index() && !hand.is_empty() {
                return Err(DecodeError::HandForWrongPlayer { player: i, view: player_view.index() });
            }
        }
        let points = tricks.team_points();

        Ok(Observation {
            dealer,
            player: decode_optional_player("currentPlayer", record.current_player)?,
            player_view,
            trump,
            forehand,
            declared_trump: derive_declared_trump(dealer, trump, forehand),
            tricks,
            points,
            hand: hands[player_view.index()],
        })
    }
}

// ── JSON helpers ───────────────────────────────────────────────────────

pub fn state_to_json(state: &RoundState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RoundRecord::from(state))
}

pub fn state_to_json_pretty(state: &RoundState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&RoundRecord::from(state))
}

/// Decode a full state, keeping the typed decode error.
pub fn state_from_json(json: &str) -> Result<RoundState, DecodeError> {
    let record: RoundRecord = serde_json::from_str(json)?;
    RoundState::try_from(record)
}

pub fn observation_to_json(obs: &Observation) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ObservationRecord::from(obs))
}

pub fn observation_from_json(json: &str) -> Result<Observation, DecodeError> {
    let record: ObservationRecord = serde_json::from_str(json)?;
    Observation::try_from(record)
}
