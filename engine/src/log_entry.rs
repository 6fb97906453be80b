// ═══════════════════════════════════════════════════════════════════════
// Log entries — completed rounds and single decisions, as JSON lines
//
// Dates are written as "dd.mm.yy HH:MM:SS" (local wall-clock time, no
// offset). Two-digit years are read back as 20yy.
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::error::DecodeError;
use crate::state::RoundState;
use crate::types::Action;
use crate::visibility::Observation;

/// A completed round together with when it was played and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLogEntry {
    pub game: RoundState,
    #[serde(with = "log_date")]
    pub date: PrimitiveDateTime,
    pub player_ids: Vec<i64>,
}

/// One decision: the observation a player had and the action taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsActionLogEntry {
    pub obs: Observation,
    pub action: Action,
    #[serde(with = "log_date")]
    pub date: PrimitiveDateTime,
    pub player_id: i64,
}

impl RoundLogEntry {
    pub fn from_json(line: &str) -> Result<RoundLogEntry, DecodeError> {
        Ok(serde_json::from_str(line)?)
    }
}

impl ObsActionLogEntry {
    pub fn from_json(line: &str) -> Result<ObsActionLogEntry, DecodeError> {
        Ok(serde_json::from_str(line)?)
    }
}

pub fn format_date(date: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    date.format(log_date::FORMAT)
}

pub fn parse_date(text: &str) -> Result<PrimitiveDateTime, DecodeError> {
    let invalid = || DecodeError::InvalidDate(text.to_string());
    // expand the two-digit year so the full-year parser can take it
    let (day, clock) = text.split_once(' ').ok_or_else(invalid)?;
    let (day_month, year) = day.rsplit_once('.').ok_or_else(invalid)?;
    if year.len() != 2 {
        return Err(invalid());
    }
    let expanded = format!("{day_month}.20{year} {clock}");
    PrimitiveDateTime::parse(&expanded, log_date::PARSE_FORMAT).map_err(|_| invalid())
}

mod log_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;
    use time::PrimitiveDateTime;

    pub(super) const FORMAT: &[BorrowedFormatItem<'static>] =
        format_description!("[day].[month].[year repr:last_two] [hour]:[minute]:[second]");
    pub(super) const PARSE_FORMAT: &[BorrowedFormatItem<'static>] =
        format_description!("[day].[month].[year] [hour]:[minute]:[second]");

    pub fn serialize<S: Serializer>(date: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_date(date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PrimitiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_date(&text).map_err(de::Error::custom)
    }
}
