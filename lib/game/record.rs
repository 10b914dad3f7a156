use crate::chess::Color;
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of opposition.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Two people sharing the board.
    #[display("pvp")]
    PvP,

    /// A person playing white against the computer.
    #[display("pvc")]
    PvC,
}

/// The reason why parsing [`Mode`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse mode, expected `pvp` or `pvc`")]
pub struct ParseModeError;

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pvp" => Ok(Mode::PvP),
            "pvc" => Ok(Mode::PvC),
            _ => Err(ParseModeError),
        }
    }
}

/// A snapshot taken the moment a game ends.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct GameRecord {
    pub mode: Mode,
    pub winner: Option<Color>,
    pub white_points: u16,
    pub black_points: u16,
    pub timestamp: DateTime<Utc>,
}

/// A sink for finished games.
#[cfg_attr(test, mockall::automock)]
pub trait Recorder {
    /// Accepts the record of a game that just ended.
    fn record(&mut self, record: &GameRecord);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_mode_is_an_identity(m: Mode) {
        assert_eq!(m.to_string().parse(), Ok(m));
    }

    #[proptest]
    fn parsing_mode_fails_for_anything_else(
        #[filter(!["pvp", "pvc"].contains(&#s.as_str()))] s: String,
    ) {
        assert_eq!(s.parse::<Mode>(), Err(ParseModeError));
    }

    #[proptest]
    fn game_record_serializes_to_json_and_back(m: Mode, winner: Option<Color>) {
        let record = GameRecord {
            mode: m,
            winner,
            white_points: 3,
            black_points: 1,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&record)?;
        assert_eq!(serde_json::from_str::<GameRecord>(&json)?, record);
    }
}
