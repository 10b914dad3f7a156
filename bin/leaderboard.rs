use chrono::{DateTime, Utc};
use lib::chess::Color;
use lib::game::{GameRecord, Mode, Recorder};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};
use tracing::warn;

/// A leaderboard persisted as a JSON file.
///
/// Recording never fails the game, a leaderboard that cannot be read or
/// written is logged and skipped.
#[derive(Debug)]
pub struct Leaderboard {
    path: PathBuf,
}

/// A single player's standing.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Standing {
    pub points: u32,
    pub games: u32,
    pub last_played: Option<DateTime<Utc>>,
}

impl Leaderboard {
    pub fn new(path: PathBuf) -> Self {
        Leaderboard { path }
    }

    /// The standings read back from disk, empty if the file is absent.
    pub fn standings(&self) -> BTreeMap<String, Standing> {
        match fs::read_to_string(&self.path) {
            Err(_) => BTreeMap::new(),

            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("discarding unreadable leaderboard, {e}");
                BTreeMap::new()
            }),
        }
    }

    fn names(mode: Mode) -> [&'static str; 2] {
        match mode {
            Mode::PvP => ["Player 1", "Player 2"],
            Mode::PvC => ["You", "Computer"],
        }
    }

    fn persist(&self, standings: &BTreeMap<String, Standing>) {
        let json = match serde_json::to_string_pretty(standings) {
            Ok(json) => json,

            Err(e) => {
                warn!("failed to serialize the leaderboard, {e}");
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, json) {
            warn!("failed to persist the leaderboard, {e}");
        }
    }
}

impl Recorder for Leaderboard {
    fn record(&mut self, record: &GameRecord) {
        let mut standings = self.standings();
        let [white, black] = Self::names(record.mode);

        let (to_white, to_black) = match record.winner {
            Some(Color::White) => (3, 0),
            Some(Color::Black) => (0, 3),
            None => (1, 1),
        };

        for (name, points) in [(white, to_white), (black, to_black)] {
            let standing = standings.entry(name.to_string()).or_default();
            standing.points += points;
            standing.games += 1;
            standing.last_played = Some(record.timestamp);
        }

        self.persist(&standings);
    }
}
