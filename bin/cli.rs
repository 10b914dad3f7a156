use crate::leaderboard::Leaderboard;
use crate::play;
use anyhow::Error as Anyhow;
use clap::Parser;
use lib::game::Mode;
use std::{cmp::min, io::stderr, path::PathBuf, time::Duration};
use tracing::{instrument, Level};
use tracing_subscriber::fmt::{format::FmtSpan, layer};
use tracing_subscriber::{filter::Targets, prelude::*, registry, util::SubscriberInitExt};

/// Command line interface.
#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    /// Verbosity level.
    #[clap(short, long)]
    #[cfg_attr(not(debug_assertions), clap(default_value_t = Level::INFO))]
    #[cfg_attr(debug_assertions, clap(default_value_t = Level::DEBUG))]
    verbosity: Level,

    /// The kind of opposition, `pvp` or `pvc`.
    #[clap(short, long, default_value = "pvc")]
    mode: Mode,

    /// The seed for the computer player's move selection.
    #[clap(short, long)]
    seed: Option<u64>,

    /// Where the leaderboard is persisted.
    #[clap(short = 'l', long, default_value = "leaderboard.json")]
    scores: PathBuf,

    /// How long the computer pretends to think, in milliseconds.
    #[clap(short, long, default_value_t = 500)]
    delay: u64,
}

impl Cli {
    #[instrument(level = "trace", skip(self), err)]
    pub fn execute(self) -> Result<(), Anyhow> {
        let filter = Targets::new()
            .with_target("cli", self.verbosity)
            .with_target("lib", self.verbosity)
            .with_default(min(Level::WARN, self.verbosity));

        let writer = layer()
            .pretty()
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(stderr);

        registry().with(filter).with(writer).init();

        let recorder = Leaderboard::new(self.scores);
        let delay = Duration::from_millis(self.delay);

        play::session(self.mode, recorder, self.seed, delay)
    }
}
