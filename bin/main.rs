use anyhow::Error as Anyhow;
use clap::Parser;

mod cli;
mod leaderboard;
mod play;

fn main() -> Result<(), Anyhow> {
    cli::Cli::parse().execute()
}
