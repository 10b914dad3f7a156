use crate::leaderboard::Leaderboard;
use anyhow::{Context, Error as Anyhow};
use lib::chess::{Color, File, Move, Promotion, Rank, Square};
use lib::game::{Game, Mode, RandomMover, ScorePolicy, Status};
use rand::{rngs::StdRng, SeedableRng};
use std::io::{self, BufRead, Write};
use std::{thread, time::Duration};
use tracing::instrument;

/// The board from white's perspective.
fn render(game: &Game) -> String {
    let mut board = String::new();

    for r in Rank::iter().rev() {
        board.push_str(&r.to_string());

        for f in File::iter() {
            match game.position()[Square::new(f, r)] {
                Some(p) => board.push_str(&format!(" {p}")),
                None => board.push_str(" ."),
            }
        }

        board.push('\n');
    }

    board.push_str("  a b c d e f g h\n");
    board
}

/// The computer replies after a short pause, unless the game moved on.
fn reply(game: &mut Game, mover: &mut RandomMover<StdRng>, delay: Duration) {
    let version = game.version();
    thread::sleep(delay);

    if game.version() != version {
        return;
    }

    if let Some(m) = mover.propose(game) {
        if game.submit(m) == Ok(Status::AwaitingPromotion) {
            let _ = game.promote(Promotion::Queen);
        }
    }
}

/// An interactive session on stdin/stdout.
#[instrument(level = "trace", skip(recorder), err)]
pub fn session(
    mode: Mode,
    recorder: Leaderboard,
    seed: Option<u64>,
    delay: Duration,
) -> Result<(), Anyhow> {
    let mut game = Game::new(mode).with_recorder(Box::new(recorder));

    let mut mover = match seed {
        Some(seed) => RandomMover::seeded(seed),
        None => RandomMover::new(StdRng::from_entropy()),
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = io::stdout();

    loop {
        write!(out, "{}", render(&game))?;
        writeln!(out, "{} to move ({})", game.turn(), game.status())?;

        if game.mode() == Mode::PvC
            && game.turn() == Color::Black
            && game.status() == Status::Ongoing
        {
            reply(&mut game, &mut mover, delay);
            continue;
        }

        if let Some(sq) = game.pending_promotion() {
            writeln!(out, "promote the pawn on {sq} to [q|r|b|n]")?;
        }

        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };

        let line = line.context("failed to read from stdin")?;
        let input = line.trim();

        match input {
            "" => {}
            "quit" => break,

            "undo" => {
                if let Err(e) = game.take_back() {
                    writeln!(out, "{e}")?;
                }
            }

            "moves" => {
                for m in game.notation() {
                    writeln!(out, "{m}")?;
                }
            }

            "scores" => {
                writeln!(
                    out,
                    "white {} x {} black",
                    game.score().get(Color::White),
                    game.score().get(Color::Black)
                )?;
            }

            _ if input == "new" || input.starts_with("new ") => {
                match input.strip_prefix("new").map(str::trim) {
                    None | Some("") => game.reset(game.mode(), ScorePolicy::Keep),

                    Some(mode) => match mode.parse() {
                        Ok(mode) => game.reset(mode, ScorePolicy::Keep),
                        Err(e) => writeln!(out, "{e}")?,
                    },
                }
            }

            _ if game.pending_promotion().is_some() => match input.parse::<Promotion>() {
                Err(e) => writeln!(out, "{e}")?,

                Ok(choice) => {
                    if let Err(e) = game.promote(choice) {
                        writeln!(out, "{e}")?;
                    }
                }
            },

            _ => match input.parse::<Move>() {
                Err(e) => writeln!(out, "{e}")?,

                Ok(m) => {
                    if let Err(e) = game.submit(m) {
                        writeln!(out, "{e}")?;
                    }
                }
            },
        }
    }

    Ok(())
}
