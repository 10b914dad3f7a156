use crate::chess::{Color, Outcome};

/// The running score across consecutive games.
///
/// A win is worth three points to the winner, a draw one point to each
/// player.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Score {
    white: u16,
    black: u16,
}

impl Score {
    /// The points accumulated by the given side.
    #[inline(always)]
    pub fn get(&self, side: Color) -> u16 {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub(crate) fn award(&mut self, outcome: Outcome) {
        match outcome.winner() {
            Some(Color::White) => self.white += 3,
            Some(Color::Black) => self.black += 3,

            None => {
                self.white += 1;
                self.black += 1;
            }
        }
    }
}

/// What happens to the running [`Score`] when a new game starts.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScorePolicy {
    /// Carry the score over to the next game.
    #[default]
    Keep,

    /// Reset both players to zero.
    Zero,
}
