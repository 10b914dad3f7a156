use crate::chess::Outcome;
use derive_more::Display;

/// The lifecycle state of a [`Game`][`crate::game::Game`].
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Status {
    /// Moves are accepted for the side to move.
    #[display("ongoing")]
    Ongoing,

    /// A pawn parked on the last rank awaits its promotion choice.
    #[display("awaiting promotion")]
    AwaitingPromotion,

    /// The game has ended with the given [`Outcome`].
    #[display("{_0}")]
    Over(Outcome),
}

impl Status {
    /// Whether the game has ended and accepts no further moves.
    #[inline(always)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Over(_))
    }
}
