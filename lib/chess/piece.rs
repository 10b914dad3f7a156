use crate::chess::{Color, Role};
use derive_more::{Display, Error};
use std::{fmt, str::FromStr};

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Piece(pub Color, pub Role);

impl Piece {
    /// This piece's [`Color`].
    #[inline(always)]
    pub fn color(&self) -> Color {
        self.0
    }

    /// This piece's [`Role`].
    #[inline(always)]
    pub fn role(&self) -> Role {
        self.1
    }

    /// The same piece of the opposite [`Color`].
    #[inline(always)]
    pub fn flip(&self) -> Self {
        Piece(!self.0, self.1)
    }
}

/// Pieces are printed as FEN letters, uppercase for white.
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color() {
            Color::White => write!(f, "{}", self.role().to_string().to_uppercase()),
            Color::Black => fmt::Display::fmt(&self.role(), f),
        }
    }
}

/// The reason why parsing [`Piece`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse piece")]
pub struct ParsePieceError;

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role: Role = s.to_lowercase().parse().map_err(|_| ParsePieceError)?;
        match s.chars().next().map_or(false, |c| c.is_uppercase()) {
            true => Ok(Piece(Color::White, role)),
            false => Ok(Piece(Color::Black, role)),
        }
    }
}
