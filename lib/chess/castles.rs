use crate::chess::{Color, Square};
use derive_more::{BitAnd, BitOr, Debug, Display, Error};
use std::{fmt, ops::Not, str::FromStr};

/// The castling rights of both players.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, BitAnd, BitOr)]
#[debug("Castles({self})")]
pub struct Castles(u8);

impl Castles {
    const WHITE_SHORT: u8 = 0b0001;
    const WHITE_LONG: u8 = 0b0010;
    const BLACK_SHORT: u8 = 0b0100;
    const BLACK_LONG: u8 = 0b1000;

    /// No castling rights.
    #[inline(always)]
    pub fn none() -> Self {
        Castles(0b0000)
    }

    /// All castling rights.
    #[inline(always)]
    pub fn all() -> Self {
        Castles(0b1111)
    }

    /// Whether the given side has kingside castling rights.
    #[inline(always)]
    pub fn has_short(&self, side: Color) -> bool {
        let mask = match side {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        };

        self.0 & mask != 0
    }

    /// Whether the given side has queenside castling rights.
    #[inline(always)]
    pub fn has_long(&self, side: Color) -> bool {
        let mask = match side {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        };

        self.0 & mask != 0
    }
}

impl Default for Castles {
    #[inline(always)]
    fn default() -> Self {
        Castles::all()
    }
}

impl Not for Castles {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Castles(!self.0 & 0b1111)
    }
}

/// The rights a move touching this square revokes.
impl From<Square> for Castles {
    #[inline(always)]
    fn from(sq: Square) -> Self {
        match sq {
            Square::H1 => Castles(Castles::WHITE_SHORT),
            Square::A1 => Castles(Castles::WHITE_LONG),
            Square::E1 => Castles(Castles::WHITE_SHORT | Castles::WHITE_LONG),
            Square::H8 => Castles(Castles::BLACK_SHORT),
            Square::A8 => Castles(Castles::BLACK_LONG),
            Square::E8 => Castles(Castles::BLACK_SHORT | Castles::BLACK_LONG),
            _ => Castles::none(),
        }
    }
}

impl fmt::Display for Castles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Castles::none() {
            return f.write_str("-");
        }

        for (held, symbol) in [
            (self.has_short(Color::White), 'K'),
            (self.has_long(Color::White), 'Q'),
            (self.has_short(Color::Black), 'k'),
            (self.has_long(Color::Black), 'q'),
        ] {
            if held {
                write!(f, "{symbol}")?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Castles`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("failed to parse castling rights")]
pub struct ParseCastlesError;

impl FromStr for Castles {
    type Err = ParseCastlesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Castles::none());
        }

        let mut castles = Castles::none();

        for c in s.chars() {
            let right = match c {
                'K' => Castles(Castles::WHITE_SHORT),
                'Q' => Castles(Castles::WHITE_LONG),
                'k' => Castles(Castles::BLACK_SHORT),
                'q' => Castles(Castles::BLACK_LONG),
                _ => return Err(ParseCastlesError),
            };

            if castles & right != Castles::none() {
                return Err(ParseCastlesError);
            }

            castles = castles | right;
        }

        Ok(castles)
    }
}
