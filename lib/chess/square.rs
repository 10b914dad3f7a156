use crate::chess::{File, ParseFileError, ParseRankError, Rank};
use derive_more::{Display, Error, From};
use std::{fmt, str::FromStr};

/// A square on the chess board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[repr(i8)]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// All squares, in rank-major order starting at a1.
    #[rustfmt::skip]
    pub const ALL: [Square; 64] = {
        use Square::*;
        [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ]
    };

    /// Constructs [`Square`] from a pair of [`File`] and [`Rank`].
    #[inline(always)]
    pub fn new(f: File, r: Rank) -> Self {
        Self::ALL[r.index() * 8 + f.index()]
    }

    /// This square's index in the range `0..64`.
    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// This square's [`File`].
    #[inline(always)]
    pub fn file(&self) -> File {
        File::ALL[self.index() % 8]
    }

    /// This square's [`Rank`].
    #[inline(always)]
    pub fn rank(&self) -> Rank {
        Rank::ALL[self.index() / 8]
    }

    /// The square some files and ranks away, if still on the board.
    #[inline(always)]
    pub fn try_offset(&self, df: i8, dr: i8) -> Option<Square> {
        let f = self.file().index() as i8 + df;
        let r = self.rank().index() as i8 + dr;

        if (0..8).contains(&f) && (0..8).contains(&r) {
            Some(Self::ALL[(r * 8 + f) as usize])
        } else {
            None
        }
    }

    /// An iterator over all squares.
    pub fn iter() -> impl DoubleEndedIterator<Item = Square> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.file(), f)?;
        fmt::Display::fmt(&self.rank(), f)?;
        Ok(())
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseSquareError {
    #[display("failed to parse square")]
    InvalidFile(ParseFileError),
    #[display("failed to parse square")]
    InvalidRank(ParseRankError),
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let i = s.char_indices().nth(1).map_or_else(|| s.len(), |(i, _)| i);
        Ok(Square::new(s[..i].parse()?, s[i..].parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn new_constructs_square_from_pair_of_file_and_rank(sq: Square) {
        assert_eq!(Square::new(sq.file(), sq.rank()), sq);
    }

    #[proptest]
    fn square_has_an_index_in_range(sq: Square) {
        assert_eq!(sq, Square::ALL[sq.index()]);
    }

    #[proptest]
    fn try_offset_stays_within_the_board(
        sq: Square,
        #[strategy(-8i8..=8)] df: i8,
        #[strategy(-8i8..=8)] dr: i8,
    ) {
        match sq.try_offset(df, dr) {
            None => {}
            Some(to) => {
                assert_eq!(to.file() - sq.file(), df);
                assert_eq!(to.rank() - sq.rank(), dr);
            }
        }
    }

    #[proptest]
    fn try_offset_returns_none_beyond_the_edge(sq: Square) {
        assert_eq!(sq.try_offset(8, 0), None);
        assert_eq!(sq.try_offset(0, 8), None);
        assert_eq!(sq.try_offset(-8, 0), None);
        assert_eq!(sq.try_offset(0, -8), None);
    }

    #[proptest]
    fn parsing_printed_square_is_an_identity(sq: Square) {
        assert_eq!(sq.to_string().parse(), Ok(sq));
    }

    #[proptest]
    fn parsing_square_fails_if_file_invalid(
        #[filter(!('a'..='h').contains(&#c))] c: char,
        r: Rank,
    ) {
        assert_eq!(
            [c.to_string(), r.to_string()].concat().parse::<Square>(),
            Err(ParseSquareError::InvalidFile(ParseFileError))
        );
    }

    #[proptest]
    fn parsing_square_fails_if_rank_invalid(
        f: File,
        #[filter(!('1'..='8').contains(&#c))] c: char,
    ) {
        assert_eq!(
            [f.to_string(), c.to_string()].concat().parse::<Square>(),
            Err(ParseSquareError::InvalidRank(ParseRankError))
        );
    }

    #[proptest]
    fn parsing_square_fails_if_length_not_two(#[filter(#s.len() != 2)] s: String) {
        assert_eq!(s.parse::<Square>().ok(), None);
    }
}
