use crate::chess::{Color, File, Piece, Rank, Role, Square};
use derive_more::{Debug, Display, Error, From};
use std::{fmt, ops::Index, str::FromStr};

/// An immutable snapshot of the piece placement on the board.
///
/// Auxiliary legality state, such as the side to move, the castling rights,
/// and the en passant target square, lives with the
/// [`Game`][`crate::game::Game`] that owns this snapshot.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[debug("Position({self})")]
pub struct Position {
    squares: [Option<Piece>; 64],
}

impl Position {
    /// An empty board.
    fn empty() -> Self {
        Position {
            squares: [None; 64],
        }
    }

    /// The [`Piece`] on the given [`Square`], if any.
    #[inline(always)]
    pub fn piece_on(&self, s: Square) -> Option<Piece> {
        self.squares[s.index()]
    }

    /// The [`Color`] of the piece on the given [`Square`], if any.
    #[inline(always)]
    pub fn color_on(&self, s: Square) -> Option<Color> {
        self.piece_on(s).map(|p| p.color())
    }

    /// The [`Role`] of the piece on the given [`Square`], if any.
    #[inline(always)]
    pub fn role_on(&self, s: Square) -> Option<Role> {
        self.piece_on(s).map(|p| p.role())
    }

    /// An iterator over all pieces on the board, in square order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Piece, Square)> + '_ {
        Square::iter().filter_map(|s| Some((self.piece_on(s)?, s)))
    }

    /// An iterator over the squares occupied by pieces of a [`Color`].
    pub fn by_color(&self, c: Color) -> impl DoubleEndedIterator<Item = Square> + '_ {
        self.iter()
            .filter(move |(p, _)| p.color() == c)
            .map(|(_, s)| s)
    }

    /// The [`Square`] occupied by the king of the given color.
    pub fn king(&self, side: Color) -> Option<Square> {
        self.iter()
            .find(|(p, _)| *p == Piece(side, Role::King))
            .map(|(_, s)| s)
    }

    pub(crate) fn set(&mut self, s: Square, p: Option<Piece>) {
        self.squares[s.index()] = p;
    }
}

/// The standard starting position.
impl Default for Position {
    fn default() -> Self {
        use Role::*;

        let mut pos = Position::empty();
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        for color in Color::iter() {
            for (f, role) in File::iter().zip(back) {
                let home = Square::new(f, Rank::home(color));
                pos.set(home, Some(Piece(color, role)));

                let pawn = match color {
                    Color::White => home.try_offset(0, 1),
                    Color::Black => home.try_offset(0, -1),
                };

                if let Some(s) = pawn {
                    pos.set(s, Some(Piece(color, Pawn)));
                }
            }
        }

        pos
    }
}

/// Retrieves the [`Piece`] on a given [`Square`], if any.
impl Index<Square> for Position {
    type Output = Option<Piece>;

    #[inline(always)]
    fn index(&self, s: Square) -> &Self::Output {
        &self.squares[s.index()]
    }
}

/// Positions are printed as the piece placement field of a [FEN] string.
///
/// [FEN]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in Rank::iter().rev() {
            let mut skip = 0;

            for file in File::iter() {
                match self.piece_on(Square::new(file, r)) {
                    None => skip += 1,
                    Some(p) => {
                        if skip > 0 {
                            write!(f, "{skip}")?;
                            skip = 0;
                        }

                        write!(f, "{p}")?;
                    }
                }
            }

            if skip > 0 {
                write!(f, "{skip}")?;
            }

            if r != Rank::First {
                f.write_str("/")?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Position`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParsePositionError {
    InvalidPlacement(InvalidPlacement),
    IllegalPosition(IllegalPosition),
}

/// The reason why the string is not a valid piece placement.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display("syntax error in the piece placement field")]
pub struct InvalidPlacement;

/// The reason why the parsed placement is illegal.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum IllegalPosition {
    #[display("at least one side has no king")]
    MissingKing,
    #[display("at least one side has multiple kings")]
    TooManyKings,
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pos = Position::empty();
        let ranks: Vec<&str> = s.split('/').collect();

        if ranks.len() != 8 {
            return Err(InvalidPlacement.into());
        }

        for (row, r) in ranks.into_iter().zip(Rank::iter().rev()) {
            let mut files = File::iter();

            for c in row.chars() {
                match c.to_digit(10) {
                    Some(n @ 1..=8) => {
                        for _ in 0..n {
                            files.next().ok_or(InvalidPlacement)?;
                        }
                    }

                    Some(_) => return Err(InvalidPlacement.into()),

                    None => {
                        let file = files.next().ok_or(InvalidPlacement)?;
                        let piece = c.to_string().parse().map_err(|_| InvalidPlacement)?;
                        pos.set(Square::new(file, r), Some(piece));
                    }
                }
            }

            if files.next().is_some() {
                return Err(InvalidPlacement.into());
            }
        }

        for side in Color::iter() {
            let kings = pos
                .iter()
                .filter(|(p, _)| *p == Piece(side, Role::King))
                .count();

            match kings {
                0 => return Err(IllegalPosition::MissingKing.into()),
                1 => {}
                _ => return Err(IllegalPosition::TooManyKings.into()),
            }
        }

        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{arbiter, Castles, Move, Promotion};
    use proptest::prelude::*;
    use std::fmt::Debug;
    use proptest::sample::{Selector, SelectorStrategy};
    use proptest::strategy::Map;
    use std::ops::Range;
    use test_strategy::proptest;

    impl Arbitrary for Position {
        type Parameters = ();
        type Strategy = Map<(Range<usize>, SelectorStrategy), fn((usize, Selector)) -> Position>;

        /// Reachable positions, generated by playing random legal moves.
        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            (0..64usize, any::<Selector>()).prop_map(|(plies, selector)| {
                let mut pos = Position::default();
                let mut turn = Color::White;
                let mut rights = Castles::all();
                let mut ep = None;

                for _ in 0..plies {
                    let moves = arbiter::legal_moves(&pos, turn, rights, ep);

                    let Some(m) = selector.try_select(moves) else {
                        break;
                    };

                    // auto-queen, so pawns never linger on the last rank
                    let m = match pos.role_on(m.whence()) {
                        Some(Role::Pawn) if m.whither().rank() == Rank::last(turn) => {
                            Move(m.whence(), m.whither(), Promotion::Queen)
                        }
                        _ => m,
                    };

                    ep = arbiter::en_passant_after(&pos, m);
                    rights = arbiter::rights_after(rights, m);
                    pos = arbiter::perform_move(&pos, m);
                    turn = !turn;
                }

                pos
            })
        }
    }

    #[proptest]
    fn iter_returns_pieces_and_squares(pos: Position) {
        for (p, s) in pos.iter() {
            assert_eq!(pos[s], Some(p));
        }
    }

    #[proptest]
    fn by_color_returns_squares_occupied_by_pieces_of_a_color(pos: Position, c: Color) {
        for s in pos.by_color(c) {
            assert_eq!(pos.color_on(s), Some(c));
        }
    }

    #[proptest]
    fn piece_on_returns_piece_on_the_given_square(pos: Position, s: Square) {
        assert_eq!(
            pos.piece_on(s),
            Option::zip(pos.color_on(s), pos.role_on(s)).map(|(c, r)| Piece(c, r))
        );
    }

    #[proptest]
    fn exactly_one_king_of_each_color_is_always_on_the_board(pos: Position, c: Color) {
        assert_eq!(pos.king(c).map(|s| pos[s]), Some(Some(Piece(c, Role::King))));
    }

    #[proptest]
    fn position_can_be_indexed_by_square(pos: Position, s: Square) {
        assert_eq!(pos[s], pos.piece_on(s));
    }

    #[test]
    fn default_position_is_the_standard_starting_position() {
        assert_eq!(
            Position::default().to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[proptest]
    fn parsing_printed_position_is_an_identity(pos: Position) {
        assert_eq!(pos.to_string().parse(), Ok(pos));
    }

    #[test]
    fn parsing_position_fails_without_exactly_one_king_per_side() {
        assert_eq!(
            "8/8/8/8/8/8/8/K7".parse::<Position>(),
            Err(IllegalPosition::MissingKing.into())
        );

        assert_eq!(
            "kk6/8/8/8/8/8/8/K7".parse::<Position>(),
            Err(IllegalPosition::TooManyKings.into())
        );
    }

    #[proptest]
    fn parsing_invalid_placement_fails(#[strategy("[^pnbrqkPNBRQK1-8/]+")] s: String) {
        assert_eq!(
            s.parse::<Position>().ok(),
            None::<Position>
        );
    }
}
