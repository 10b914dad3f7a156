//! The rules arbiter.
//!
//! Free functions that decide which moves are legal, apply moves to a
//! [`Position`], and classify terminal positions. The arbiter is stateless,
//! the side to move, the castling rights, and the en passant target square
//! are threaded through as arguments by the caller.

use crate::chess::generate::{self, Destinations};
use crate::chess::{
    Castles, Color, File, Move, Outcome, Piece, Position, Promotion, Rank, Role, Square,
};

/// Whether any piece of the given color attacks the square.
pub fn attacks_square(pos: &Position, sq: Square, by: Color) -> bool {
    pos.by_color(by)
        .any(|whence| generate::attacks(pos, whence).contains(&sq))
}

/// Whether the given side's king is attacked.
///
/// Vacuously `false` if the king is absent from the board.
pub fn in_check(pos: &Position, side: Color) -> bool {
    match pos.king(side) {
        Some(sq) => attacks_square(pos, sq, !side),
        None => false,
    }
}

/// The legal destinations of the piece on a square.
///
/// Pseudo-legal destinations that would leave the mover's own king attacked
/// are filtered out by playing each candidate on a scratch position.
pub fn legal_from(
    pos: &Position,
    whence: Square,
    rights: Castles,
    ep: Option<Square>,
) -> Destinations {
    let Some(side) = pos.color_on(whence) else {
        return Destinations::new();
    };

    let mut moves = generate::destinations(pos, whence, rights, ep);
    moves.retain(|to| !in_check(&perform_move(pos, Move(whence, *to, Promotion::None)), side));
    moves
}

/// Every legal move for the given side, in square order.
///
/// Promotions are reported once per destination with an empty [`Promotion`]
/// specifier, the choice of piece is a separate decision.
pub fn legal_moves(pos: &Position, side: Color, rights: Castles, ep: Option<Square>) -> Vec<Move> {
    pos.by_color(side)
        .flat_map(|whence| {
            legal_from(pos, whence, rights, ep)
                .into_iter()
                .map(move |to| Move(whence, to, Promotion::None))
        })
        .collect()
}

/// Applies a move to a position, resolving captures, en passant, castling,
/// and an explicit promotion choice.
///
/// The move is trusted to be legal. A pawn that reaches the last rank
/// without a [`Promotion`] specifier stays a pawn, callers that split
/// promotion into a separate step replace it afterwards via [`promote`].
pub fn perform_move(pos: &Position, m: Move) -> Position {
    let mut next = pos.clone();

    let Some(piece) = pos.piece_on(m.whence()) else {
        return next;
    };

    let (whence, whither) = (m.whence(), m.whither());

    // a pawn moving diagonally to an empty square captures en passant
    if piece.role() == Role::Pawn && whence.file() != whither.file() && pos[whither].is_none() {
        next.set(Square::new(whither.file(), whence.rank()), None);
    }

    // the rook jumps over when the king moves two files
    if piece.role() == Role::King && (whither.file() - whence.file()).abs() == 2 {
        let home = whence.rank();

        let (from, to) = if whither.file() > whence.file() {
            (Square::new(File::H, home), Square::new(File::F, home))
        } else {
            (Square::new(File::A, home), Square::new(File::D, home))
        };

        next.set(to, pos[from]);
        next.set(from, None);
    }

    next.set(whence, None);

    let piece = match m.promotion().role() {
        Some(role) if piece.role() == Role::Pawn && whither.rank() == Rank::last(piece.color()) => {
            Piece(piece.color(), role)
        }

        _ => piece,
    };

    next.set(whither, Some(piece));
    next
}

/// Replaces the piece on a square with another of the same color.
pub fn promote(pos: &Position, sq: Square, role: Role) -> Position {
    let mut next = pos.clone();

    if let Some(p) = pos.piece_on(sq) {
        next.set(sq, Some(Piece(p.color(), role)));
    }

    next
}

/// The castling rights that remain once a move has touched its squares.
#[inline(always)]
pub fn rights_after(rights: Castles, m: Move) -> Castles {
    rights & !Castles::from(m.whence()) & !Castles::from(m.whither())
}

/// The en passant target square a move leaves behind, if any.
///
/// Expects the position as it stands before the move is played.
pub fn en_passant_after(pos: &Position, m: Move) -> Option<Square> {
    if pos.role_on(m.whence()) != Some(Role::Pawn) || m.whence().file() != m.whither().file() {
        return None;
    }

    match m.whither().rank() - m.whence().rank() {
        2 => m.whence().try_offset(0, 1),
        -2 => m.whence().try_offset(0, -1),
        _ => None,
    }
}

fn insufficient_material(pos: &Position) -> bool {
    let mut minors = 0;

    for (p, _) in pos.iter() {
        match p.role() {
            Role::King => {}
            Role::Knight | Role::Bishop => minors += 1,
            _ => return false,
        }
    }

    minors <= 1
}

/// Classifies the position from the perspective of the side to move.
///
/// Returns `None` while the game can continue, otherwise the [`Outcome`]
/// that ends it. A side with no legal moves is checkmated if its king is
/// attacked and stalemated if not. Bare kings, or bare kings plus a single
/// minor piece, cannot force mate and draw immediately.
pub fn classify(
    pos: &Position,
    to_move: Color,
    rights: Castles,
    ep: Option<Square>,
) -> Option<Outcome> {
    if legal_moves(pos, to_move, rights, ep).is_empty() {
        if in_check(pos, to_move) {
            Some(Outcome::Checkmate(!to_move))
        } else {
            Some(Outcome::Stalemate)
        }
    } else if insufficient_material(pos) {
        Some(Outcome::DrawByInsufficientMaterial)
    } else {
        None
    }
}
