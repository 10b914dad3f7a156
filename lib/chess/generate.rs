use crate::chess::{arbiter, Castles, Color, File, Piece, Position, Rank, Role, Square};
use arrayvec::ArrayVec;

/// The squares a single piece can reach from its square.
pub type Destinations = ArrayVec<Square, 28>;

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KING: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const KNIGHT: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

#[inline(always)]
fn forward(side: Color) -> i8 {
    match side {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// The squares a leaper reaches in a single step.
fn step(whence: Square, offsets: &[(i8, i8)], out: &mut Destinations) {
    for &(df, dr) in offsets {
        if let Some(to) = whence.try_offset(df, dr) {
            out.push(to);
        }
    }
}

/// The squares a slider reaches along each ray, up to and including the
/// first occupied square.
fn slide(pos: &Position, whence: Square, rays: &[(i8, i8)], out: &mut Destinations) {
    for &(df, dr) in rays {
        let mut current = whence;

        while let Some(to) = current.try_offset(df, dr) {
            out.push(to);

            if pos[to].is_some() {
                break;
            }

            current = to;
        }
    }
}

fn pawn_moves(pos: &Position, whence: Square, side: Color, ep: Option<Square>, out: &mut Destinations) {
    let dr = forward(side);

    // the mover only ever captures in passing onto its own sixth rank
    let ep = ep.filter(|sq| {
        sq.rank()
            == match side {
                Color::White => Rank::Sixth,
                Color::Black => Rank::Third,
            }
    });

    if let Some(to) = whence.try_offset(0, dr) {
        if pos[to].is_none() {
            out.push(to);

            let start = match side {
                Color::White => Rank::Second,
                Color::Black => Rank::Seventh,
            };

            if whence.rank() == start {
                if let Some(to) = whence.try_offset(0, 2 * dr) {
                    if pos[to].is_none() {
                        out.push(to);
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        if let Some(to) = whence.try_offset(df, dr) {
            if pos.color_on(to) == Some(!side) || ep == Some(to) {
                out.push(to);
            }
        }
    }
}

fn castling(pos: &Position, whence: Square, side: Color, rights: Castles, out: &mut Destinations) {
    let home = Rank::home(side);

    // the king must stand on its original square and not be in check
    if whence != Square::new(File::E, home) || arbiter::attacks_square(pos, whence, !side) {
        return;
    }

    let rook = Some(Piece(side, Role::Rook));

    if rights.has_short(side) && pos[Square::new(File::H, home)] == rook {
        let f = Square::new(File::F, home);
        let g = Square::new(File::G, home);

        if pos[f].is_none()
            && pos[g].is_none()
            && !arbiter::attacks_square(pos, f, !side)
            && !arbiter::attacks_square(pos, g, !side)
        {
            out.push(g);
        }
    }

    if rights.has_long(side) && pos[Square::new(File::A, home)] == rook {
        let b = Square::new(File::B, home);
        let c = Square::new(File::C, home);
        let d = Square::new(File::D, home);

        // the b-file square only needs to be empty, not safe
        if pos[b].is_none()
            && pos[c].is_none()
            && pos[d].is_none()
            && !arbiter::attacks_square(pos, c, !side)
            && !arbiter::attacks_square(pos, d, !side)
        {
            out.push(c);
        }
    }
}

/// The pseudo-legal destinations of the piece on a square.
///
/// Destinations respect occupancy, the castling `rights`, and the en passant
/// target square `ep`, but moving to them may still expose the mover's own
/// king to attack. Use [`arbiter::legal_from`] to filter those out.
pub fn destinations(
    pos: &Position,
    whence: Square,
    rights: Castles,
    ep: Option<Square>,
) -> Destinations {
    let mut moves = Destinations::new();

    let Some(Piece(side, role)) = pos.piece_on(whence) else {
        return moves;
    };

    match role {
        Role::Pawn => pawn_moves(pos, whence, side, ep, &mut moves),
        Role::Knight => step(whence, &KNIGHT, &mut moves),
        Role::Bishop => slide(pos, whence, &DIAGONAL, &mut moves),
        Role::Rook => slide(pos, whence, &ORTHOGONAL, &mut moves),

        Role::Queen => {
            slide(pos, whence, &ORTHOGONAL, &mut moves);
            slide(pos, whence, &DIAGONAL, &mut moves);
        }

        Role::King => {
            step(whence, &KING, &mut moves);
            castling(pos, whence, side, rights, &mut moves);
        }
    }

    moves.retain(|s| pos.color_on(*s) != Some(side));
    moves
}

/// The squares attacked by the piece on a square.
///
/// Unlike [`destinations`], pawns contribute their capture diagonals whether
/// or not they are occupied, castling never counts, and squares occupied by
/// friendly pieces are included, since a defended piece still denies the
/// square to the enemy king.
pub fn attacks(pos: &Position, whence: Square) -> Destinations {
    let mut targets = Destinations::new();

    let Some(Piece(side, role)) = pos.piece_on(whence) else {
        return targets;
    };

    match role {
        Role::Pawn => {
            for df in [-1, 1] {
                if let Some(to) = whence.try_offset(df, forward(side)) {
                    targets.push(to);
                }
            }
        }

        Role::Knight => step(whence, &KNIGHT, &mut targets),
        Role::Bishop => slide(pos, whence, &DIAGONAL, &mut targets),
        Role::Rook => slide(pos, whence, &ORTHOGONAL, &mut targets),

        Role::Queen => {
            slide(pos, whence, &ORTHOGONAL, &mut targets);
            slide(pos, whence, &DIAGONAL, &mut targets);
        }

        Role::King => step(whence, &KING, &mut targets),
    }

    targets
}
