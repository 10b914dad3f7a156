use lib::chess::{arbiter, Castles, Color, Position, Square};

/// Counts the leaf nodes of the legal move tree to a fixed depth.
fn perft(pos: &Position, turn: Color, rights: Castles, ep: Option<Square>, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;

    for m in arbiter::legal_moves(pos, turn, rights, ep) {
        let next = arbiter::perform_move(pos, m);
        let rights = arbiter::rights_after(rights, m);
        let ep = arbiter::en_passant_after(pos, m);

        nodes += perft(&next, !turn, rights, ep, depth - 1);
    }

    nodes
}

#[test]
fn perft_of_the_starting_position() {
    let pos = Position::default();

    for (depth, nodes) in [(1u8, 20u64), (2, 400), (3, 8902), (4, 197281)] {
        assert_eq!(perft(&pos, Color::White, Castles::all(), None, depth), nodes);
    }
}

#[test]
fn perft_of_an_endgame_with_en_passant_and_checks() {
    let pos = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8".parse::<Position>().unwrap();

    for (depth, nodes) in [(1u8, 14u64), (2, 191), (3, 2812), (4, 43238)] {
        assert_eq!(perft(&pos, Color::White, Castles::none(), None, depth), nodes);
    }
}
