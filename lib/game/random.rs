use crate::chess::Move;
use crate::game::Game;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// A move proposer that picks uniformly among the legal moves.
#[derive(Debug)]
pub struct RandomMover<R> {
    rng: R,
}

impl RandomMover<StdRng> {
    /// A mover with a deterministic seed.
    pub fn seeded(seed: u64) -> Self {
        RandomMover {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomMover<R> {
    pub fn new(rng: R) -> Self {
        RandomMover { rng }
    }

    /// Proposes one of the legal moves, if there is any.
    pub fn propose(&mut self, game: &Game) -> Option<Move> {
        game.legal_moves().choose(&mut self.rng).copied()
    }
}
