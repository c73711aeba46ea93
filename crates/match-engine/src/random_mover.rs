//! Random move bot - plays a uniformly random legal move.

use crate::board::{Board, Move};
use crate::move_source::{MoveSource, MoveSourceError};
use crate::timer::Timer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Picks uniformly among the legal moves of the current position.
///
/// Deterministic when constructed with [`RandomMover::seeded`] or any other
/// caller-supplied RNG.
pub struct RandomMover<R: Rng = StdRng> {
    rng: R,
}

impl RandomMover<StdRng> {
    /// Creates a mover seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a mover whose choices are fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomMover<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MoveSource for RandomMover<R> {
    fn name(&self) -> &str {
        "random"
    }

    fn make_move(&mut self, board: &Board, _timer: &Timer) -> Result<Move, MoveSourceError> {
        board
            .legal_moves()
            .choose(&mut self.rng)
            .cloned()
            .ok_or(MoveSourceError::NoLegalMoves)
    }
}
