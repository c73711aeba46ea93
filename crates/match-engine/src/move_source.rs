//! Move selection strategies.
//!
//! Every player in a match is a [`MoveSource`]: given the current board and
//! its own clock it produces one move. The match loop is agnostic to how the
//! move was chosen; it only validates and applies the result.

use crate::board::{Board, Move};
use crate::timer::Timer;
use crate::uci_client::UciError;
use thiserror::Error;

pub use crate::human::HumanPlayer;
pub use crate::random_mover::RandomMover;
pub use crate::uci_engine::UciEngine;

/// Reasons a move source could not produce a move.
///
/// The match treats any of these as the player resigning the current game.
#[derive(Error, Debug)]
pub enum MoveSourceError {
    /// The position has no legal moves to choose from.
    #[error("No legal moves available")]
    NoLegalMoves,
    /// The interactive input channel was closed before a move was entered.
    #[error("Input closed before a move was entered")]
    InputClosed,
    /// Reading from or writing to the interactive channel failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An external engine failed or returned garbage.
    #[error("Engine error: {0}")]
    Engine(String),
    /// Communication with a UCI engine failed.
    #[error("UCI error: {0}")]
    Uci(#[from] UciError),
}

/// A strategy that picks one move for the side to move.
///
/// Implementations receive shared references only and therefore cannot alter
/// the board or the clock. A returned move is expected to be legal; the match
/// forfeits the game for the mover if it is not.
pub trait MoveSource {
    /// Human-readable name used in logs and the match record.
    fn name(&self) -> &str;

    /// Chooses a move for `board.side_to_move()`.
    ///
    /// # Errors
    ///
    /// Returns an error if no move can be produced at all.
    fn make_move(&mut self, board: &Board, timer: &Timer) -> Result<Move, MoveSourceError>;
}

impl<T: MoveSource + ?Sized> MoveSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn make_move(&mut self, board: &Board, timer: &Timer) -> Result<Move, MoveSourceError> {
        (**self).make_move(board, timer)
    }
}
