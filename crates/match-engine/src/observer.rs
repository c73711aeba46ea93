//! Read-only feed of match progress for presentation layers.
//!
//! Observers are notified after every accepted move and at the end of every
//! game and of the match. They only ever see shared references, so they can
//! render or log what happened but cannot influence play.

use crate::board::{Board, Move};
use crate::game_runner::{MatchSummary, Tally};
use crate::record::GameOutcome;
use crate::timer::Timer;
use shakmaty::Color;

/// State after one accepted move.
#[derive(Debug)]
pub struct MoveEvent<'a> {
    /// Zero-based index of the game within the match.
    pub game_index: usize,
    /// Board after the move was applied.
    pub board: &'a Board,
    pub mover: Color,
    pub mv: &'a Move,
    pub white_timer: &'a Timer,
    pub black_timer: &'a Timer,
}

/// Receives match progress. Every method defaults to doing nothing.
pub trait MatchObserver {
    fn on_game_start(&mut self, _game_index: usize, _board: &Board) {}

    fn on_move(&mut self, _event: &MoveEvent<'_>) {}

    fn on_game_over(&mut self, _game_index: usize, _outcome: &GameOutcome, _tally: &Tally) {}

    fn on_match_over(&mut self, _summary: &MatchSummary) {}
}
