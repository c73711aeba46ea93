//! Match engine - runs chess matches between pluggable players.
//!
//! Players ("AIs") pick moves, a per-player clock is charged for thinking
//! time, and the match loop enforces legality, detects the end of each game
//! and repeats games until one side reaches a win threshold. Chess rules come
//! from the `shakmaty` crate.
//!
//! # Modules
//!
//! - [`game_runner`] - The match state machine
//! - [`board`] - Rules adapter over `shakmaty`
//! - [`timer`] - Per-player clocks
//! - [`move_source`] - The player trait and its random, human and UCI engine variants
//! - [`record`] - Append-only match record and its serializable document
//! - [`observer`] - Read-only progress feed for presentation layers
//! - [`registry`] - Name lookup for players, clocks and display modes
//! - [`uci_client`] - Subprocess client for UCI engines

pub mod board;
pub mod game_runner;
mod human;
pub mod move_source;
pub mod observer;
mod random_mover;
pub mod record;
pub mod registry;
pub mod timer;
pub mod uci_client;
mod uci_engine;

pub use board::{Board, Move, StartPosition};
pub use game_runner::{Match, MatchError, MatchSettings, MatchSummary, Tally};
pub use record::{GameOutcome, MatchRecord, RecordDocument};
pub use shakmaty::Color;
pub use timer::{SecondsLeft, Timer};
