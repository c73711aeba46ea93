//! The match state machine.
//!
//! [`Match`] owns both players, both clocks, the board and the record. It
//! plays games move by move until one side has won the configured number of
//! games:
//!
//! 1. ask the side to move for a move and time how long it took;
//! 2. forfeit the game for the mover if the move is illegal;
//! 3. apply the move and charge the thinking time to the mover's clock;
//! 4. record the move, then forfeit on time if the clock ran out;
//! 5. stop the game if the rules say it is over.

use crate::board::{Board, BoardError, StartPosition, Termination};
use crate::move_source::MoveSource;
use crate::observer::{MatchObserver, MoveEvent};
use crate::record::{DrawReason, GameOutcome, MatchRecord, RecordError, WinReason};
use crate::timer::Timer;
use shakmaty::uci::UciMove;
use shakmaty::Color;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that stop a match from being played.
///
/// Illegal moves, resignations and time forfeits are not errors; they end
/// the current game and are recorded as its outcome.
#[derive(Error, Debug)]
pub enum MatchError {
    /// The match needs at least one win to finish.
    #[error("wins_required must be at least 1")]
    InvalidWinsRequired,
    /// The starting position is already a draw, so no game could ever be won.
    #[error("Starting position is already drawn: {0:?}")]
    DrawnStartPosition(Termination),
    /// The starting position could not be set up.
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
    /// The record was written out of order.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
    /// A game was requested after the match was decided.
    #[error("The match is already over")]
    MatchOver,
}

/// Source of monotonic time used to measure thinking time.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a move source holding one clone can
/// simulate thinking time that the match observes through another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Settings fixed for the lifetime of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    /// Games a side must win to take the match.
    pub wins_required: u32,
    /// Position every game starts from.
    pub start: StartPosition,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            wins_required: 1,
            start: StartPosition::Standard,
        }
    }
}

/// Running score of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

impl Tally {
    pub fn wins(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white_wins,
            Color::Black => self.black_wins,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.white_wins + self.black_wins + self.draws
    }

    fn add(&mut self, outcome: &GameOutcome) {
        match outcome.winner() {
            Some(Color::White) => self.white_wins += 1,
            Some(Color::Black) => self.black_wins += 1,
            None => self.draws += 1,
        }
    }
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSummary {
    pub winner: Color,
    pub tally: Tally,
}

/// Runs games between two move sources until one reaches the win threshold.
///
/// # Example
///
/// ```
/// use match_engine::game_runner::{Match, MatchSettings};
/// use match_engine::move_source::RandomMover;
/// use match_engine::timer::Timer;
///
/// let mut game = Match::new(
///     Box::new(RandomMover::seeded(1)),
///     Box::new(RandomMover::seeded(2)),
///     Timer::unbounded(),
///     Timer::unbounded(),
///     MatchSettings::default(),
/// )?;
/// let summary = game.play_match()?;
/// assert_eq!(summary.tally.wins(summary.winner), 1);
/// # Ok::<(), match_engine::game_runner::MatchError>(())
/// ```
pub struct Match {
    white: Box<dyn MoveSource>,
    black: Box<dyn MoveSource>,
    white_timer: Timer,
    black_timer: Timer,
    settings: MatchSettings,
    board: Board,
    record: MatchRecord,
    tally: Tally,
    clock: Box<dyn Clock>,
    observers: Vec<Box<dyn MatchObserver>>,
}

impl Match {
    /// Creates a match, validating the settings before any game starts.
    ///
    /// # Errors
    ///
    /// Returns an error if `wins_required` is zero or the starting position is
    /// invalid or already drawn.
    pub fn new(
        white: Box<dyn MoveSource>,
        black: Box<dyn MoveSource>,
        white_timer: Timer,
        black_timer: Timer,
        settings: MatchSettings,
    ) -> Result<Self, MatchError> {
        if settings.wins_required == 0 {
            return Err(MatchError::InvalidWinsRequired);
        }
        let board = Board::new(&settings.start)?;
        if let Some(drawn) = board
            .status()
            .filter(|t| !matches!(t, Termination::Checkmate { .. }))
        {
            return Err(MatchError::DrawnStartPosition(drawn));
        }

        Ok(Self {
            white,
            black,
            white_timer,
            black_timer,
            settings,
            board,
            record: MatchRecord::new(),
            tally: Tally::default(),
            clock: Box::new(SystemClock::default()),
            observers: Vec::new(),
        })
    }

    /// Replaces the wall clock used to time moves.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Registers a presentation observer.
    pub fn add_observer(&mut self, observer: Box<dyn MatchObserver>) {
        self.observers.push(observer);
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// The board of the current (or last finished) game.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn timer(&self, color: Color) -> &Timer {
        match color {
            Color::White => &self.white_timer,
            Color::Black => &self.black_timer,
        }
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn record(&self) -> &MatchRecord {
        &self.record
    }

    pub fn into_record(self) -> MatchRecord {
        self.record
    }

    /// Returns the match winner once a side has reached the win threshold.
    pub fn winner(&self) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|&c| self.tally.wins(c) >= self.settings.wins_required)
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }

    /// Plays games until one side reaches the win threshold.
    pub fn play_match(&mut self) -> Result<MatchSummary, MatchError> {
        tracing::info!(
            white = self.white.name(),
            black = self.black.name(),
            wins_required = self.settings.wins_required,
            "Match started"
        );

        let winner = loop {
            if let Some(winner) = self.winner() {
                break winner;
            }
            self.play_game()?;
        };

        let summary = MatchSummary {
            winner,
            tally: self.tally,
        };
        tracing::info!(
            winner = ?winner,
            white_wins = summary.tally.white_wins,
            black_wins = summary.tally.black_wins,
            draws = summary.tally.draws,
            "Match finished"
        );
        for observer in self.observers.iter_mut() {
            observer.on_match_over(&summary);
        }
        Ok(summary)
    }

    /// Plays one game from a fresh board and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MatchOver`] if the match is already decided.
    pub fn play_game(&mut self) -> Result<GameOutcome, MatchError> {
        if self.is_over() {
            return Err(MatchError::MatchOver);
        }

        let game_index = self.record.games().len();
        self.board = Board::new(&self.settings.start)?;
        self.record
            .begin_game(&self.board.fen(), self.white.name(), self.black.name());
        tracing::debug!(game = game_index + 1, fen = %self.board.fen(), "Game started");
        for observer in self.observers.iter_mut() {
            observer.on_game_start(game_index, &self.board);
        }

        let outcome = loop {
            if let Some(termination) = self.board.status() {
                break outcome_for(termination);
            }
            if let Some(outcome) = self.play_move(game_index)? {
                break outcome;
            }
        };

        self.record.seal(outcome)?;
        self.tally.add(&outcome);
        tracing::info!(
            game = game_index + 1,
            moves = self.record.games()[game_index].moves().len(),
            %outcome,
            "Game finished"
        );
        for observer in self.observers.iter_mut() {
            observer.on_game_over(game_index, &outcome, &self.tally);
        }
        Ok(outcome)
    }

    /// Runs one turn. Returns the outcome if the move ended the game.
    fn play_move(&mut self, game_index: usize) -> Result<Option<GameOutcome>, MatchError> {
        let side = self.board.side_to_move();
        let opponent = side.other();

        let started = self.clock.now();
        let proposal = match side {
            Color::White => self.white.make_move(&self.board, &self.white_timer),
            Color::Black => self.black.make_move(&self.board, &self.black_timer),
        };
        let elapsed = self.clock.now().saturating_sub(started);

        let mv = match proposal {
            Ok(UciMove::Null) => {
                tracing::warn!(side = ?side, "Null move submitted, treating as resignation");
                return Ok(Some(GameOutcome::win(opponent, WinReason::Resignation)));
            }
            Ok(mv) => mv,
            Err(e) => {
                tracing::warn!(side = ?side, error = %e, "No move produced, treating as resignation");
                return Ok(Some(GameOutcome::win(opponent, WinReason::Resignation)));
            }
        };

        if !self.board.is_legal(&mv) {
            tracing::warn!(side = ?side, mv = %mv, "Illegal move, game forfeited");
            return Ok(Some(GameOutcome::win(opponent, WinReason::IllegalMove)));
        }
        self.board.play(&mv)?;

        let timer = match side {
            Color::White => &mut self.white_timer,
            Color::Black => &mut self.black_timer,
        };
        let in_time = timer.record_move(elapsed);
        let snapshot = timer.snapshot();
        self.record.append(side, &mv, snapshot)?;
        tracing::debug!(
            side = ?side,
            mv = %mv,
            elapsed_ms = elapsed.as_millis() as u64,
            seconds_left = %self.timer(side).seconds_left(),
            "Move played"
        );

        let event = MoveEvent {
            game_index,
            board: &self.board,
            mover: side,
            mv: &mv,
            white_timer: &self.white_timer,
            black_timer: &self.black_timer,
        };
        for observer in self.observers.iter_mut() {
            observer.on_move(&event);
        }

        if !in_time {
            tracing::warn!(side = ?side, "Out of time, game forfeited");
            return Ok(Some(GameOutcome::win(opponent, WinReason::TimeForfeit)));
        }
        Ok(self.board.status().map(outcome_for))
    }
}

/// Maps a rules-based termination to a game outcome.
fn outcome_for(termination: Termination) -> GameOutcome {
    match termination {
        Termination::Checkmate { winner } => GameOutcome::win(winner, WinReason::Checkmate),
        Termination::Stalemate => GameOutcome::Draw {
            reason: DrawReason::Stalemate,
        },
        Termination::InsufficientMaterial => GameOutcome::Draw {
            reason: DrawReason::InsufficientMaterial,
        },
        Termination::SeventyFiveMoveRule => GameOutcome::Draw {
            reason: DrawReason::SeventyFiveMoveRule,
        },
        Termination::FivefoldRepetition => GameOutcome::Draw {
            reason: DrawReason::FivefoldRepetition,
        },
    }
}
