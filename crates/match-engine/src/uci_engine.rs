//! Player backed by an external UCI engine.

use crate::board::{Board, Move};
use crate::move_source::{MoveSource, MoveSourceError};
use crate::timer::{SecondsLeft, Timer};
use crate::uci_client::{UciClient, UciError};
use std::path::Path;
use std::time::Duration;

/// Shortest search the engine is asked for when budgeting from the clock.
const MIN_MOVETIME: Duration = Duration::from_millis(50);

/// Share of the remaining budget spent on one move when budgeting from the clock.
const BUDGET_DIVISOR: u32 = 30;

/// Asks a UCI engine subprocess for each move.
///
/// The engine's answer is passed to the match as-is, so an engine that
/// returns an illegal move forfeits the game like any other player.
pub struct UciEngine {
    client: UciClient,
    name: String,
    time_control: Option<String>,
}

impl UciEngine {
    /// Spawns and initializes an engine.
    ///
    /// # Arguments
    ///
    /// * `path` - Engine executable
    /// * `args` - Extra command-line arguments for the engine
    /// * `time_control` - Fixed `go` parameters; `None` derives a movetime from the clock
    pub fn spawn<P: AsRef<Path>>(
        path: P,
        args: &[String],
        time_control: Option<String>,
    ) -> Result<Self, UciError> {
        let mut client = UciClient::spawn_with_args(path.as_ref(), args)?;
        client.init()?;
        let name = if client.name.is_empty() {
            path.as_ref().display().to_string()
        } else {
            client.name.clone()
        };
        tracing::info!(engine = %name, "UCI engine ready");
        Ok(Self {
            client,
            name,
            time_control,
        })
    }

    fn go_parameters(&self, timer: &Timer) -> String {
        if let Some(tc) = &self.time_control {
            return tc.clone();
        }
        match timer.seconds_left() {
            SecondsLeft::Finite(left) => {
                let budget = (left / BUDGET_DIVISOR).max(MIN_MOVETIME);
                format!("movetime {}", budget.as_millis())
            }
            SecondsLeft::Unbounded => "movetime 500".to_string(),
        }
    }
}

impl MoveSource for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn make_move(&mut self, board: &Board, timer: &Timer) -> Result<Move, MoveSourceError> {
        let go = self.go_parameters(timer);
        self.client.set_position(&board.fen())?;
        let bestmove = self.client.go(&go)?;
        bestmove
            .parse()
            .map_err(|_| MoveSourceError::Engine(format!("unparsable bestmove '{}'", bestmove)))
    }
}
