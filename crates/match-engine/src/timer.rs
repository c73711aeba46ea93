//! Per-player chess clocks.
//!
//! A [`Timer`] tracks how much thinking time one player has consumed over a
//! match and, for timed play, how much budget remains. Remaining time is a
//! tagged [`SecondsLeft`] value so untimed play never needs a sentinel number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Remaining thinking budget for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondsLeft {
    /// A finite budget that shrinks as the player thinks.
    Finite(Duration),
    /// Untimed play; the player can never run out.
    Unbounded,
}

impl SecondsLeft {
    /// Returns the remaining budget in seconds, or `None` when unbounded.
    pub fn as_secs_f64(&self) -> Option<f64> {
        match self {
            SecondsLeft::Finite(left) => Some(left.as_secs_f64()),
            SecondsLeft::Unbounded => None,
        }
    }

    /// Returns true if a finite budget has been used up.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, SecondsLeft::Finite(left) if left.is_zero())
    }
}

impl fmt::Display for SecondsLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondsLeft::Finite(left) => write!(f, "{:.1}", left.as_secs_f64()),
            SecondsLeft::Unbounded => write!(f, "unlimited"),
        }
    }
}

/// Point-in-time copy of a timer, stored alongside each recorded move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Total seconds consumed so far.
    pub time_clocked: f64,
    /// Remaining seconds, `None` for untimed play.
    pub seconds_left: Option<f64>,
}

/// Clock for one player, living for the whole match.
///
/// # Example
///
/// ```
/// use match_engine::timer::{SecondsLeft, Timer};
/// use std::time::Duration;
///
/// let mut timer = Timer::with_increment(Duration::from_secs(60), Duration::from_secs(2));
/// assert!(timer.record_move(Duration::from_secs(10)));
/// assert_eq!(timer.seconds_left(), SecondsLeft::Finite(Duration::from_secs(52)));
/// assert_eq!(timer.display_time(), "0:10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    time_clocked: Duration,
    seconds_left: SecondsLeft,
    increment: Duration,
}

impl Timer {
    /// Creates a timer with the given starting budget and per-move increment.
    pub fn new(seconds_left: SecondsLeft, increment: Duration) -> Self {
        Self {
            time_clocked: Duration::ZERO,
            seconds_left,
            increment,
        }
    }

    /// Creates an untimed clock that only accumulates consumed time.
    pub fn unbounded() -> Self {
        Self::new(SecondsLeft::Unbounded, Duration::ZERO)
    }

    /// Creates a Fischer clock: `start` budget plus `increment` after each move.
    pub fn with_increment(start: Duration, increment: Duration) -> Self {
        Self::new(SecondsLeft::Finite(start), increment)
    }

    pub fn seconds_left(&self) -> SecondsLeft {
        self.seconds_left
    }

    pub fn time_clocked(&self) -> Duration {
        self.time_clocked
    }

    pub fn increment(&self) -> Duration {
        self.increment
    }

    /// Returns true once a finite budget has hit zero.
    pub fn is_flagged(&self) -> bool {
        self.seconds_left.is_exhausted()
    }

    /// Charges one completed move's thinking time to this clock.
    ///
    /// Returns `false` if the move used up the whole remaining budget, in
    /// which case the budget is pinned at zero and no increment is credited.
    /// Unbounded clocks always return `true`.
    pub fn record_move(&mut self, elapsed: Duration) -> bool {
        self.time_clocked = self.time_clocked.saturating_add(elapsed);

        match &mut self.seconds_left {
            SecondsLeft::Unbounded => true,
            SecondsLeft::Finite(left) => {
                if elapsed >= *left {
                    *left = Duration::ZERO;
                    false
                } else {
                    *left = (*left - elapsed).saturating_add(self.increment);
                    true
                }
            }
        }
    }

    /// Formats the consumed time as `minutes:seconds`.
    pub fn display_time(&self) -> String {
        let total = self.time_clocked.as_secs();
        format!("{}:{:02}", total / 60, total % 60)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            time_clocked: self.time_clocked.as_secs_f64(),
            seconds_left: self.seconds_left.as_secs_f64(),
        }
    }
}
