//! Interactive player that reads moves from a text channel.

use crate::board::{Board, Move, MoveParseError};
use crate::move_source::{MoveSource, MoveSourceError};
use crate::timer::Timer;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

const PROMPT: &str = "Select move in UCI format: ";

/// Asks a person for moves until a legal one is entered.
///
/// Malformed text and illegal moves are reported on the output channel and
/// the prompt is repeated, together with the player's remaining time. The
/// call blocks for as long as the person takes; the match charges the whole
/// wait to the player's clock afterwards.
pub struct HumanPlayer<R, W> {
    input: R,
    output: W,
}

impl HumanPlayer<BufReader<Stdin>, Stdout> {
    /// Creates a player bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the player and returns the output channel.
    pub fn into_output(self) -> W {
        self.output
    }

    fn reject(&mut self, message: &str, timer: &Timer) -> io::Result<()> {
        writeln!(self.output, "{}", message)?;
        writeln!(self.output, "{} seconds left", timer.seconds_left())
    }
}

impl<R: BufRead, W: Write> MoveSource for HumanPlayer<R, W> {
    fn name(&self) -> &str {
        "human"
    }

    fn make_move(&mut self, board: &Board, timer: &Timer) -> Result<Move, MoveSourceError> {
        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(MoveSourceError::InputClosed);
            }

            match board.parse_move(&line) {
                Ok(mv) => return Ok(mv),
                Err(MoveParseError::Malformed(_)) => {
                    self.reject("Incorrect UCI format, try again", timer)?
                }
                Err(MoveParseError::Illegal(_)) => self.reject("Illegal move, try again.", timer)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn run(input: &str, timer: &Timer) -> (Result<Move, MoveSourceError>, String) {
        let mut player = HumanPlayer::new(Cursor::new(input.to_string()), Vec::new());
        let result = player.make_move(&Board::default(), timer);
        let output = String::from_utf8(player.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn test_accepts_legal_move() {
        let (result, output) = run("e2e4\n", &Timer::unbounded());
        assert_eq!(result.unwrap(), "e2e4".parse::<Move>().unwrap());
        assert_eq!(output, PROMPT);
    }

    #[test]
    fn test_reprompts_on_malformed_text() {
        let timer = Timer::with_increment(Duration::from_secs(30), Duration::ZERO);
        let (result, output) = run("knight to f3\ng1f3\n", &timer);
        assert_eq!(result.unwrap(), "g1f3".parse::<Move>().unwrap());
        assert!(output.contains("Incorrect UCI format, try again"));
        assert!(output.contains("30.0 seconds left"));
        assert_eq!(output.matches(PROMPT).count(), 2);
    }

    #[test]
    fn test_reprompts_on_illegal_move() {
        let (result, output) = run("e2e5\ne7e5\nd2d4\n", &Timer::unbounded());
        assert_eq!(result.unwrap(), "d2d4".parse::<Move>().unwrap());
        assert_eq!(output.matches("Illegal move, try again.").count(), 2);
        assert!(output.contains("unlimited seconds left"));
    }

    #[test]
    fn test_null_move_is_rejected() {
        let (result, output) = run("0000\ne2e3\n", &Timer::unbounded());
        assert_eq!(result.unwrap(), "e2e3".parse::<Move>().unwrap());
        assert!(output.contains("Illegal move, try again."));
    }

    #[test]
    fn test_closed_input() {
        let (result, _) = run("e9e9\n", &Timer::unbounded());
        assert!(matches!(result, Err(MoveSourceError::InputClosed)));
    }
}
