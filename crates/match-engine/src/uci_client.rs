//! UCI (Universal Chess Interface) client for external chess engines.
//!
//! Spawns an engine as a subprocess and speaks just enough of the protocol to
//! ask it for moves: the `uci`/`isready` handshake, `position fen`, `go` and
//! `quit`.
//!
//! # Example
//!
//! ```no_run
//! use match_engine::uci_client::UciClient;
//!
//! let mut client = UciClient::spawn("/usr/bin/stockfish")?;
//! client.init()?;
//! client.set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")?;
//! let best_move = client.go("movetime 100")?;
//! println!("Best move: {}", best_move);
//! # Ok::<(), match_engine::uci_client::UciError>(())
//! ```

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Errors that can occur when communicating with a UCI engine.
#[derive(Error, Debug)]
pub enum UciError {
    /// Failed to spawn the engine process or perform I/O with it.
    #[error("Failed to spawn process: {0}")]
    SpawnError(#[from] std::io::Error),
    /// The engine closed its output before answering.
    #[error("Engine closed its output")]
    Disconnected,
    /// The engine returned an unexpected response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A client for a UCI-compatible chess engine subprocess.
///
/// # Lifecycle
///
/// 1. Spawn the engine with [`UciClient::spawn`]
/// 2. Initialize the protocol with [`UciClient::init`]
/// 3. Set positions and request moves with [`UciClient::set_position`] and [`UciClient::go`]
/// 4. Clean up with [`UciClient::quit`] (or rely on [`Drop`])
pub struct UciClient {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// The engine's name as reported during initialization.
    pub name: String,
}

impl UciClient {
    /// Spawns a new engine process with piped stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns [`UciError::SpawnError`] if the executable cannot be started.
    pub fn spawn<P: AsRef<Path>>(path: P) -> Result<Self, UciError> {
        Self::spawn_with_args(path, &[])
    }

    /// Spawns an engine process with extra command-line arguments.
    pub fn spawn_with_args<P: AsRef<Path>>(path: P, args: &[String]) -> Result<Self, UciError> {
        let mut process = Command::new(path.as_ref())
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, BufReader::new(stdout)),
            _ => {
                let _ = process.kill();
                return Err(UciError::InvalidResponse(
                    "engine pipes unavailable".to_string(),
                ));
            }
        };

        Ok(Self {
            process,
            stdin,
            stdout,
            name: String::new(),
        })
    }

    /// Sends one command line to the engine.
    pub fn send(&mut self, cmd: &str) -> Result<(), UciError> {
        tracing::trace!(engine = %self.name, "> {}", cmd);
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads one trimmed line from the engine.
    ///
    /// # Errors
    ///
    /// Returns [`UciError::Disconnected`] on end of stream.
    pub fn read_line(&mut self) -> Result<String, UciError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(UciError::Disconnected);
        }
        let line = line.trim().to_string();
        tracing::trace!(engine = %self.name, "< {}", line);
        Ok(line)
    }

    /// Performs the `uci` / `isready` handshake and captures the engine name.
    pub fn init(&mut self) -> Result<(), UciError> {
        self.send("uci")?;
        loop {
            let line = self.read_line()?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.to_string();
            }
            if line == "uciok" {
                break;
            }
        }

        self.send("isready")?;
        while self.read_line()? != "readyok" {}

        Ok(())
    }

    /// Sets the position the next search starts from.
    pub fn set_position(&mut self, fen: &str) -> Result<(), UciError> {
        self.send(&format!("position fen {}", fen))
    }

    /// Starts a search and waits for `bestmove`.
    ///
    /// # Arguments
    ///
    /// * `time_control` - `go` parameters, e.g. `"movetime 1000"` or `"depth 10"`.
    pub fn go(&mut self, time_control: &str) -> Result<String, UciError> {
        self.send(&format!("go {}", time_control))?;

        loop {
            let line = self.read_line()?;
            if let Some(rest) = line.strip_prefix("bestmove") {
                return rest
                    .split_whitespace()
                    .next()
                    .map(str::to_string)
                    .ok_or_else(|| UciError::InvalidResponse(line.clone()));
            }
        }
    }

    /// Sends `quit` and waits for the process to exit.
    pub fn quit(&mut self) -> Result<(), UciError> {
        self.send("quit")?;
        let _ = self.process.wait();
        Ok(())
    }
}

impl Drop for UciClient {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.process.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uci_error_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let spawn_error = UciError::SpawnError(io_error);
        assert!(spawn_error.to_string().contains("Failed to spawn process"));

        assert_eq!(UciError::Disconnected.to_string(), "Engine closed its output");

        let invalid = UciError::InvalidResponse("bad data".to_string());
        assert_eq!(invalid.to_string(), "Invalid response: bad data");
    }

    #[test]
    fn test_spawn_nonexistent_executable_returns_error() {
        let result = UciClient::spawn("/nonexistent/path/to/engine");
        assert!(matches!(result, Err(UciError::SpawnError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scripted_engine_session() {
        // A shell loop standing in for an engine.
        let script = "while read cmd; do case \"$cmd\" in \
            uci) echo 'id name ScriptBot'; echo 'uciok';; \
            isready) echo 'readyok';; \
            go*) echo 'info depth 1'; echo 'bestmove e2e4 ponder e7e5';; \
            quit) exit 0;; \
            esac; done";

        let mut client =
            UciClient::spawn_with_args("sh", &["-c".to_string(), script.to_string()]).unwrap();
        client.init().unwrap();
        assert_eq!(client.name, "ScriptBot");
        client
            .set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        assert_eq!(client.go("movetime 10").unwrap(), "e2e4");
        client.quit().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_exit_is_disconnect() {
        let mut client =
            UciClient::spawn_with_args("sh", &["-c".to_string(), "exit 0".to_string()]).unwrap();
        assert!(client.init().is_err());
    }
}
