//! Board adapter over the `shakmaty` rules library.
//!
//! The match engine never implements chess rules itself. [`Board`] wraps a
//! [`shakmaty::Chess`] position and exposes only what the match loop needs:
//! legality checks, move application, side to move and terminal status.
//! It additionally keeps a repetition history, which the position type alone
//! does not track.

use shakmaty::fen::{Epd, Fen};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Position, Rank, Square};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A move in UCI text notation (`e2e4`, `e7e8q`, `0000` for the null move).
///
/// Moves are position-independent; whether one is legal is decided by the
/// [`Board`] it is played on.
pub type Move = UciMove;

/// Halfmoves without a capture or pawn move that end the game automatically.
pub const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

/// Occurrences of the same position that end the game automatically.
pub const FIVEFOLD_REPETITION: u32 = 5;

/// Errors raised while setting up or updating a board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The starting position text is not valid FEN.
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    /// The FEN parses but describes an impossible position.
    #[error("Invalid position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },
    /// The move is not legal in the current position.
    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

/// Why a piece of move text could not be turned into a playable move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// The text is not UCI notation at all.
    #[error("Malformed move text: {0}")]
    Malformed(String),
    /// The text is well formed but the move is not legal here.
    #[error("Illegal move: {0}")]
    Illegal(String),
}

/// Where each game of a match starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StartPosition {
    /// The standard chess starting position.
    #[default]
    Standard,
    /// A custom position in FEN notation.
    Fen(String),
}

impl StartPosition {
    /// Builds a start position from an optional FEN string.
    pub fn from_fen(fen: Option<String>) -> Self {
        fen.map_or(StartPosition::Standard, StartPosition::Fen)
    }
}

/// Reasons a position ends the game without any player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The side to move is checkmated.
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    /// 75 moves by each side without a capture or pawn move.
    SeventyFiveMoveRule,
    /// The same position occurred five times.
    FivefoldRepetition,
}

/// A chess position plus the history needed for repetition detection.
#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    repetitions: HashMap<String, u32>,
}

impl Board {
    /// Creates a board at the given starting position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidFen`] if the FEN cannot be parsed and
    /// [`BoardError::InvalidPosition`] if it describes an illegal setup.
    pub fn new(start: &StartPosition) -> Result<Self, BoardError> {
        let position = match start {
            StartPosition::Standard => Chess::default(),
            StartPosition::Fen(text) => {
                let fen: Fen = text.trim().parse().map_err(|e: shakmaty::fen::ParseFenError| {
                    BoardError::InvalidFen {
                        fen: text.clone(),
                        reason: e.to_string(),
                    }
                })?;
                fen.into_position(CastlingMode::Standard)
                    .map_err(|e| BoardError::InvalidPosition {
                        fen: text.clone(),
                        reason: e.to_string(),
                    })?
            }
        };
        Ok(Self::from_position(position))
    }

    /// Wraps an existing `shakmaty` position with a fresh history.
    pub fn from_position(position: Chess) -> Self {
        let mut board = Self {
            position,
            repetitions: HashMap::new(),
        };
        board.remember_position();
        board
    }

    /// Returns the underlying position for read-only inspection.
    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    /// Returns the current position in FEN notation.
    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Returns every legal move in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard))
            .collect()
    }

    /// Returns true if `mv` can be played in the current position.
    ///
    /// The null move is never legal.
    pub fn is_legal(&self, mv: &Move) -> bool {
        !matches!(mv, UciMove::Null) && mv.to_move(&self.position).is_ok()
    }

    /// Parses UCI move text, separating malformed input from illegal moves.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let text = text.trim();
        let mv: Move = text
            .parse()
            .map_err(|_| MoveParseError::Malformed(text.to_string()))?;
        if self.is_legal(&mv) {
            Ok(mv)
        } else {
            Err(MoveParseError::Illegal(text.to_string()))
        }
    }

    /// Plays a move on the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::IllegalMove`] and leaves the board untouched if
    /// the move is not legal.
    pub fn play(&mut self, mv: &Move) -> Result<(), BoardError> {
        if matches!(mv, UciMove::Null) {
            return Err(BoardError::IllegalMove(mv.to_string()));
        }
        let legal = mv
            .to_move(&self.position)
            .map_err(|_| BoardError::IllegalMove(mv.to_string()))?;
        self.position.play_unchecked(&legal);
        self.remember_position();
        Ok(())
    }

    /// Returns how the game ends in the current position, if it does.
    pub fn status(&self) -> Option<Termination> {
        if self.position.is_checkmate() {
            return Some(Termination::Checkmate {
                winner: self.position.turn().other(),
            });
        }
        if self.position.is_stalemate() {
            return Some(Termination::Stalemate);
        }
        if self.position.is_insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if self.position.halfmoves() >= SEVENTY_FIVE_MOVE_HALFMOVES {
            return Some(Termination::SeventyFiveMoveRule);
        }
        if self.repetition_count() >= FIVEFOLD_REPETITION {
            return Some(Termination::FivefoldRepetition);
        }
        None
    }

    /// Returns how many times the current position has occurred.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.repetition_key())
            .copied()
            .unwrap_or(0)
    }

    fn repetition_key(&self) -> String {
        Epd::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn remember_position(&mut self) {
        *self.repetitions.entry(self.repetition_key()).or_insert(0) += 1;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::from_position(Chess::default())
    }
}

impl PartialEq for Board {
    /// Boards compare by position only, not by how they got there.
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl fmt::Display for Board {
    /// Renders an ASCII diagram with rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pieces = self.position.board();
        for rank in (0..8u32).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u32 {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                let c = pieces.piece_at(square).map_or('.', |p| p.char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

/// Returns "White" or "Black".
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
