//! Append-only log of every game in a match.
//!
//! A [`MatchRecord`] holds one [`GameRecord`] per game. Moves are appended in
//! order with a snapshot of the mover's clock, and each game is sealed with
//! its [`GameOutcome`]. Entries can be read but never changed or removed.
//!
//! [`MatchRecord::to_document`] produces the serializable form written to
//! disk; [`MatchRecord::from_document`] reads it back.

use crate::board::Move;
use crate::timer::TimerSnapshot;
use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::fmt;
use thiserror::Error;

/// Errors raised when the record is used out of order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// There is no unsealed game to write to.
    #[error("No game is open in the record")]
    NoOpenGame,
    /// A document entry is not a valid UCI move.
    #[error("Invalid move '{0}' in record document")]
    InvalidMove(String),
}

/// A player color as stored in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// Why a game was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    Checkmate,
    /// The opponent submitted an illegal move.
    IllegalMove,
    /// The opponent ran out of time.
    TimeForfeit,
    /// The opponent could not produce a move.
    Resignation,
}

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoveRule,
    FivefoldRepetition,
}

/// The final result of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GameOutcome {
    Decisive { winner: Side, reason: WinReason },
    Draw { reason: DrawReason },
}

impl GameOutcome {
    pub fn win(winner: Color, reason: WinReason) -> Self {
        GameOutcome::Decisive {
            winner: winner.into(),
            reason,
        }
    }

    /// Returns the winning color, or `None` for a draw.
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOutcome::Decisive { winner, .. } => Some((*winner).into()),
            GameOutcome::Draw { .. } => None,
        }
    }

    /// Returns true if the game ended by forfeiture rather than by the rules.
    pub fn is_forfeit(&self) -> bool {
        matches!(
            self,
            GameOutcome::Decisive {
                reason: WinReason::IllegalMove | WinReason::TimeForfeit | WinReason::Resignation,
                ..
            }
        )
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Decisive { winner, reason } => {
                let winner = match winner {
                    Side::White => "white",
                    Side::Black => "black",
                };
                let reason = match reason {
                    WinReason::Checkmate => "checkmate",
                    WinReason::IllegalMove => "illegal move",
                    WinReason::TimeForfeit => "time forfeit",
                    WinReason::Resignation => "resignation",
                };
                write!(f, "{} wins by {}", winner, reason)
            }
            GameOutcome::Draw { reason } => {
                let reason = match reason {
                    DrawReason::Stalemate => "stalemate",
                    DrawReason::InsufficientMaterial => "insufficient material",
                    DrawReason::SeventyFiveMoveRule => "seventy-five-move rule",
                    DrawReason::FivefoldRepetition => "fivefold repetition",
                };
                write!(f, "draw by {}", reason)
            }
        }
    }
}

/// One accepted move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntry {
    /// Half-move number within the game, starting at 1.
    pub ply: u32,
    pub mover: Color,
    pub mv: Move,
    /// The mover's clock right after the move.
    pub timer: TimerSnapshot,
}

/// All moves and the outcome of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    start_fen: String,
    white: String,
    black: String,
    moves: Vec<MoveEntry>,
    outcome: Option<GameOutcome>,
}

impl GameRecord {
    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn white(&self) -> &str {
        &self.white
    }

    pub fn black(&self) -> &str {
        &self.black
    }

    pub fn moves(&self) -> &[MoveEntry] {
        &self.moves
    }

    /// Returns the outcome once the game has been sealed.
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_sealed(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Write-once log of a whole match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
    games: Vec<GameRecord>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new game segment.
    ///
    /// Any previous game must already be sealed.
    pub fn begin_game(&mut self, start_fen: &str, white: &str, black: &str) {
        debug_assert!(self.current_game().is_none(), "previous game not sealed");
        self.games.push(GameRecord {
            start_fen: start_fen.to_string(),
            white: white.to_string(),
            black: black.to_string(),
            moves: Vec::new(),
            outcome: None,
        });
    }

    /// Appends one accepted move to the open game.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NoOpenGame`] if no game is open.
    pub fn append(
        &mut self,
        mover: Color,
        mv: &Move,
        timer: TimerSnapshot,
    ) -> Result<(), RecordError> {
        let game = self.open_game_mut()?;
        let ply = game.moves.len() as u32 + 1;
        game.moves.push(MoveEntry {
            ply,
            mover,
            mv: mv.clone(),
            timer,
        });
        Ok(())
    }

    /// Marks the open game as finished.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NoOpenGame`] if no game is open.
    pub fn seal(&mut self, outcome: GameOutcome) -> Result<(), RecordError> {
        self.open_game_mut()?.outcome = Some(outcome);
        Ok(())
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// Returns the game currently being played, if any.
    pub fn current_game(&self) -> Option<&GameRecord> {
        self.games.last().filter(|g| !g.is_sealed())
    }

    fn open_game_mut(&mut self) -> Result<&mut GameRecord, RecordError> {
        self.games
            .last_mut()
            .filter(|g| !g.is_sealed())
            .ok_or(RecordError::NoOpenGame)
    }

    /// Builds the serializable form of the record.
    pub fn to_document(&self) -> RecordDocument {
        RecordDocument {
            games: self
                .games
                .iter()
                .map(|game| GameDocument {
                    start_fen: game.start_fen.clone(),
                    white: game.white.clone(),
                    black: game.black.clone(),
                    moves: game
                        .moves
                        .iter()
                        .map(|entry| MoveDocument {
                            ply: entry.ply,
                            mover: entry.mover.into(),
                            uci: entry.mv.to_string(),
                            timer: entry.timer,
                        })
                        .collect(),
                    outcome: game.outcome,
                })
                .collect(),
        }
    }

    /// Rebuilds a record from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidMove`] if a move is not valid UCI text.
    pub fn from_document(doc: &RecordDocument) -> Result<Self, RecordError> {
        let games = doc
            .games
            .iter()
            .map(|game| {
                let moves = game
                    .moves
                    .iter()
                    .map(|m| {
                        let mv = m
                            .uci
                            .parse()
                            .map_err(|_| RecordError::InvalidMove(m.uci.clone()))?;
                        Ok(MoveEntry {
                            ply: m.ply,
                            mover: m.mover.into(),
                            mv,
                            timer: m.timer,
                        })
                    })
                    .collect::<Result<Vec<_>, RecordError>>()?;
                Ok(GameRecord {
                    start_fen: game.start_fen.clone(),
                    white: game.white.clone(),
                    black: game.black.clone(),
                    moves,
                    outcome: game.outcome,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;
        Ok(Self { games })
    }
}

/// Serializable form of a [`MatchRecord`].
///
/// ```json
/// {
///   "games": [
///     {
///       "start_fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
///       "white": "random",
///       "black": "human",
///       "moves": [
///         { "ply": 1, "mover": "white", "uci": "e2e4",
///           "timer": { "time_clocked": 0.4, "seconds_left": 601.6 } }
///       ],
///       "outcome": { "result": "decisive", "winner": "white", "reason": "illegal_move" }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub games: Vec<GameDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDocument {
    pub start_fen: String,
    pub white: String,
    pub black: String,
    pub moves: Vec<MoveDocument>,
    /// `null` while the game is still being played.
    pub outcome: Option<GameOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDocument {
    pub ply: u32,
    pub mover: Side,
    pub uci: String,
    pub timer: TimerSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn snap(clocked: f64) -> TimerSnapshot {
        TimerSnapshot {
            time_clocked: clocked,
            seconds_left: None,
        }
    }

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    fn sample_record() -> MatchRecord {
        let mut record = MatchRecord::new();
        record.begin_game(START, "random", "random");
        record.append(Color::White, &mv("e2e4"), snap(0.5)).unwrap();
        record.append(Color::Black, &mv("e7e5"), snap(0.25)).unwrap();
        record
            .seal(GameOutcome::win(Color::White, WinReason::IllegalMove))
            .unwrap();
        record.begin_game(START, "random", "random");
        record.append(Color::White, &mv("g1f3"), snap(1.0)).unwrap();
        record
            .seal(GameOutcome::Draw {
                reason: DrawReason::Stalemate,
            })
            .unwrap();
        record
    }

    #[test]
    fn test_append_numbers_plies() {
        let record = sample_record();
        let plies: Vec<u32> = record.games()[0].moves().iter().map(|m| m.ply).collect();
        assert_eq!(plies, vec![1, 2]);
        assert_eq!(record.games()[1].moves()[0].ply, 1);
    }

    #[test]
    fn test_append_without_game_fails() {
        let mut record = MatchRecord::new();
        assert_eq!(
            record.append(Color::White, &mv("e2e4"), snap(0.0)),
            Err(RecordError::NoOpenGame)
        );
    }

    #[test]
    fn test_sealed_game_rejects_writes() {
        let mut record = sample_record();
        assert_eq!(
            record.append(Color::White, &mv("e2e4"), snap(0.0)),
            Err(RecordError::NoOpenGame)
        );
        assert_eq!(
            record.seal(GameOutcome::win(Color::Black, WinReason::Checkmate)),
            Err(RecordError::NoOpenGame)
        );
        assert_eq!(
            record.games()[1].outcome(),
            Some(&GameOutcome::Draw {
                reason: DrawReason::Stalemate
            })
        );
    }

    #[test]
    fn test_current_game() {
        let mut record = MatchRecord::new();
        assert!(record.current_game().is_none());
        record.begin_game(START, "a", "b");
        assert_eq!(record.current_game().map(|g| g.white()), Some("a"));
        record
            .seal(GameOutcome::win(Color::Black, WinReason::TimeForfeit))
            .unwrap();
        assert!(record.current_game().is_none());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(
            GameOutcome::win(Color::White, WinReason::IllegalMove).to_string(),
            "white wins by illegal move"
        );
        assert_eq!(
            GameOutcome::Draw {
                reason: DrawReason::InsufficientMaterial
            }
            .to_string(),
            "draw by insufficient material"
        );
    }

    #[test]
    fn test_outcome_forfeit_and_winner() {
        let forfeit = GameOutcome::win(Color::Black, WinReason::TimeForfeit);
        assert!(forfeit.is_forfeit());
        assert_eq!(forfeit.winner(), Some(Color::Black));
        assert!(!GameOutcome::win(Color::White, WinReason::Checkmate).is_forfeit());
        assert_eq!(
            GameOutcome::Draw {
                reason: DrawReason::FivefoldRepetition
            }
            .winner(),
            None
        );
    }

    #[test]
    fn test_document_json_shape() {
        let json = serde_json::to_value(sample_record().to_document()).unwrap();
        let game = &json["games"][0];
        assert_eq!(game["start_fen"], START);
        assert_eq!(game["moves"][0]["uci"], "e2e4");
        assert_eq!(game["moves"][0]["mover"], "white");
        assert_eq!(game["moves"][1]["timer"]["time_clocked"], 0.25);
        assert!(game["moves"][1]["timer"]["seconds_left"].is_null());
        assert_eq!(game["outcome"]["result"], "decisive");
        assert_eq!(game["outcome"]["winner"], "white");
        assert_eq!(game["outcome"]["reason"], "illegal_move");
        assert_eq!(json["games"][1]["outcome"]["result"], "draw");
        assert_eq!(json["games"][1]["outcome"]["reason"], "stalemate");
    }

    #[test]
    fn test_document_roundtrip_through_json() {
        let record = sample_record();
        let text = serde_json::to_string(&record.to_document()).unwrap();
        let doc: RecordDocument = serde_json::from_str(&text).unwrap();
        let restored = MatchRecord::from_document(&doc).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_from_document_rejects_bad_move() {
        let mut doc = sample_record().to_document();
        doc.games[0].moves[0].uci = "zz99".to_string();
        assert_eq!(
            MatchRecord::from_document(&doc),
            Err(RecordError::InvalidMove("zz99".to_string()))
        );
    }

    proptest! {
        #[test]
        fn prop_append_preserves_order(count in 0usize..60) {
            let moves = ["g1f3", "g8f6", "f3g1", "f6g8"];
            let mut record = MatchRecord::new();
            record.begin_game(START, "w", "b");
            for i in 0..count {
                let color = if i % 2 == 0 { Color::White } else { Color::Black };
                record.append(color, &mv(moves[i % 4]), snap(i as f64)).unwrap();
            }
            let game = &record.games()[0];
            prop_assert_eq!(game.moves().len(), count);
            for (i, entry) in game.moves().iter().enumerate() {
                prop_assert_eq!(entry.ply as usize, i + 1);
                prop_assert_eq!(entry.mv.to_string(), moves[i % 4]);
            }
        }
    }
}
