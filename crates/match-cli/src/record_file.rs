//! JSON export of a finished match.
//!
//! The file wraps the engine's [`RecordDocument`] with an id, a creation
//! timestamp and the final score, so the `games` array can be loaded back
//! with [`match_engine::MatchRecord::from_document`].

use chrono::Utc;
use match_engine::record::Side;
use match_engine::{MatchSummary, RecordDocument};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Score {
    white_wins: u32,
    black_wins: u32,
    draws: u32,
}

#[derive(Serialize)]
struct RecordFile<'a> {
    /// Unique identifier for the match.
    id: &'a str,
    /// ISO 8601 timestamp when the file was created.
    created_at: String,
    winner: Side,
    score: Score,
    #[serde(flatten)]
    record: &'a RecordDocument,
}

/// Writes the record of a finished match to `path` as pretty-printed JSON.
///
/// ```json
/// {
///   "id": "0b6e…",
///   "created_at": "2026-01-15T12:00:00+00:00",
///   "winner": "white",
///   "score": { "white_wins": 2, "black_wins": 0, "draws": 1 },
///   "games": [ … ]
/// }
/// ```
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_record<P: AsRef<Path>>(
    path: P,
    id: &str,
    summary: &MatchSummary,
    record: &RecordDocument,
) -> std::io::Result<()> {
    let file = RecordFile {
        id,
        created_at: Utc::now().to_rfc3339(),
        winner: summary.winner.into(),
        score: Score {
            white_wins: summary.tally.white_wins,
            black_wins: summary.tally.black_wins,
            draws: summary.tally.draws,
        },
        record,
    };

    let out = std::fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(out, &file)?;
    tracing::info!(path = %path.as_ref().display(), "Match record written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_engine::game_runner::{Match, MatchSettings};
    use match_engine::move_source::RandomMover;
    use match_engine::{Color, MatchRecord, Timer};

    fn finished_match() -> (MatchSummary, MatchRecord) {
        let mut game = Match::new(
            Box::new(RandomMover::seeded(3)),
            Box::new(RandomMover::seeded(4)),
            Timer::unbounded(),
            Timer::unbounded(),
            MatchSettings::default(),
        )
        .unwrap();
        let summary = game.play_match().unwrap();
        (summary, game.into_record())
    }

    #[test]
    fn test_write_record_creates_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        let (summary, record) = finished_match();

        write_record(&path, "match-1", &summary, &record.to_document()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["id"], "match-1");
        assert!(value["created_at"].as_str().unwrap().contains('T'));
        let expected_winner = match summary.winner {
            Color::White => "white",
            Color::Black => "black",
        };
        assert_eq!(value["winner"], expected_winner);
        assert_eq!(value["score"]["draws"], summary.tally.draws);
        assert_eq!(
            value["games"].as_array().unwrap().len() as u32,
            summary.tally.games_played()
        );
    }

    #[test]
    fn test_written_games_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        let (summary, record) = finished_match();

        write_record(&path, "match-2", &summary, &record.to_document()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let doc: RecordDocument = serde_json::from_str(&content).unwrap();
        let restored = MatchRecord::from_document(&doc).unwrap();
        assert_eq!(restored.games().len(), record.games().len());
        assert_eq!(
            restored.games().last().unwrap().outcome(),
            record.games().last().unwrap().outcome()
        );
    }

    #[test]
    fn test_write_record_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/match.json");
        let (summary, record) = finished_match();
        assert!(write_record(&path, "x", &summary, &record.to_document()).is_err());
    }
}
