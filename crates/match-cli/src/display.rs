//! Terminal presentation of a running match.

use match_engine::board::{color_name, Board};
use match_engine::observer::{MatchObserver, MoveEvent};
use match_engine::registry::DisplayMode;
use match_engine::{GameOutcome, MatchSummary, Tally, Timer};
use std::io::{self, Write};

/// Builds the observer for a display mode, writing to stdout.
pub fn presenter(mode: DisplayMode) -> Box<dyn MatchObserver> {
    match mode {
        DisplayMode::Console => Box::new(ConsolePresenter::new(io::stdout())),
        DisplayMode::Headless => Box::new(HeadlessPresenter::new(io::stdout())),
    }
}

fn score_line(tally: &Tally) -> String {
    format!(
        "White {} - {} Black, {} draws",
        tally.white_wins, tally.black_wins, tally.draws
    )
}

/// Time used, plus the remaining budget when there is one.
fn clock_line(timer: &Timer) -> String {
    match timer.seconds_left().as_secs_f64() {
        Some(left) => format!("{} ({:.1}s left)", timer.display_time(), left),
        None => timer.display_time(),
    }
}

fn report(result: io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Failed to write match display");
    }
}

/// Board diagram and both clocks after every move.
pub struct ConsolePresenter<W> {
    out: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MatchObserver for ConsolePresenter<W> {
    fn on_game_start(&mut self, game_index: usize, board: &Board) {
        report(writeln!(self.out, "\n=== Game {} ===\n{}", game_index + 1, board));
    }

    fn on_move(&mut self, event: &MoveEvent<'_>) {
        report(writeln!(
            self.out,
            "\n{} played {}\n{}\nWhite {} | Black {}",
            color_name(event.mover),
            event.mv,
            event.board,
            clock_line(event.white_timer),
            clock_line(event.black_timer),
        ));
    }

    fn on_game_over(&mut self, game_index: usize, outcome: &GameOutcome, tally: &Tally) {
        report(writeln!(
            self.out,
            "\nGame {}: {} ({})",
            game_index + 1,
            outcome,
            score_line(tally)
        ));
    }

    fn on_match_over(&mut self, _summary: &MatchSummary) {
        report(self.out.flush());
    }
}

/// One line per finished game.
pub struct HeadlessPresenter<W> {
    out: W,
}

impl<W: Write> HeadlessPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MatchObserver for HeadlessPresenter<W> {
    fn on_game_over(&mut self, game_index: usize, outcome: &GameOutcome, tally: &Tally) {
        report(writeln!(
            self.out,
            "Game {}: {} ({})",
            game_index + 1,
            outcome,
            score_line(tally)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_engine::record::WinReason;
    use match_engine::Color;
    use std::time::Duration;

    fn tally() -> Tally {
        Tally {
            white_wins: 1,
            black_wins: 0,
            draws: 2,
        }
    }

    #[test]
    fn test_console_shows_board_and_clocks() {
        let mut board = Board::default();
        let mv = board.parse_move("e2e4").unwrap();
        board.play(&mv).unwrap();
        let mut white = Timer::with_increment(Duration::from_secs(600), Duration::from_secs(2));
        white.record_move(Duration::from_secs(5));
        let black = Timer::with_increment(Duration::from_secs(600), Duration::from_secs(2));

        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.on_move(&MoveEvent {
            game_index: 0,
            board: &board,
            mover: Color::White,
            mv: &mv,
            white_timer: &white,
            black_timer: &black,
        });

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains("White played e2e4"));
        assert!(text.contains(&board.to_string()));
        assert!(text.contains("White 0:05 (597.0s left) | Black 0:00 (600.0s left)"));
    }

    #[test]
    fn test_console_game_header_and_result() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.on_game_start(1, &Board::default());
        presenter.on_game_over(
            1,
            &GameOutcome::win(Color::White, WinReason::Checkmate),
            &tally(),
        );

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains("=== Game 2 ==="));
        assert!(text.contains("Game 2: white wins by checkmate (White 1 - 0 Black, 2 draws)"));
    }

    #[test]
    fn test_headless_only_reports_results() {
        let mut board = Board::default();
        let mv = board.parse_move("g1f3").unwrap();
        board.play(&mv).unwrap();
        let timer = Timer::unbounded();

        let mut presenter = HeadlessPresenter::new(Vec::new());
        presenter.on_game_start(0, &board);
        presenter.on_move(&MoveEvent {
            game_index: 0,
            board: &board,
            mover: Color::White,
            mv: &mv,
            white_timer: &timer,
            black_timer: &timer,
        });
        presenter.on_game_over(
            0,
            &GameOutcome::win(Color::Black, WinReason::TimeForfeit),
            &tally(),
        );

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(
            text,
            "Game 1: black wins by time forfeit (White 1 - 0 Black, 2 draws)\n"
        );
    }
}
