//! Chess Match - plays two players against each other until one of them
//! reaches the required number of wins.

mod config;
mod display;
mod record_file;

use anyhow::Context;
use clap::Parser;
use config::{ConfigFileError, MatchConfig, PresetConfig};
use match_engine::board::{color_name, StartPosition};
use match_engine::registry::{self, ConfigError, DisplayMode, StrategyContext, TimerSettings};
use match_engine::{Match, MatchError, MatchSettings, MatchSummary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIMER: &str = "basic";
const DEFAULT_START_SECONDS: f64 = 600.0;
const DEFAULT_INCREMENT_SECONDS: f64 = 2.0;
const DEFAULT_WINS_REQUIRED: u32 = 1;

const EXIT_UNKNOWN_STRATEGY: u8 = 1;
const EXIT_UNKNOWN_TIMER: u8 = 2;
const EXIT_UNKNOWN_DISPLAY_MODE: u8 = 3;
const EXIT_IO: u8 = 4;
const EXIT_INVALID_CONFIG: u8 = 5;
const EXIT_MATCH_FAILURE: u8 = 6;

#[derive(Parser, Debug)]
#[command(name = "chess-match")]
#[command(about = "Play a chess match between two players")]
struct Cli {
    /// Player for white: human, random, or an engine from the config file
    white: String,
    /// Player for black
    black: String,
    /// How the match is shown: console or headless
    #[arg(long, default_value = "console")]
    display_mode: String,
    /// Clock kind: basic (untimed) or increment [default: basic]
    #[arg(long)]
    timer: Option<String>,
    /// Starting time per side in seconds [default: 600]
    #[arg(long)]
    start_seconds: Option<f64>,
    /// Seconds added after each move [default: 2]
    #[arg(long)]
    increment_seconds: Option<f64>,
    /// Games a side must win to take the match [default: 1]
    #[arg(long)]
    wins_required: Option<u32>,
    /// Write the match record to this JSON file
    #[arg(long)]
    record_file: Option<PathBuf>,
    /// FEN every game starts from
    #[arg(long)]
    initial_board_state: Option<String>,
    /// Seed for random players
    #[arg(long)]
    seed: Option<u64>,
    /// Preset from the config file
    #[arg(long)]
    preset: Option<String>,
    /// Config file [default: match.toml]
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Match settings after merging flags, preset and defaults.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    timer: String,
    start_seconds: f64,
    increment_seconds: f64,
    wins_required: u32,
    initial_board_state: Option<String>,
}

impl Resolved {
    /// Flags win over the preset, the preset wins over built-in defaults.
    fn new(cli: &Cli, preset: Option<&PresetConfig>) -> Self {
        let preset = preset.cloned().unwrap_or_default();
        Self {
            timer: cli
                .timer
                .clone()
                .or(preset.timer)
                .unwrap_or_else(|| DEFAULT_TIMER.to_string()),
            start_seconds: cli
                .start_seconds
                .or(preset.start_seconds)
                .unwrap_or(DEFAULT_START_SECONDS),
            increment_seconds: cli
                .increment_seconds
                .or(preset.increment_seconds)
                .unwrap_or(DEFAULT_INCREMENT_SECONDS),
            wins_required: cli
                .wins_required
                .or(preset.wins_required)
                .unwrap_or(DEFAULT_WINS_REQUIRED),
            initial_board_state: cli
                .initial_board_state
                .clone()
                .or(preset.initial_board_state),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<MatchSummary> {
    let config = MatchConfig::load(cli.config.as_deref())?;
    let preset = match &cli.preset {
        Some(name) => {
            tracing::info!("Using preset: {}", name);
            Some(config.preset(name)?)
        }
        None => None,
    };
    let settings = Resolved::new(cli, preset);

    // Distinct streams per side so a seeded self-play match is not symmetric.
    let white_ctx = StrategyContext {
        seed: cli.seed,
        engines: Some(&config.engines),
    };
    let black_ctx = StrategyContext {
        seed: cli.seed.map(|seed| seed.wrapping_add(1)),
        engines: Some(&config.engines),
    };

    // Reported in this order: players, clock, display.
    registry::validate_strategy(&cli.white, &white_ctx)?;
    registry::validate_strategy(&cli.black, &black_ctx)?;
    let budget = TimerSettings::from_secs_f64(settings.start_seconds, settings.increment_seconds)?;
    let white_timer = registry::create_timer(&settings.timer, &budget)?;
    let black_timer = registry::create_timer(&settings.timer, &budget)?;
    let display_mode: DisplayMode = cli.display_mode.parse()?;

    let white = registry::create_strategy(&cli.white, &white_ctx)?;
    let black = registry::create_strategy(&cli.black, &black_ctx)?;

    let mut game = Match::new(
        white,
        black,
        white_timer,
        black_timer,
        MatchSettings {
            wins_required: settings.wins_required,
            start: StartPosition::from_fen(settings.initial_board_state.clone()),
        },
    )?;
    game.add_observer(display::presenter(display_mode));

    let match_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        id = %match_id,
        timer = %settings.timer,
        wins_required = settings.wins_required,
        "Starting match: {} vs {}",
        cli.white,
        cli.black
    );
    let summary = game.play_match()?;

    let loser = summary.winner.other();
    println!(
        "{} wins the match ({}-{}, {} draws)",
        color_name(summary.winner),
        summary.tally.wins(summary.winner),
        summary.tally.wins(loser),
        summary.tally.draws
    );

    if let Some(path) = &cli.record_file {
        record_file::write_record(path, &match_id, &summary, &game.record().to_document())
            .with_context(|| format!("Failed to write record file {}", path.display()))?;
    }
    Ok(summary)
}

/// Maps a failure to the process exit status for its category.
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return match e {
                ConfigError::UnknownStrategy(_) => EXIT_UNKNOWN_STRATEGY,
                ConfigError::UnknownTimer(_) => EXIT_UNKNOWN_TIMER,
                ConfigError::UnknownDisplayMode(_) => EXIT_UNKNOWN_DISPLAY_MODE,
                ConfigError::InvalidTime(_) => EXIT_INVALID_CONFIG,
                ConfigError::Engine { .. } => EXIT_MATCH_FAILURE,
            };
        }
        if let Some(e) = cause.downcast_ref::<ConfigFileError>() {
            return match e {
                ConfigFileError::Read { .. } => EXIT_IO,
                ConfigFileError::Parse(_) | ConfigFileError::UnknownPreset(_) => {
                    EXIT_INVALID_CONFIG
                }
            };
        }
        if let Some(e) = cause.downcast_ref::<MatchError>() {
            return match e {
                MatchError::InvalidWinsRequired
                | MatchError::DrawnStartPosition(_)
                | MatchError::Board(_) => EXIT_INVALID_CONFIG,
                _ => EXIT_MATCH_FAILURE,
            };
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return EXIT_IO;
        }
    }
    EXIT_MATCH_FAILURE
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
