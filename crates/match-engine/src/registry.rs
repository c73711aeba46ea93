//! Named players, clocks and display modes.
//!
//! The command line refers to everything by name. This module maps those
//! names to constructors through fixed tables, so the set of built-ins is
//! known at compile time and an unknown name becomes a specific
//! [`ConfigError`] rather than a failed lookup.

use crate::move_source::{HumanPlayer, MoveSource, RandomMover, UciEngine};
use crate::timer::Timer;
use crate::uci_client::UciError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Setup errors, raised before any game is played.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown AI '{0}'. Available: {}", available_strategies().join(", "))]
    UnknownStrategy(String),
    #[error("Unknown timer '{0}'. Available: {}", available_timers().join(", "))]
    UnknownTimer(String),
    #[error("Unknown display mode '{0}'. Available: {}", available_display_modes().join(", "))]
    UnknownDisplayMode(String),
    /// A time setting is negative or not a number.
    #[error("Invalid time setting: {0} seconds")]
    InvalidTime(f64),
    /// A configured engine could not be started.
    #[error("Failed to start engine '{name}': {source}")]
    Engine {
        name: String,
        #[source]
        source: UciError,
    },
}

/// An external UCI engine declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSpec {
    /// Path to the engine executable.
    pub path: PathBuf,
    /// Extra command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Fixed `go` parameters (e.g. "movetime 500"); derived from the clock when absent.
    #[serde(default)]
    pub time_control: Option<String>,
}

/// Inputs available to player constructors.
#[derive(Debug, Clone, Default)]
pub struct StrategyContext<'a> {
    /// Seed for randomized players; entropy when `None`.
    pub seed: Option<u64>,
    /// Engines from the configuration file, by name.
    pub engines: Option<&'a HashMap<String, EngineSpec>>,
}

type StrategyFactory = fn(&StrategyContext<'_>) -> Box<dyn MoveSource>;

const STRATEGIES: &[(&str, StrategyFactory)] = &[("human", human), ("random", random)];

fn human(_ctx: &StrategyContext<'_>) -> Box<dyn MoveSource> {
    Box::new(HumanPlayer::stdio())
}

fn random(ctx: &StrategyContext<'_>) -> Box<dyn MoveSource> {
    match ctx.seed {
        Some(seed) => Box::new(RandomMover::seeded(seed)),
        None => Box::new(RandomMover::from_entropy()),
    }
}

/// Returns the built-in player names, sorted.
pub fn available_strategies() -> Vec<&'static str> {
    STRATEGIES.iter().map(|(name, _)| *name).collect()
}

/// Checks that `name` refers to a player without constructing it.
///
/// Engines are not spawned, so this is cheap to run before other setup.
pub fn validate_strategy(name: &str, ctx: &StrategyContext<'_>) -> Result<(), ConfigError> {
    let builtin = STRATEGIES.iter().any(|(key, _)| *key == name);
    let configured = ctx
        .engines
        .is_some_and(|engines| engines.contains_key(name));
    if builtin || configured {
        Ok(())
    } else {
        Err(ConfigError::UnknownStrategy(name.to_string()))
    }
}

/// Builds the player registered under `name`.
///
/// Built-in names take precedence over engines from the configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownStrategy`] if nothing is registered under
/// `name`, or [`ConfigError::Engine`] if a configured engine fails to start.
pub fn create_strategy(
    name: &str,
    ctx: &StrategyContext<'_>,
) -> Result<Box<dyn MoveSource>, ConfigError> {
    if let Some((_, factory)) = STRATEGIES.iter().find(|(key, _)| *key == name) {
        return Ok(factory(ctx));
    }

    let spec = ctx
        .engines
        .and_then(|engines| engines.get(name))
        .ok_or_else(|| ConfigError::UnknownStrategy(name.to_string()))?;
    let engine = UciEngine::spawn(&spec.path, &spec.args, spec.time_control.clone()).map_err(
        |source| ConfigError::Engine {
            name: name.to_string(),
            source,
        },
    )?;
    Ok(Box::new(engine))
}

/// Budget settings handed to clock constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub start: Duration,
    pub increment: Duration,
}

impl TimerSettings {
    /// Converts second counts, rejecting negative or non-finite values.
    pub fn from_secs_f64(start: f64, increment: f64) -> Result<Self, ConfigError> {
        let convert = |secs: f64| {
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTime(secs))
        };
        Ok(Self {
            start: convert(start)?,
            increment: convert(increment)?,
        })
    }
}

type TimerFactory = fn(&TimerSettings) -> Timer;

const TIMERS: &[(&str, TimerFactory)] = &[("basic", basic_timer), ("increment", increment_timer)];

/// Untimed: ignores the budget and only counts time used.
fn basic_timer(_settings: &TimerSettings) -> Timer {
    Timer::unbounded()
}

fn increment_timer(settings: &TimerSettings) -> Timer {
    Timer::with_increment(settings.start, settings.increment)
}

pub fn available_timers() -> Vec<&'static str> {
    TIMERS.iter().map(|(name, _)| *name).collect()
}

/// Builds a fresh clock of the kind registered under `name`.
pub fn create_timer(name: &str, settings: &TimerSettings) -> Result<Timer, ConfigError> {
    TIMERS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, factory)| factory(settings))
        .ok_or_else(|| ConfigError::UnknownTimer(name.to_string()))
}

/// How a match is presented while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Board diagram after every move.
    Console,
    /// Game results only.
    Headless,
}

const DISPLAY_MODES: &[(&str, DisplayMode)] = &[
    ("console", DisplayMode::Console),
    ("headless", DisplayMode::Headless),
];

pub fn available_display_modes() -> Vec<&'static str> {
    DISPLAY_MODES.iter().map(|(name, _)| *name).collect()
}

impl FromStr for DisplayMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DISPLAY_MODES
            .iter()
            .find(|(key, _)| *key == s)
            .map(|(_, mode)| *mode)
            .ok_or_else(|| ConfigError::UnknownDisplayMode(s.to_string()))
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = DISPLAY_MODES
            .iter()
            .find(|(_, mode)| mode == self)
            .map_or("unknown", |(name, _)| *name);
        write!(f, "{}", name)
    }
}
