//! Logging initialisation via tracing-subscriber.
//!
//! Stdout belongs to the interactive console, so events go to stderr or, when
//! `[app] log_file` is set, are appended to that file without colour codes.

use std::path::{Path, PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Where and how much to log, resolved from CLI flags and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directive, e.g. `"info"` or `"deep_research=debug"`.
    pub level: String,
    /// `true` when the level came from `-v` flags and must beat `RUST_LOG`.
    pub forced: bool,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    /// `-v` count wins over the configured level; with no flags `RUST_LOG`
    /// may still override the config at [`init`].
    pub fn resolve(verbosity: u8, configured: &str, file: Option<&Path>) -> Self {
        match verbosity_level(verbosity) {
            Some(level) => Self { level: level.to_string(), forced: true, file: file.map(Path::to_path_buf) },
            None => Self { level: configured.to_string(), forced: false, file: file.map(Path::to_path_buf) },
        }
    }
}

/// Level for a `-v` count. Each flag raises one tier:
/// `-v` warn, `-vv` info, `-vvv` debug (request flow, cached steps),
/// `-vvvv` and beyond trace (full request bodies).
pub fn verbosity_level(count: u8) -> Option<&'static str> {
    match count {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(settings: &LogSettings) -> Result<(), AppError> {
    let filter = build_filter(&settings.level, settings.forced)?;

    let (writer, ansi) = match &settings.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path).map_err(|e| {
                AppError::Logger(format!("failed to open log file '{}': {e}", path.display()))
            })?;
            (BoxMakeWriter::new(file), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn build_filter(level: &str, forced: bool) -> Result<EnvFilter, AppError> {
    if forced {
        return EnvFilter::try_new(level)
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")));
    }
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    parse_level(level)?;
    EnvFilter::try_new(level).map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
}

/// Parse a plain level name (`error` … `trace`, or `off`).
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
