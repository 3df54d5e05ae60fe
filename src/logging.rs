//! Tracing setup for the server and the push/pull commands.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{FiledropError, Result};

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG` directives, with `level` as the floor.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(parse_level(level).into())
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::options().create(true).append(true).open(path)?)
}

/// Install the server subscriber.
///
/// Events go to stdout and, unless `config.file` is empty, are appended to
/// the log file without ANSI colors.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let log_file = match config.file.trim() {
        "" => None,
        path => Some(Arc::new(open_log_file(Path::new(path))?)),
    };

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(level_filter(&config.level))
        .with(fmt::layer().with_writer(std::io::stdout).with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| FiledropError::Config(format!("cannot install logger: {e}")))
}

/// Install a stderr-only subscriber.
///
/// Used by `push`/`pull` and when the log file cannot be opened. A no-op if
/// a subscriber is already installed.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(level_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
