//! Tracing subscriber setup
//!
//! Console output goes to stderr so that report output on stdout stays
//! machine-readable. An optional daily-rolling file layer is added when a log
//! directory is configured and writable.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// File name prefix of the rolling log
pub const LOG_FILE_NAME: &str = "qtrade.log";

/// Build the filter: `RUST_LOG` wins, else the configured level
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Check that `dir` exists (creating it) and accepts new files.
///
/// `tracing_appender::rolling::daily` panics if it cannot create the initial
/// log file, so this has to pass before the appender is built.
pub fn preflight_log_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let test_path = dir.join(".qtrade_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)?;
    let _ = std::fs::remove_file(&test_path);
    Ok(())
}

/// Install the global subscriber.
///
/// The returned guard flushes the file appender on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = build_filter(&config.level);

    let mut guard = None;
    let mut file_warning = None;
    let file_layer = match config.dir.as_deref() {
        Some(dir) => match preflight_log_dir(Path::new(dir)) {
            Ok(()) => {
                // Daily rotating file appender
                let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
                let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
                guard = Some(file_guard);

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false) // No color codes in file
                        .with_target(true),
                )
            }
            Err(e) => {
                file_warning = Some(format!(
                    "could not write to log directory {dir} ({e}), file logging disabled"
                ));
                None
            }
        },
        None => None,
    };

    // Console layers, one of which is active
    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
    });
    let text_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some(warning) = file_warning {
        tracing::warn!("{warning}");
    }
    if installed && guard.is_some() {
        if let Some(dir) = &config.dir {
            tracing::info!(path = %Path::new(dir).join(LOG_FILE_NAME).display(), "logging to file");
        }
    }

    guard
}

/// Minimal logging for CLI commands that do no training
pub fn init_logging_simple() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
