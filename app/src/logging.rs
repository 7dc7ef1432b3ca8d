//! Logging setup
//!
//! Logs go to stderr and to a size-rotated file in the data directory. Stdout
//! is reserved for the host bridge and never receives log output.

use std::path::{Path, PathBuf};

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{fmt, prelude::*};

pub const LOG_FILE_NAME: &str = "pricelens.log";

/// Rotate once the file reaches 5 MiB
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Rotated files kept next to the live one
const MAX_LOG_FILES: usize = 3;

/// Keeps the file writer alive. Dropping it flushes pending log lines.
pub struct LogHandle {
    path: PathBuf,
    _guard: Option<WorkerGuard>,
}

impl LogHandle {
    /// The file the "open log file" action should show
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn init_logging() -> LogHandle {
    let dir = log_dir();
    let path = dir.join(LOG_FILE_NAME);

    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    let stderr = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let appender = std::fs::create_dir_all(&dir).and_then(|()| {
        BasicRollingFileAppender::new(
            &path,
            RollingConditionBasic::new().max_size(MAX_LOG_SIZE),
            MAX_LOG_FILES,
        )
    });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
            LogHandle {
                path,
                _guard: Some(guard),
            }
        }
        Err(e) => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            tracing::warn!(path = %path.display(), error = %e, "Log file unavailable, logging to stderr only");
            LogHandle { path, _guard: None }
        }
    }
}

/// Directory holding the log files
pub fn log_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("pricelens").join("logs");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".pricelens").join("logs");
    }
    PathBuf::from("./pricelens_logs")
}
