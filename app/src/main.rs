//! pricelens - clipboard price check overlay backend
//!
//! Runs the app core on a single-threaded runtime and connects it to the host
//! process over stdin/stdout.
//!
//! Exit status is 1 when startup fails (missing templates) or the runtime
//! cannot be created.

mod bridge;
mod config;
mod logging;
mod ninja;
mod platform;
mod pricecheck;
mod templates;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use pricelens_core::{App, HostSender, PortError, Ports, StartupError};
use thiserror::Error;
use tracing::{error, info};

use crate::ninja::NinjaDatabase;
use crate::platform::{DesktopWatcher, PathProbe, SystemClipboard};
use crate::pricecheck::NameLookup;
use crate::templates::DirectoryTemplates;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to set up price database: {0}")]
    Prices(#[source] PortError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let log = logging::init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting pricelens");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %AppError::from(e), "Exiting");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(log.path().to_path_buf()));
    // Stdin is read on a blocking thread that never returns on its own
    runtime.shutdown_background();

    match result {
        Ok(()) => {
            info!("Exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(log_path: PathBuf) -> Result<(), AppError> {
    let config = config::load();

    let prices = Arc::new(NinjaDatabase::new(config::cache_dir()).map_err(AppError::Prices)?);
    prices.load_cached(&config.league);

    let ports = Ports {
        templates: Arc::new(DirectoryTemplates::new(templates::template_dir())),
        prices: prices.clone(),
        lookup: Arc::new(NameLookup::new(prices)),
        clipboard: Arc::new(SystemClipboard),
        packages: Arc::new(PathProbe),
        window: Arc::new(DesktopWatcher),
    };

    let (host, commands) = HostSender::channel();
    let writer = bridge::spawn_command_writer(commands, log_path);

    let app = App::new(config, ports, host);
    bridge::spawn_event_reader(app.event_sender());

    let result = app.run().await;

    // The app owned every command sender; let the writer flush what is left
    let _ = writer.await;
    result.map_err(AppError::from)
}
