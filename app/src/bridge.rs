//! Host bridge
//!
//! The host process (overlay windows, OS key hook, updater) talks to us over
//! JSON lines: one [`HostEvent`] per stdin line, one [`HostCommand`] per
//! stdout line. Commands that only need the desktop's default handler
//! (opening the log file or a URL) are served here instead of being forwarded.

use std::path::{Path, PathBuf};

use pricelens_core::{AppConfig, EventSender, HostCommand, HostEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config;

/// Parse one stdin line. Blank lines are skipped, malformed ones logged.
pub fn parse_event_line(line: &str) -> Option<HostEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, line, "Ignoring malformed host event");
            None
        }
    }
}

/// What to do with an outgoing command
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// Open this path or URL with the desktop's default handler
    Open(String),
    /// Write this line to the host
    Forward(String),
}

pub fn route_command(command: &HostCommand, log_path: &Path) -> Result<Route, serde_json::Error> {
    match command {
        HostCommand::OpenLogFile => Ok(Route::Open(log_path.display().to_string())),
        HostCommand::OpenUrl { url } => Ok(Route::Open(url.clone())),
        _ => serde_json::to_string(command).map(Route::Forward),
    }
}

/// Read host events from stdin until EOF, then ask the app to shut down.
///
/// Saved settings are persisted before the app sees them.
pub fn spawn_event_reader(events: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("Host closed stdin");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed reading from host");
                    break;
                }
            };
            let Some(event) = parse_event_line(&line) else {
                continue;
            };
            if let HostEvent::ConfigChanged { config } = &event {
                save_settings(config.clone()).await;
            }
            if events.send(event.into()).is_err() {
                debug!("App stopped, no longer reading host events");
                return;
            }
        }
        let _ = events.send(HostEvent::Shutdown.into());
    })
}

async fn save_settings(config: AppConfig) {
    run_save(move || config::save(&config)).await;
}

/// Run a settings write on the blocking pool; the event loop keeps running
/// while the file is written.
async fn run_save<F>(save: F)
where
    F: FnOnce() -> Result<(), confy::ConfyError> + Send + 'static,
{
    match tokio::task::spawn_blocking(save).await {
        Ok(Ok(())) => debug!("Settings saved"),
        Ok(Err(e)) => warn!(error = %e, "Failed to save settings"),
        Err(e) => error!(error = %e, "Settings save task failed"),
    }
}

/// Write commands to stdout until every sender is gone
pub fn spawn_command_writer(
    mut commands: mpsc::UnboundedReceiver<HostCommand>,
    log_path: PathBuf,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(command) = commands.recv().await {
            match route_command(&command, &log_path) {
                Ok(Route::Open(destination)) => {
                    debug!(destination = %destination, "Opening with default handler");
                    if let Err(e) = open::that(&destination) {
                        warn!(destination = %destination, error = %e, "Failed to open");
                    }
                }
                Ok(Route::Forward(mut line)) => {
                    line.push('\n');
                    let written = async {
                        stdout.write_all(line.as_bytes()).await?;
                        stdout.flush().await
                    };
                    if let Err(e) = written.await {
                        error!(error = %e, "Failed writing to host");
                        break;
                    }
                }
                Err(e) => error!(error = %e, ?command, "Failed to encode host command"),
            }
        }
        debug!("Command writer stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricelens_core::{EntryId, KeyCombo};

    #[test]
    fn test_parse_event_line() {
        assert_eq!(
            parse_event_line(r#"{"type":"focus-changed","focused":false}"#),
            Some(HostEvent::FocusChanged { focused: false })
        );
        assert_eq!(parse_event_line("   "), None);
        assert_eq!(parse_event_line("{broken"), None);
        assert_eq!(parse_event_line(r#"{"type":"no-such-event"}"#), None);
    }

    #[test]
    fn test_parse_config_changed_fills_defaults() {
        let event = parse_event_line(r#"{"type":"config-changed","config":{"league":"Settlers"}}"#)
            .expect("event");
        let HostEvent::ConfigChanged { config } = event else {
            panic!("unexpected event");
        };
        assert_eq!(config.league, "Settlers");
        assert!(config.pricecheck);
        assert_eq!(config.hotkeys.price_check, "Ctrl+C");
    }

    #[tokio::test]
    async fn test_settings_are_written_off_the_runtime_thread() {
        let caller = std::thread::current().id();
        let (tx, rx) = std::sync::mpsc::channel();
        run_save(move || {
            tx.send(std::thread::current().id()).unwrap();
            Ok(())
        })
        .await;
        assert_ne!(rx.recv().unwrap(), caller);
    }

    #[test]
    fn test_open_commands_are_handled_locally() {
        let log = Path::new("/var/log/pricelens.log");
        assert_eq!(
            route_command(&HostCommand::OpenLogFile, log).unwrap(),
            Route::Open("/var/log/pricelens.log".to_string())
        );
        assert_eq!(
            route_command(
                &HostCommand::OpenUrl {
                    url: "https://poe.ninja".to_string()
                },
                log
            )
            .unwrap(),
            Route::Open("https://poe.ninja".to_string())
        );
    }

    #[test]
    fn test_other_commands_are_forwarded_as_one_line() {
        let log = Path::new("pricelens.log");
        let combo: KeyCombo = "ctrl+c".parse().unwrap();
        let route = route_command(
            &HostCommand::RegisterHotkey {
                id: serde_json::from_str("0").unwrap(),
                combo,
            },
            log,
        )
        .unwrap();
        assert_eq!(
            route,
            Route::Forward(r#"{"type":"register-hotkey","id":0,"combo":"Ctrl+C"}"#.to_string())
        );

        let Route::Forward(line) =
            route_command(&HostCommand::EntryRemoved { id: EntryId::from_raw(7) }, log).unwrap()
        else {
            panic!("expected forward");
        };
        assert!(!line.contains('\n'));
        assert_eq!(line, r#"{"type":"entry-removed","id":7}"#);
    }
}
