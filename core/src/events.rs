//! Event queue and host command stream
//!
//! Everything the app reacts to arrives as an [`AppEvent`] on one
//! single-consumer queue. Events either come from the host (the process that
//! owns the windows and the OS hooks) or from tasks the app spawned itself
//! (timers, refreshes, dependency checks). Everything the app asks of the host
//! leaves as a [`HostCommand`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::entries::{Entry, EntryAction, EntryId};
use crate::error::PortError;
use crate::hotkeys::{HotkeyAction, HotkeyId, KeyCombo};
use crate::ports::RefreshSummary;
use pricelens_types::AppConfig;

/// Producer side of the app event queue
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

// ─────────────────────────────────────────────────────────────────────────────
// Inbound
// ─────────────────────────────────────────────────────────────────────────────

/// Release information delivered by the external updater
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub version: String,
    /// Link to the release notes page
    #[serde(default)]
    pub release_notes: Option<String>,
}

/// Signals pushed by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    /// The game window gained or lost input focus
    FocusChanged { focused: bool },
    /// A registered global key combination was pressed
    KeyPressed { combo: KeyCombo },
    UpdateAvailable(UpdateInfo),
    UpdateDownloaded(UpdateInfo),
    /// The user clicked an entry's close button
    EntryClose { id: EntryId },
    /// The user clicked one of an entry's action buttons
    EntryAction { id: EntryId, action: EntryAction },
    /// The user clicked the "update prices" menu button
    RefreshRequested,
    /// Settings were edited and saved
    ConfigChanged { config: AppConfig },
    Shutdown,
}

/// Everything the event loop consumes
#[derive(Debug, Clone)]
pub enum AppEvent {
    Host(HostEvent),
    /// Settle delay after a hotkey trigger has passed
    SettleElapsed { action: HotkeyAction },
    /// An entry's auto-close timer fired
    AutoCloseElapsed { id: EntryId, generation: u64 },
    /// A price database refresh completed
    RefreshFinished {
        entry: EntryId,
        result: Result<RefreshSummary, PortError>,
    },
    /// A dependency probe completed
    DependencyChecked {
        package: String,
        result: Result<bool, PortError>,
    },
    /// Auto-minimize setup resolved
    AutoMinimizeReady(Result<(), PortError>),
}

impl From<HostEvent> for AppEvent {
    fn from(event: HostEvent) -> Self {
        AppEvent::Host(event)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outbound
// ─────────────────────────────────────────────────────────────────────────────

/// Commands sent to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostCommand {
    /// Create the overlay windows. `templates` names the loaded entry templates.
    InitializeGui {
        template_root: String,
        templates: Vec<String>,
    },
    SetOverlayVisible { visible: bool },
    /// Highlight (`enabled = false`) or restore a menu button
    ToggleIndicatorColor { id: String, enabled: bool },
    EntryAdded { entry: Entry },
    EntryUpdated { entry: Entry },
    EntryRemoved { id: EntryId },
    RegisterHotkey { id: HotkeyId, combo: KeyCombo },
    UnregisterHotkey { id: HotkeyId },
    /// Start delivering key events for registered hotkeys
    StartKeyHook,
    /// Blocking error dialog
    Alert { message: String },
    CloseAllWindows,
    OpenLogFile,
    OpenUrl { url: String },
    InstallUpdate,
}

/// Sending half of the host command stream.
///
/// A closed stream means the host went away; commands are dropped and the app
/// keeps running until it is told to shut down.
#[derive(Debug, Clone)]
pub struct HostSender {
    tx: mpsc::UnboundedSender<HostCommand>,
}

impl HostSender {
    /// Create a sender together with the receiver the host bridge drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, command: HostCommand) {
        if let Err(e) = self.tx.send(command) {
            debug!(command = ?e.0, "Host channel closed, dropping command");
        }
    }
}
