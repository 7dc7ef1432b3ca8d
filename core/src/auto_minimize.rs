//! Overlay auto-minimize
//!
//! Hides the overlay while the game is in the background and shows it again
//! when the game regains focus. Platform setup is asynchronous and may fail;
//! until it has succeeded the coordinator ignores focus transitions, and after
//! a failure it stays inactive for the rest of the process.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::PortError;
use crate::events::{AppEvent, EventSender, HostCommand};
use crate::ports::WindowWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMinimizeState {
    /// Setup has not been requested yet
    Uninitialized,
    /// Setup is running
    Pending,
    /// Reacting to focus transitions
    Active,
    /// Setup failed or the feature is turned off
    Disabled,
}

#[derive(Debug)]
pub struct AutoMinimize {
    state: AutoMinimizeState,
}

impl Default for AutoMinimize {
    fn default() -> Self {
        Self {
            state: AutoMinimizeState::Uninitialized,
        }
    }
}

impl AutoMinimize {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AutoMinimizeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AutoMinimizeState::Active
    }

    /// Start platform setup in the background.
    ///
    /// The result comes back as [`AppEvent::AutoMinimizeReady`]. When the
    /// feature is turned off the coordinator goes straight to `Disabled`.
    pub fn spawn_initialize(
        &mut self,
        watcher: Arc<dyn WindowWatcher>,
        enabled: bool,
        events: &EventSender,
    ) {
        if self.state != AutoMinimizeState::Uninitialized {
            debug!(state = ?self.state, "Auto-minimize setup already requested");
            return;
        }
        if !enabled {
            info!("Auto-minimize disabled in settings");
            self.state = AutoMinimizeState::Disabled;
            return;
        }

        self.state = AutoMinimizeState::Pending;
        let events = events.clone();
        tokio::spawn(async move {
            let result = watcher.initialize().await;
            let _ = events.send(AppEvent::AutoMinimizeReady(result));
        });
    }

    /// Apply the setup result. Only a pending coordinator accepts it.
    ///
    /// On activation the overlay is synced to `focused`, since focus may have
    /// changed while setup was running.
    pub fn on_initialized(
        &mut self,
        result: Result<(), PortError>,
        focused: bool,
    ) -> Option<HostCommand> {
        if self.state != AutoMinimizeState::Pending {
            debug!(state = ?self.state, "Ignoring auto-minimize setup result");
            return None;
        }
        match result {
            Ok(()) => Some(self.start(focused)),
            Err(e) => {
                warn!(error = %e, "Auto-minimize setup failed, overlay will stay visible");
                self.state = AutoMinimizeState::Disabled;
                None
            }
        }
    }

    fn start(&mut self, focused: bool) -> HostCommand {
        info!(focused, "Auto-minimize active");
        self.state = AutoMinimizeState::Active;
        HostCommand::SetOverlayVisible { visible: focused }
    }

    /// Map a focus transition to a visibility command, if the coordinator is
    /// active.
    pub fn on_focus_transition(&self, focused: bool) -> Option<HostCommand> {
        if !self.is_active() {
            return None;
        }
        debug!(visible = focused, "Toggling overlay visibility");
        Some(HostCommand::SetOverlayVisible { visible: focused })
    }
}
