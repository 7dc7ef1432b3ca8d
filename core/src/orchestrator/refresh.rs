//! Price database refresh cycle
//!
//! One cycle = one "Updating" entry, one indicator toggle off/on pair, and one
//! `PriceDatabase::refresh` call. A request while a cycle is running (ours or
//! one the database reports) is dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::entries::{EntryAction, EntryId, EntryStore, Icon, NewEntry};
use crate::error::PortError;
use crate::events::{AppEvent, EventSender, HostCommand, HostSender};
use crate::ports::{PriceDatabase, RefreshParams, RefreshSummary};

/// Menu button highlighted while prices are being updated
pub const INDICATOR_ID: &str = "update";

pub const TITLE_UPDATING: &str = "Updating poe.ninja prices...";
pub const TITLE_SUCCESS: &str = "Updating poe.ninja was successful";
pub const TITLE_FAILED: &str = "Updating poe.ninja failed";
pub const BODY_FAILED: &str = "Please check the log file for more information.";

/// How long the success entry stays up
pub const SUCCESS_AUTO_CLOSE: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
pub struct RefreshCycle {
    /// Entry of the cycle currently running
    in_flight: Option<EntryId>,
}

impl RefreshCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Begin a cycle unless one is already running.
    ///
    /// Returns the "Updating" entry of the new cycle.
    pub fn start(
        &mut self,
        prices: &Arc<dyn PriceDatabase>,
        params: RefreshParams,
        entries: &mut EntryStore,
        host: &HostSender,
        events: &EventSender,
    ) -> Option<EntryId> {
        if self.in_flight.is_some() || prices.is_updating() {
            debug!("Price refresh already running, request ignored");
            return None;
        }

        host.send(HostCommand::ToggleIndicatorColor {
            id: INDICATOR_ID.to_string(),
            enabled: false,
        });
        let entry = entries.add(NewEntry::text(TITLE_UPDATING).closeable(false));
        self.in_flight = Some(entry);
        info!(league = %params.league, "Updating prices");

        let prices = Arc::clone(prices);
        let events = events.clone();
        tokio::spawn(async move {
            let result = prices.refresh(params).await;
            let _ = events.send(AppEvent::RefreshFinished { entry, result });
        });
        Some(entry)
    }

    /// Apply the outcome of a cycle to its entry and restore the indicator.
    ///
    /// The entry may be gone already; the mutations are then no-ops.
    pub fn finish(
        &mut self,
        entry: EntryId,
        result: Result<RefreshSummary, PortError>,
        entries: &mut EntryStore,
        host: &HostSender,
    ) {
        if self.in_flight != Some(entry) {
            debug!(%entry, "Refresh result for unknown cycle ignored");
            return;
        }
        self.in_flight = None;

        match result {
            Ok(summary) => {
                info!(items = summary.items, "Prices updated");
                entries.set_title(entry, TITLE_SUCCESS);
                entries.set_icon(entry, Icon::Success);
                entries.set_closeable(entry, true);
                entries.enable_auto_close(entry, SUCCESS_AUTO_CLOSE);
            }
            Err(e) => {
                warn!(error = %e, "Failed updating prices");
                entries.set_title(entry, TITLE_FAILED);
                entries.set_text(entry, BODY_FAILED);
                entries.set_closeable(entry, true);
                entries.set_icon(entry, Icon::Error);
                entries.attach_action(entry, EntryAction::OpenLogFile);
            }
        }

        host.send(HostCommand::ToggleIndicatorColor {
            id: INDICATOR_ID.to_string(),
            enabled: true,
        });
    }
}
