use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::entry::{Entry, EntryAction, EntryId, Icon, NewEntry};
use crate::events::{AppEvent, EventSender, HostCommand, HostSender};

/// Result of a mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The entry changed and the host was told
    Applied,
    /// The entry already had the requested state
    Unchanged,
    /// No live entry with that id (never added, closed, or expired)
    Missing,
    /// The change would break an entry invariant and was refused
    Rejected,
}

struct AutoCloseTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owner of every live entry.
///
/// Creators hold only an [`EntryId`] and must expect the entry to be gone
/// after any await point; every mutator accepts stale ids and reports
/// [`MutationOutcome::Missing`].
///
/// Auto-close timers run as spawned tasks that post
/// [`AppEvent::AutoCloseElapsed`] back to the event queue. Each arm gets a new
/// generation, so an expiry that was already queued when the timer was re-armed
/// or the entry removed is recognized as stale and dropped.
pub struct EntryStore {
    entries: BTreeMap<EntryId, Entry>,
    timers: HashMap<EntryId, AutoCloseTimer>,
    next_id: u64,
    next_generation: u64,
    events: EventSender,
    host: HostSender,
}

impl EntryStore {
    pub fn new(events: EventSender, host: HostSender) -> Self {
        Self {
            entries: BTreeMap::new(),
            timers: HashMap::new(),
            next_id: 1,
            next_generation: 1,
            events,
            host,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Live entries in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an auto-close timer is currently armed for `id`
    pub fn has_timer(&self, id: EntryId) -> bool {
        self.timers.contains_key(&id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add(&mut self, new: NewEntry) -> EntryId {
        let id = EntryId::from_raw(self.next_id);
        self.next_id += 1;

        let auto_close = new.auto_close;
        let entry = new.into_entry(id);
        debug!(%id, title = %entry.title, "Entry added");
        self.entries.insert(id, entry);

        if let Some(after) = auto_close {
            self.arm_timer(id, after);
        }
        if let Some(entry) = self.entries.get(&id) {
            self.host.send(HostCommand::EntryAdded {
                entry: entry.clone(),
            });
        }
        id
    }

    /// Remove an entry on behalf of its creator. Cancels a pending auto-close.
    pub fn remove(&mut self, id: EntryId) -> MutationOutcome {
        if let Some(timer) = self.timers.remove(&id) {
            timer.handle.abort();
        }
        match self.entries.remove(&id) {
            Some(_) => {
                debug!(%id, "Entry removed");
                self.host.send(HostCommand::EntryRemoved { id });
                MutationOutcome::Applied
            }
            None => MutationOutcome::Missing,
        }
    }

    /// Remove an entry because the user clicked its close button.
    ///
    /// Entries that are not closeable yet stay put.
    pub fn request_close(&mut self, id: EntryId) -> MutationOutcome {
        match self.entries.get(&id) {
            None => MutationOutcome::Missing,
            Some(entry) if !entry.closeable => {
                debug!(%id, "Close requested for non-closeable entry");
                MutationOutcome::Rejected
            }
            Some(_) => self.remove(id),
        }
    }

    /// Handle a fired auto-close timer. Returns whether the entry was removed.
    pub fn on_auto_close_elapsed(&mut self, id: EntryId, generation: u64) -> bool {
        let current = self.timers.get(&id).map(|t| t.generation);
        if current != Some(generation) {
            debug!(%id, generation, "Ignoring stale auto-close");
            return false;
        }
        self.timers.remove(&id);
        self.remove(id) == MutationOutcome::Applied
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutators
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_title(&mut self, id: EntryId, title: impl Into<String>) -> MutationOutcome {
        let title = title.into();
        self.mutate(id, |entry| {
            if entry.title == title {
                return false;
            }
            entry.title = title;
            true
        })
    }

    pub fn set_text(&mut self, id: EntryId, text: impl Into<String>) -> MutationOutcome {
        let text = Some(text.into());
        self.mutate(id, |entry| {
            if entry.body == text {
                return false;
            }
            entry.body = text;
            true
        })
    }

    pub fn set_icon(&mut self, id: EntryId, icon: Icon) -> MutationOutcome {
        self.mutate(id, |entry| {
            if entry.icon == icon {
                return false;
            }
            entry.icon = icon;
            true
        })
    }

    /// Make an entry closeable. Closeable entries can't be made non-closeable.
    pub fn set_closeable(&mut self, id: EntryId, closeable: bool) -> MutationOutcome {
        match self.entries.get(&id) {
            None => return MutationOutcome::Missing,
            Some(entry) if entry.closeable && !closeable => {
                warn!(%id, "Refusing to make a closeable entry non-closeable");
                return MutationOutcome::Rejected;
            }
            Some(_) => {}
        }
        self.mutate(id, |entry| {
            if entry.closeable == closeable {
                return false;
            }
            entry.closeable = closeable;
            true
        })
    }

    /// Arm (or re-arm) the auto-close timer. A previous timer is replaced, not
    /// stacked.
    pub fn enable_auto_close(&mut self, id: EntryId, after: Duration) -> MutationOutcome {
        if !self.entries.contains_key(&id) {
            return MutationOutcome::Missing;
        }
        self.arm_timer(id, after);
        self.mutate(id, |entry| {
            entry.auto_close = Some(after);
            true
        })
    }

    pub fn attach_action(&mut self, id: EntryId, action: EntryAction) -> MutationOutcome {
        self.mutate(id, |entry| {
            if entry.actions.contains(&action) {
                return false;
            }
            entry.actions.push(action);
            true
        })
    }

    /// Apply `change` to a live entry; `change` returns whether anything changed
    fn mutate(&mut self, id: EntryId, change: impl FnOnce(&mut Entry) -> bool) -> MutationOutcome {
        let Some(entry) = self.entries.get_mut(&id) else {
            debug!(%id, "Mutation on missing entry ignored");
            return MutationOutcome::Missing;
        };
        if !change(entry) {
            return MutationOutcome::Unchanged;
        }
        self.host.send(HostCommand::EntryUpdated {
            entry: entry.clone(),
        });
        MutationOutcome::Applied
    }

    fn arm_timer(&mut self, id: EntryId, after: Duration) {
        if let Some(previous) = self.timers.remove(&id) {
            previous.handle.abort();
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        // Deadline is fixed now, not when the task first runs
        let deadline = Instant::now() + after;
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = events.send(AppEvent::AutoCloseElapsed { id, generation });
        });
        self.timers.insert(id, AutoCloseTimer { generation, handle });

        if let Some(entry) = self.entries.get_mut(&id) {
            entry.auto_close = Some(after);
        }
    }
}

impl Drop for EntryStore {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.handle.abort();
        }
    }
}
