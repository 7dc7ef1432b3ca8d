//! Notification entries
//!
//! Entries are the only way the app talks to the user: startup warnings,
//! price check results, refresh progress and update notices all end up here.
//!
//! # Module Structure
//!
//! - `entry` - The entry record, its id, icon and action types
//! - `store` - `EntryStore`, the owner of all live entries and their timers

mod entry;
mod store;


pub use entry::{Entry, EntryAction, EntryId, EntryKind, Icon, NewEntry};
pub use store::{EntryStore, MutationOutcome};
