pub mod auto_minimize;
pub mod entries;
pub mod error;
pub mod events;
pub mod focus;
pub mod hotkeys;
pub mod orchestrator;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use auto_minimize::{AutoMinimize, AutoMinimizeState};
pub use entries::{Entry, EntryAction, EntryId, EntryKind, EntryStore, Icon, MutationOutcome, NewEntry};
pub use error::{HotkeyError, PortError, StartupError};
pub use events::{AppEvent, EventSender, HostCommand, HostEvent, HostSender, UpdateInfo};
pub use focus::FocusTracker;
pub use hotkeys::{HotkeyAction, HotkeyId, HotkeyRegistry, KeyCombo, SETTLE_DELAY};
pub use orchestrator::{App, StartupPhase};
pub use ports::{
    Clipboard, PackageProbe, Ports, PriceDatabase, PriceLookup, PriceQuote, RefreshParams,
    RefreshSummary, TemplateLoader, TemplateSet, WindowWatcher,
};
pub use pricelens_types::AppConfig;
