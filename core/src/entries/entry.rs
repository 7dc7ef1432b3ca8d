use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::PriceQuote;

/// Opaque entry handle. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// Semantic icon tag; the host decides how it looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    #[default]
    None,
    Info,
    Success,
    Warning,
    Error,
}

/// Button attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EntryAction {
    OpenLogFile,
    OpenUrl { url: String },
    InstallUpdate,
}

/// Which template the host should render the entry with
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EntryKind {
    #[default]
    Text,
    Price { quote: PriceQuote },
}

/// A live notification entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub title: String,
    pub body: Option<String>,
    pub icon: Icon,
    /// Only ever goes from `false` to `true`
    pub closeable: bool,
    /// Armed auto-close duration, if any
    pub auto_close: Option<Duration>,
    pub actions: Vec<EntryAction>,
}

/// Everything needed to create an entry; the store assigns the id.
///
/// Entries are closeable unless stated otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub kind: EntryKind,
    pub title: String,
    pub body: Option<String>,
    pub icon: Icon,
    pub closeable: bool,
    pub auto_close: Option<Duration>,
    pub actions: Vec<EntryAction>,
}

impl NewEntry {
    pub fn text(title: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Text,
            title: title.into(),
            body: None,
            icon: Icon::None,
            closeable: true,
            auto_close: None,
            actions: Vec::new(),
        }
    }

    pub fn price(quote: PriceQuote) -> Self {
        let title = quote.item_name.clone();
        Self {
            kind: EntryKind::Price { quote },
            icon: Icon::Info,
            ..Self::text(title)
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = icon;
        self
    }

    pub fn closeable(mut self, closeable: bool) -> Self {
        self.closeable = closeable;
        self
    }

    pub fn auto_close(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }

    pub fn action(mut self, action: EntryAction) -> Self {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        self
    }

    pub(crate) fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            kind: self.kind,
            title: self.title,
            body: self.body,
            icon: self.icon,
            closeable: self.closeable,
            // Set by the store when the timer is actually armed
            auto_close: None,
            actions: self.actions,
        }
    }
}
