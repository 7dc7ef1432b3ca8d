//! Collaborator contracts
//!
//! The app never talks to the OS, the network or the file system directly.
//! Each external concern sits behind one of these traits; the binary supplies
//! real implementations, tests supply fakes.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PortError;

// ─────────────────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────────────────

/// Entry and window templates available to the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    pub root: PathBuf,
    pub names: Vec<String>,
}

#[async_trait]
pub trait TemplateLoader: Send + Sync {
    /// Load every template. There is no partial success: either the whole set
    /// is usable or an error is returned.
    async fn load(&self) -> Result<TemplateSet, PortError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Price Database
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshParams {
    pub league: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshSummary {
    /// Number of priced items in the refreshed cache
    pub items: usize,
}

#[async_trait]
pub trait PriceDatabase: Send + Sync {
    /// Whether a refresh is currently running
    fn is_updating(&self) -> bool;

    /// Download fresh prices and replace the cache
    async fn refresh(&self, params: RefreshParams) -> Result<RefreshSummary, PortError>;
}

/// A priced item, as reported by [`PriceLookup`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub item_name: String,
    pub chaos_value: f64,
    /// Chaos per divine orb at the time of the lookup, when known
    #[serde(default)]
    pub divine_rate: Option<f64>,
    /// Number of listings the price is based on
    #[serde(default)]
    pub listings: Option<u32>,
}

pub trait PriceLookup: Send + Sync {
    /// Price the item described by `text`.
    ///
    /// Returns `Ok(None)` when the text is not item data or the item is
    /// unknown.
    fn process(&self, text: &str) -> Result<Option<PriceQuote>, PortError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// OS
// ─────────────────────────────────────────────────────────────────────────────

pub trait Clipboard: Send + Sync {
    fn read_text(&self) -> Result<String, PortError>;
}

#[async_trait]
pub trait PackageProbe: Send + Sync {
    async fn is_installed(&self, package: &str) -> Result<bool, PortError>;
}

#[async_trait]
pub trait WindowWatcher: Send + Sync {
    /// Prepare whatever the platform needs to observe game focus
    async fn initialize(&self) -> Result<(), PortError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Bundle
// ─────────────────────────────────────────────────────────────────────────────

/// All collaborators, handed to [`crate::App::new`] in one piece
#[derive(Clone)]
pub struct Ports {
    pub templates: Arc<dyn TemplateLoader>,
    pub prices: Arc<dyn PriceDatabase>,
    pub lookup: Arc<dyn PriceLookup>,
    pub clipboard: Arc<dyn Clipboard>,
    pub packages: Arc<dyn PackageProbe>,
    pub window: Arc<dyn WindowWatcher>,
}
