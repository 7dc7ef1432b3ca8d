//! Persisted application configuration
//!
//! Every field has a serde default so that config files written by older
//! versions keep loading after new settings are added.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level settings, stored as TOML in the user's config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Master switch for the clipboard price check
    pub pricecheck: bool,
    /// League whose prices are fetched from poe.ninja
    pub league: String,
    /// Hide the overlay whenever the game window loses focus
    pub auto_minimize: bool,
    pub hotkeys: HotkeySettings,
    pub price_check: PriceCheckSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricecheck: true,
            league: "Standard".to_string(),
            auto_minimize: true,
            hotkeys: HotkeySettings::default(),
            price_check: PriceCheckSettings::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hotkeys
// ─────────────────────────────────────────────────────────────────────────────

/// Global key combinations, written as `Modifier+Key` (e.g. `Ctrl+C`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeySettings {
    pub price_check: String,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self {
            price_check: "Ctrl+C".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Price Check
// ─────────────────────────────────────────────────────────────────────────────

/// How price check results are presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceCheckSettings {
    /// Seconds before a result entry closes itself; `None` keeps it open
    pub auto_close_secs: Option<u64>,
    /// Swap `.` and `,` in displayed numbers
    pub european_numbers: bool,
    /// Items valued below this many chaos orbs are not reported
    pub min_chaos_value: f64,
}

impl Default for PriceCheckSettings {
    fn default() -> Self {
        Self {
            auto_close_secs: Some(20),
            european_numbers: false,
            min_chaos_value: 0.0,
        }
    }
}
