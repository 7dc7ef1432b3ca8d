//! Shared types for pricelens
//!
//! Configuration structs persisted by the app and read by the core, plus the
//! number formatting used when price results are shown to the user.

pub mod config;
pub mod formatting;

pub use config::{AppConfig, HotkeySettings, PriceCheckSettings};
