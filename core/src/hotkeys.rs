//! Global hotkey bindings and the clipboard price check they trigger
//!
//! Key combinations are written the way users type them in settings
//! (`Ctrl+C`, `CommandOrControl+Shift+D`, `Alt+F1`). The host owns the OS hook;
//! the app tells it which combinations to report and receives `key-pressed`
//! events back.
//!
//! A price check trigger does not read the clipboard right away: the game
//! writes the copied item text slightly after the key event is delivered, so
//! the read happens [`SETTLE_DELAY`] later. Overlapping triggers each get
//! their own delayed read.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{HotkeyError, PortError};
use crate::events::{AppEvent, EventSender};
use crate::focus::FocusTracker;
use crate::ports::{Clipboard, PriceLookup, PriceQuote};
use pricelens_types::AppConfig;

/// Wait between a price check trigger and the clipboard read
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

// ─────────────────────────────────────────────────────────────────────────────
// Key Combinations
// ─────────────────────────────────────────────────────────────────────────────

/// A modifier set plus exactly one key.
///
/// Parsing is case-insensitive and normalizes the key name, so `ctrl+c` and
/// `Control+C` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

/// Map a user-facing key name to its canonical spelling
fn normalize_key(key: &str) -> Option<String> {
    let upper = key.to_uppercase();

    // Letters and digits
    if upper.len() == 1 {
        let c = upper.chars().next()?;
        return c.is_ascii_alphanumeric().then(|| upper.clone());
    }

    // Function keys
    if let Some(n) = upper.strip_prefix('F')
        && let Ok(n) = n.parse::<u8>()
    {
        return (1..=24).contains(&n).then(|| format!("F{}", n));
    }

    let named = match upper.as_str() {
        "SPACE" => "Space",
        "ENTER" | "RETURN" => "Enter",
        "TAB" => "Tab",
        "ESC" | "ESCAPE" => "Escape",
        "BACKSPACE" => "Backspace",
        "INSERT" | "INS" => "Insert",
        "DELETE" | "DEL" => "Delete",
        "HOME" => "Home",
        "END" => "End",
        "PAGEUP" => "PageUp",
        "PAGEDOWN" => "PageDown",
        "UP" => "Up",
        "DOWN" => "Down",
        "LEFT" => "Left",
        "RIGHT" => "Right",
        _ => return None,
    };
    Some(named.to_string())
}

impl FromStr for KeyCombo {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut combo = KeyCombo {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: String::new(),
        };
        let mut key: Option<String> = None;

        for part in trimmed.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "" => return Err(HotkeyError::MissingKey(trimmed.to_string())),
                "commandorcontrol" | "control" | "ctrl" => combo.ctrl = true,
                "command" | "cmd" | "super" | "meta" | "logo" | "win" => combo.meta = true,
                "alt" | "option" => combo.alt = true,
                "shift" => combo.shift = true,
                _ => {
                    if key.is_some() {
                        return Err(HotkeyError::MultipleKeys(trimmed.to_string()));
                    }
                    let normalized = normalize_key(part)
                        .ok_or_else(|| HotkeyError::UnknownKey(part.to_string()))?;
                    key = Some(normalized);
                }
            }
        }

        combo.key = key.ok_or_else(|| HotkeyError::MissingKey(trimmed.to_string()))?;
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.meta {
            f.write_str("Meta+")?;
        }
        f.write_str(&self.key)
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = HotkeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bindings
// ─────────────────────────────────────────────────────────────────────────────

/// What a hotkey does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotkeyAction {
    PriceCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotkeyId(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub id: HotkeyId,
    pub combo: KeyCombo,
    pub action: HotkeyAction,
}

/// Registered key combinations and their actions
#[derive(Debug, Default)]
pub struct HotkeyRegistry {
    bindings: Vec<HotkeyBinding>,
    next_id: u32,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `combo` to `action`. A combination can only be bound once.
    pub fn register(
        &mut self,
        combo: KeyCombo,
        action: HotkeyAction,
    ) -> Result<HotkeyId, HotkeyError> {
        if self.find(&combo).is_some() {
            return Err(HotkeyError::AlreadyBound(combo.to_string()));
        }
        let id = HotkeyId(self.next_id);
        self.next_id += 1;
        self.bindings.push(HotkeyBinding { id, combo, action });
        Ok(id)
    }

    pub fn unregister(&mut self, id: HotkeyId) -> Option<HotkeyBinding> {
        let index = self.bindings.iter().position(|b| b.id == id)?;
        Some(self.bindings.remove(index))
    }

    pub fn find(&self, combo: &KeyCombo) -> Option<&HotkeyBinding> {
        self.bindings.iter().find(|b| &b.combo == combo)
    }

    /// The first binding for `action`, if any
    pub fn binding_for(&self, action: HotkeyAction) -> Option<&HotkeyBinding> {
        self.bindings.iter().find(|b| b.action == action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HotkeyBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trigger Handling
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a trigger for `action` may proceed right now
pub fn gate_open(action: HotkeyAction, config: &AppConfig, focus: &FocusTracker) -> bool {
    match action {
        HotkeyAction::PriceCheck => config.pricecheck && focus.focused(),
    }
}

/// Handle a pressed binding: check the gate and schedule the delayed read.
///
/// Returns whether a read was scheduled. A closed gate is silent.
pub fn trigger(
    action: HotkeyAction,
    config: &AppConfig,
    focus: &FocusTracker,
    events: &EventSender,
) -> bool {
    if !gate_open(action, config, focus) {
        trace!(?action, "Hotkey ignored, gate closed");
        return false;
    }

    let deadline = Instant::now() + SETTLE_DELAY;
    let events = events.clone();
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        let _ = events.send(AppEvent::SettleElapsed { action });
    });
    true
}

/// Result of one clipboard read + lookup
#[derive(Debug, Clone, PartialEq)]
pub enum PriceCheckOutcome {
    Priced(PriceQuote),
    /// The clipboard did not hold a known item
    NotAnItem,
    ClipboardFailed(PortError),
    LookupFailed(PortError),
}

/// Read the clipboard once and price its content
pub fn run_price_check(clipboard: &dyn Clipboard, lookup: &dyn PriceLookup) -> PriceCheckOutcome {
    let text = match clipboard.read_text() {
        Ok(text) => text,
        Err(e) => return PriceCheckOutcome::ClipboardFailed(e),
    };

    if text.trim().is_empty() {
        debug!("Clipboard empty after price check trigger");
        return PriceCheckOutcome::NotAnItem;
    }

    match lookup.process(&text) {
        Ok(Some(quote)) => PriceCheckOutcome::Priced(quote),
        Ok(None) => PriceCheckOutcome::NotAnItem,
        Err(e) => PriceCheckOutcome::LookupFailed(e),
    }
}
