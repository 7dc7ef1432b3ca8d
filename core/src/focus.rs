//! Game focus tracking
//!
//! Holds whether the game window currently has input focus. Updated only from
//! `focus-changed` host signals; nothing polls.

use tracing::debug;

#[derive(Debug, Default)]
pub struct FocusTracker {
    focused: bool,
}

impl FocusTracker {
    pub fn new(initial: bool) -> Self {
        Self { focused: initial }
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Record a focus signal.
    ///
    /// Returns the new value when the state actually changed, `None` when the
    /// signal repeated the current state.
    pub fn on_focus_changed(&mut self, focused: bool) -> Option<bool> {
        if self.focused == focused {
            return None;
        }
        self.focused = focused;
        debug!(focused, "Game focus changed");
        Some(focused)
    }
}
