//! OS integration: clipboard, installed packages, focus observation

use async_trait::async_trait;
use pricelens_core::{Clipboard, PackageProbe, PortError, WindowWatcher};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// System clipboard. A fresh handle is opened per read so none is held while
/// the game writes to it.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn read_text(&self) -> Result<String, PortError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| PortError::Other(format!("clipboard: {e}")))?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Empty or non-text clipboard
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(PortError::Other(format!("clipboard: {e}"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Packages
// ─────────────────────────────────────────────────────────────────────────────

/// Treats a package as installed when its executable is on `PATH`
pub struct PathProbe;

#[async_trait]
impl PackageProbe for PathProbe {
    async fn is_installed(&self, package: &str) -> Result<bool, PortError> {
        let package = package.to_string();
        let found = tokio::task::spawn_blocking(move || which::which(&package))
            .await
            .map_err(|e| PortError::Other(e.to_string()))?;
        match found {
            Ok(path) => {
                debug!(path = %path.display(), "Found executable");
                Ok(true)
            }
            Err(which::Error::CannotFindBinaryPath) => Ok(false),
            Err(e) => Err(PortError::Other(e.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Focus
// ─────────────────────────────────────────────────────────────────────────────

/// Check if running on Wayland (Linux only)
#[cfg(target_os = "linux")]
fn is_wayland() -> bool {
    std::env::var("WAYLAND_DISPLAY").is_ok()
        || std::env::var("XDG_SESSION_TYPE")
            .map(|v| v == "wayland")
            .unwrap_or(false)
}

/// Checks that the host can report game focus on this desktop.
///
/// Wayland does not let clients observe other windows' focus, so auto-minimize
/// is unavailable there.
pub struct DesktopWatcher;

#[async_trait]
impl WindowWatcher for DesktopWatcher {
    async fn initialize(&self) -> Result<(), PortError> {
        #[cfg(target_os = "linux")]
        {
            if is_wayland() {
                return Err(PortError::Unsupported(
                    "window focus cannot be observed on Wayland".to_string(),
                ));
            }
            if std::env::var_os("DISPLAY").is_none() {
                return Err(PortError::Unsupported("no X11 display".to_string()));
            }
        }
        Ok(())
    }
}
