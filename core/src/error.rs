//! Error types
//!
//! Only [`StartupError::Templates`] is fatal. Everything else is turned into a
//! notification entry or a log line by the component that receives it.

use thiserror::Error;

use crate::orchestrator::StartupPhase;

/// Failure reported by an external collaborator (price database, clipboard,
/// package probe, window watcher, template loader).
///
/// Carries text rather than the underlying error so it can travel through the
/// event queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("not supported on this system: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for PortError {
    fn from(e: std::io::Error) -> Self {
        PortError::Io(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("failed to load templates: {0}")]
    Templates(#[source] PortError),
    #[error("invalid startup transition from {from:?} to {to:?}")]
    InvalidTransition { from: StartupPhase, to: StartupPhase },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("empty key combination")]
    Empty,
    #[error("key combination `{0}` has no key")]
    MissingKey(String),
    #[error("key combination `{0}` has more than one key")]
    MultipleKeys(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("`{0}` is already bound")]
    AlreadyBound(String),
}
