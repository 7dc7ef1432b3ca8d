use crate::error::StartupError;

/// Progress of [`crate::App::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    /// Waiting for templates
    Loading,
    /// Templates loaded, subsystems being brought up
    Initializing,
    Ready,
    /// Terminal. Only reachable from `Loading` or `Initializing`.
    Failed,
}

impl StartupPhase {
    pub fn can_advance_to(self, next: StartupPhase) -> bool {
        use StartupPhase::*;
        matches!(
            (self, next),
            (Loading, Initializing) | (Initializing, Ready) | (Loading, Failed) | (Initializing, Failed)
        )
    }

    /// Move forward to `next`, refusing anything but a forward step
    pub fn advance(&mut self, next: StartupPhase) -> Result<(), StartupError> {
        if !self.can_advance_to(next) {
            return Err(StartupError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}
