//! Session lifecycle.
//!
//! ```text
//! Init -> ChannelsEstablished -> CatalogReceived
//!      -> { MetadataReceived -> Decoded -> Acknowledged }* -> Closed
//! ```
//!
//! `Aborted` is reachable from every non-terminal state. After a metadata
//! message fails to decode the driver may go straight back to waiting for the
//! next one, so `MetadataReceived -> MetadataReceived` and
//! `MetadataReceived -> Closed` are legal as well.

use serde::Serialize;

use crate::common::{SessionError, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Init,
    ChannelsEstablished,
    CatalogReceived,
    MetadataReceived,
    Decoded,
    Acknowledged,
    Closed,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Aborted)
    }
}

#[derive(Debug)]
pub struct SessionStateMachine {
    state: SessionState,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Init,
        }
    }

    /// A machine for a session whose channels are already up.
    pub fn established() -> Self {
        Self {
            state: SessionState::ChannelsEstablished,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: SessionState) -> SessionResult<()> {
        use SessionState::*;

        let allowed = match (self.state, next) {
            (from, Aborted) => !from.is_terminal(),
            (Init, ChannelsEstablished)
            | (ChannelsEstablished, CatalogReceived)
            | (CatalogReceived, MetadataReceived)
            | (CatalogReceived, Closed)
            | (MetadataReceived, Decoded)
            | (MetadataReceived, MetadataReceived)
            | (MetadataReceived, Closed)
            | (Decoded, Acknowledged)
            | (Acknowledged, MetadataReceived)
            | (Acknowledged, Closed) => true,
            _ => false,
        };

        if !allowed {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Best-effort abort; a no-op once terminal.
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::Aborted;
        }
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
