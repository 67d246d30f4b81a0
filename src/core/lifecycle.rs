//! # Agent lifecycle state machine.
//!
//! ```text
//! Created ──► Wired ──► AuthorizingGateway ──► Running ──► Stopping ──► Stopped
//!                               │                                         ▲
//!                               └─────────── (unauthorized / stop) ───────┘
//! ```
//!
//! ## Rules
//! - Transitions never skip a state, except `AuthorizingGateway → Stopped`.
//! - Only `Agent::start` drives transitions, so there is a single writer.
//! - Every applied transition is published as `EventKind::StateChanged`.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::events::{Bus, Event};

/// Lifecycle state of an [`Agent`](crate::Agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Built, never started.
    Created,
    /// Handlers registered with every collaborator.
    Wired,
    /// Gateway launched; waiting on its authorization gate.
    AuthorizingGateway,
    /// Authorized; all enabled components launched.
    Running,
    /// Cancellation broadcast; waiting for components to unwind.
    Stopping,
    /// Every task joined. Terminal.
    Stopped,
}

impl AgentState {
    /// True if `self → next` is a legal transition.
    pub fn can_advance_to(self, next: AgentState) -> bool {
        use AgentState::*;
        matches!(
            (self, next),
            (Created, Wired)
                | (Wired, AuthorizingGateway)
                | (AuthorizingGateway, Running)
                | (AuthorizingGateway, Stopped)
                | (Running, Stopping)
                | (Stopping, Stopped)
        )
    }

    /// True for [`AgentState::Stopped`].
    pub fn is_terminal(self) -> bool {
        self == AgentState::Stopped
    }
}

/// Current state plus change notification.
pub(crate) struct Lifecycle {
    tx: watch::Sender<AgentState>,
    bus: Bus,
}

impl Lifecycle {
    pub fn new(bus: Bus) -> Self {
        let (tx, _rx) = watch::channel(AgentState::Created);
        Self { tx, bus }
    }

    pub fn current(&self) -> AgentState {
        *self.tx.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<AgentState> {
        self.tx.subscribe()
    }

    /// Applies `next` if legal from the current state; returns whether it was applied.
    pub fn advance(&self, next: AgentState) -> bool {
        let mut from = AgentState::Created;
        let applied = self.tx.send_if_modified(|state| {
            from = *state;
            if state.can_advance_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });

        if applied {
            debug!(?from, to = ?next, "agent state changed");
            self.bus.publish(Event::state_changed(next));
        } else {
            warn!(?from, to = ?next, "illegal agent state transition ignored");
        }
        applied
    }
}
