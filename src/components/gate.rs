//! # One-shot authorization gate.
//!
//! [`AuthorizationGate`] turns the gateway's handshake outcome into a single
//! awaitable resolution:
//!
//! ```text
//!   handshake logic ──► authorize() ──┐
//!   handshake logic ──► reject(..)  ──┼──► watch::Sender<GateState> ──► wait(timeout)
//!                                     │                                   │
//!                        (first call wins, later ignored)       Ok / Rejected / Timeout
//! ```
//!
//! ## Rules
//! - The gate resolves **once**: the first `authorize`/`reject` wins.
//! - `wait` does not poll; it sleeps on the watch channel until resolution or timeout.
//! - A waiter that arrives after resolution returns immediately.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::error::AuthorizationError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum GateState {
    Pending,
    Authorized,
    Rejected(String),
}

impl GateState {
    fn outcome(&self) -> Option<Result<(), AuthorizationError>> {
        match self {
            GateState::Pending => None,
            GateState::Authorized => Some(Ok(())),
            GateState::Rejected(reason) => Some(Err(AuthorizationError::Rejected {
                reason: reason.clone(),
            })),
        }
    }
}

/// Resolve-once authorization signal for gateway implementations.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use cluster_agent::AuthorizationGate;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = AuthorizationGate::new();
/// assert!(gate.authorize());
/// assert!(!gate.reject("too late"));
/// assert!(gate.wait(Duration::from_secs(1)).await.is_ok());
/// # }
/// ```
#[derive(Debug)]
pub struct AuthorizationGate {
    tx: watch::Sender<GateState>,
}

impl AuthorizationGate {
    /// Creates an unresolved gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GateState::Pending);
        Self { tx }
    }

    /// Opens the gate. Returns `false` if it was already resolved.
    pub fn authorize(&self) -> bool {
        self.resolve(GateState::Authorized)
    }

    /// Rejects the agent. Returns `false` if the gate was already resolved.
    pub fn reject(&self, reason: impl Into<String>) -> bool {
        self.resolve(GateState::Rejected(reason.into()))
    }

    /// True once the gate has been opened.
    pub fn is_authorized(&self) -> bool {
        *self.tx.borrow() == GateState::Authorized
    }

    /// Waits for resolution, at most `timeout`.
    pub async fn wait(&self, timeout: Duration) -> Result<(), AuthorizationError> {
        let mut rx = self.tx.subscribe();
        match time::timeout(timeout, rx.wait_for(|s| s.outcome().is_some())).await {
            Ok(Ok(state)) => state
                .outcome()
                .unwrap_or(Err(AuthorizationError::Timeout { timeout })),
            // The sender lives in `self`; the channel cannot close while we borrow it.
            Ok(Err(_closed)) => Err(AuthorizationError::Rejected {
                reason: "authorization gate closed".into(),
            }),
            Err(_elapsed) => Err(AuthorizationError::Timeout { timeout }),
        }
    }

    fn resolve(&self, next: GateState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == GateState::Pending {
                *state = next;
                true
            } else {
                false
            }
        })
    }
}

impl Default for AuthorizationGate {
    fn default() -> Self {
        Self::new()
    }
}
