//! # Runtime events emitted by the agent.
//!
//! The [`EventKind`] enum classifies events across four categories:
//! - **Lifecycle**: agent state transitions and scope cancellation
//! - **Authorization**: the gateway handshake
//! - **Components**: per-component start/stop/failure
//! - **Control**: commands received from the control plane, subscriber health
//!
//! The [`Event`] struct carries metadata such as timestamp, component name,
//! reason and timeout.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order across receivers.
//!
//! ## Example
//! ```rust
//! use cluster_agent::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ComponentFailed)
//!     .with_component("entities")
//!     .with_reason("watch closed");
//!
//! assert_eq!(ev.kind, EventKind::ComponentFailed);
//! assert_eq!(ev.component.as_deref(), Some("entities"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::AgentState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of agent events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle ===
    /// Agent moved to a new lifecycle state.
    ///
    /// Sets: `state`
    StateChanged,

    /// A cancellation scope fired.
    ///
    /// Sets: `reason` (`all`, `sources` or `sinks`)
    ScopeCancelled,

    // === Authorization ===
    /// The agent started waiting on the gateway's authorization gate.
    ///
    /// Sets: `timeout_ms`
    AuthorizationRequested,

    /// The gateway authorized the agent.
    AuthorizationGranted,

    /// Authorization timed out, was rejected or was abandoned.
    ///
    /// Sets: `reason`
    AuthorizationFailed,

    // === Components ===
    /// A component task is being launched.
    ///
    /// Sets: `component`
    ComponentStarting,

    /// A component returned `Ok(())` or `Canceled`.
    ///
    /// Sets: `component`
    ComponentStopped,

    /// A component returned an error or panicked.
    ///
    /// Sets: `component`, `reason`
    ComponentFailed,

    // === Control ===
    /// The control plane asked for a restart.
    ///
    /// Sets: `reason` (exit code)
    RestartRequested,

    /// The log level was changed.
    ///
    /// Sets: `reason` (new level)
    LogLevelChanged,

    /// A subscriber panicked while processing an event.
    ///
    /// Sets: `component` (subscriber name), `reason`
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or closed).
    ///
    /// Sets: `component` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Agent event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Component (or subscriber) the event refers to.
    pub component: Option<Arc<str>>,
    /// Human-readable detail.
    pub reason: Option<Arc<str>>,
    /// New lifecycle state (for `StateChanged`).
    pub state: Option<AgentState>,
    /// Timeout in milliseconds (compact).
    pub timeout_ms: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            reason: None,
            state: None,
            timeout_ms: None,
        }
    }

    /// Creates a `StateChanged` event.
    #[inline]
    pub fn state_changed(state: AgentState) -> Self {
        let mut ev = Event::new(EventKind::StateChanged);
        ev.state = Some(state);
        ev
    }

    /// Attaches a component name.
    #[inline]
    pub fn with_component(mut self, component: impl Into<Arc<str>>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// True for the event that ends an agent run (`StateChanged` to `Stopped`).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind == EventKind::StateChanged && self.state == Some(AgentState::Stopped)
    }
}
