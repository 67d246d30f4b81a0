//! # Cancellation scopes.
//!
//! The agent owns three scopes, each a [`CancellationToken`] plus an explicit
//! tri-state:
//!
//! ```text
//!            all (root) ── gateway task
//!           ╱          ╲
//!      sources         sinks
//!   (entities, metrics,
//!   automation, auditor)
//! ```
//!
//! ## Rules
//! - Cancelling `all` cancels `sources` and `sinks`; cancelling a child affects
//!   neither its sibling nor the root.
//! - `NotStarted → Running` happens once (`arm`); `Running → Stopped` happens once
//!   (`fire`). Both are compare-and-swap, so concurrent stops are race-free and
//!   repeated stops are no-ops.
//! - Firing a scope that was never armed does nothing.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::{Bus, Event, EventKind};

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Observable state of one cancellation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    NotStarted,
    Running,
    Stopped,
}

/// Names the three scopes owned by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Root; parent of the other two. The gateway runs directly under it.
    All,
    /// Data-producing components.
    Sources,
    /// Reserved for sink-side extensions; nothing runs under it by default.
    Sinks,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::All => "all",
            ScopeKind::Sources => "sources",
            ScopeKind::Sinks => "sinks",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cancellation token with a one-way `NotStarted → Running → Stopped` guard.
pub(crate) struct CancelScope {
    kind: ScopeKind,
    token: CancellationToken,
    state: AtomicU8,
}

impl CancelScope {
    fn root() -> Self {
        Self {
            kind: ScopeKind::All,
            token: CancellationToken::new(),
            state: AtomicU8::new(NOT_STARTED),
        }
    }

    fn child(&self, kind: ScopeKind) -> Self {
        Self {
            kind,
            token: self.token.child_token(),
            state: AtomicU8::new(NOT_STARTED),
        }
    }

    /// `NotStarted → Running`. Returns `false` if the scope was already armed.
    fn arm(&self) -> bool {
        self.state
            .compare_exchange(NOT_STARTED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// `Running → Stopped`, cancelling the token. Returns `false` if the scope
    /// was not running (never armed, already stopped, or cancelled by its parent).
    fn fire(&self) -> bool {
        // Already cancelled through the parent: settle the state, report nothing.
        if self.token.is_cancelled() {
            let _ = self
                .state
                .compare_exchange(RUNNING, STOPPED, Ordering::AcqRel, Ordering::Acquire);
            return false;
        }
        let fired = self
            .state
            .compare_exchange(RUNNING, STOPPED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if fired {
            self.token.cancel();
        }
        fired
    }

    /// Current state; a running scope whose parent fired reports `Stopped`.
    fn state(&self) -> ScopeState {
        match self.state.load(Ordering::Acquire) {
            NOT_STARTED => ScopeState::NotStarted,
            RUNNING if self.token.is_cancelled() => ScopeState::Stopped,
            RUNNING => ScopeState::Running,
            _ => ScopeState::Stopped,
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// The agent's cancellation hierarchy. Only the agent may fire these.
pub(crate) struct Scopes {
    all: CancelScope,
    sources: CancelScope,
    sinks: CancelScope,
    bus: Bus,
}

impl Scopes {
    pub fn new(bus: Bus) -> Self {
        let all = CancelScope::root();
        let sources = all.child(ScopeKind::Sources);
        let sinks = all.child(ScopeKind::Sinks);
        Self {
            all,
            sources,
            sinks,
            bus,
        }
    }

    /// Arms all three scopes. Returns `false` if they were armed before.
    pub fn arm(&self) -> bool {
        if !self.all.arm() {
            return false;
        }
        self.sources.arm();
        self.sinks.arm();
        true
    }

    pub fn get(&self, kind: ScopeKind) -> &CancelScope {
        match kind {
            ScopeKind::All => &self.all,
            ScopeKind::Sources => &self.sources,
            ScopeKind::Sinks => &self.sinks,
        }
    }

    pub fn state(&self, kind: ScopeKind) -> ScopeState {
        self.get(kind).state()
    }

    pub fn token(&self, kind: ScopeKind) -> CancellationToken {
        self.get(kind).token()
    }

    /// Fires one scope; returns `true` only for the call that cancelled it.
    pub fn stop(&self, kind: ScopeKind) -> bool {
        let scope = self.get(kind);
        let fired = scope.fire();
        if fired {
            debug!(scope = %scope.kind, "scope cancelled");
            self.bus
                .publish(Event::new(EventKind::ScopeCancelled).with_reason(scope.kind.as_str()));
        }
        fired
    }
}
