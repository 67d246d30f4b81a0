//! Agent core: orchestration and lifecycle.
//!
//! The public API from this module is [`Agent`] and its [`AgentBuilder`],
//! [`AgentConfig`] and state types.
//!
//! Internal modules:
//! - [`agent`]: authorization handshake, launch, first-failure shutdown;
//! - [`lifecycle`]: `Created → … → Stopped` state machine;
//! - [`scope`]: the `all` / `sources` / `sinks` cancellation hierarchy;
//! - [`group`]: one task per component, first error wins;
//! - [`wiring`]: registers handlers between collaborators;
//! - [`control`]: restart and log-level handlers;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod agent;
mod builder;
mod config;
mod control;
mod exit;
mod group;
mod lifecycle;
mod scope;
mod shutdown;
mod wiring;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use config::{AgentConfig, DEFAULT_AUTHORIZATION_TIMEOUT, DEFAULT_BUS_CAPACITY};
pub use exit::{ExitHook, RESTART_EXIT_CODE, Termination};
pub use lifecycle::AgentState;
pub use scope::{ScopeKind, ScopeState};
