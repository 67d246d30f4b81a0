//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** the agent uses
//! to report what it is doing: state transitions, authorization, component
//! starts/stops/failures, scope cancellation and control commands.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Agent` (state, authorization, scopes), `ComponentGroup`
//!   (component lifecycle), control handlers (restart, log level),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the agent's subscriber listener (fans out to
//!   [`SubscriberSet`](crate::SubscriberSet)) and any raw receiver obtained via
//!   [`Agent::subscribe`](crate::Agent::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
