//! # cluster-agent
//!
//! **cluster-agent** is the supervisor of a cluster-resident agent that bridges
//! a Kubernetes cluster to a remote control plane (the "gateway").
//!
//! It authorizes the agent with the gateway, starts the cluster-facing
//! components as one unit, wires the callbacks they exchange, and stops all of
//! them together when any one fails.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                        ┌───────────────────────────┐
//!                        │          Gateway          │
//!                        │ (transport, authorization)│
//!                        └─▲──────────┬──────────────┘
//!          send_metrics /  │          │ automation / audit command /
//!          deltas / resync │          │ constraints / restart / log level
//!          feedback / recs │          ▼
//! ┌────────────────────────┴──────────────────────────────────────────┐
//! │  Agent (supervisor)                                               │
//! │  - wiring (handlers between collaborators)                        │
//! │  - scopes: all ─┬─ sources                                        │
//! │                 └─ sinks                                          │
//! │  - ComponentGroup (JoinSet, first error wins)                     │
//! │  - Bus (broadcast events) ──► SubscriberSet ──► LogWriter, ...    │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!  EntitiesSource      MetricsSource   AutomationExecutor    Auditor
//!                       (optional)         (optional)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Created ─► Wired ─► AuthorizingGateway ─► Running ─► Stopping ─► Stopped
//!                            │                                       ▲
//!                            └──── timeout / rejected / stop ────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | Authorize, launch, stop; first failure wins.                  | [`Agent`], [`AgentBuilder`]                |
//! | **Collaborators** | Contracts the agent drives.                                   | [`Gateway`], [`EntitiesSource`], [`Auditor`], [`MetricsSource`], [`AutomationExecutor`] |
//! | **Authorization** | Resolve-once gate for gateway implementations.                | [`AuthorizationGate`]                      |
//! | **Handlers**      | Callback types and registration cell.                         | [`handlers`]                               |
//! | **Events**        | Runtime events and subscribers.                               | [`Event`], [`Subscribe`], [`LogWriter`]    |
//! | **Logging**       | Global `tracing` sink with a reloadable level.                | [`logging::init`], [`LogControl`]          |
//! | **Errors**        | Typed errors per failure domain.                              | [`AgentError`], [`ComponentError`], [`HandlerError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use cluster_agent::{Agent, AgentConfig, AgentIdentity, LogLevel, LogWriter, Subscribe};
//! # use cluster_agent::{Auditor, AutomationExecutor, EntitiesSource, Gateway, MetricsSource};
//! # fn collaborators() -> (Arc<dyn Gateway>, Arc<dyn EntitiesSource>, Arc<dyn Auditor>,
//! #     Arc<dyn MetricsSource>, Arc<dyn AutomationExecutor>) { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() {
//!     let log = cluster_agent::logging::init(&LogLevel::new("info")).expect("logging");
//!     let (gateway, entities, auditor, metrics, automation) = collaborators();
//!
//!     let cfg = AgentConfig::new(AgentIdentity::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()));
//!     let agent = Agent::builder(cfg)
//!         .with_gateway(gateway)
//!         .with_entities(entities)
//!         .with_auditor(auditor)
//!         .with_metrics(metrics)
//!         .with_automation(automation)
//!         .with_log_control(log)
//!         .with_subscribers(vec![Arc::new(LogWriter::new()) as Arc<dyn Subscribe>])
//!         .build()
//!         .expect("agent");
//!
//!     if let Err(err) = agent.run_until_signal().await {
//!         agent.exit(err.exit_code());
//!     }
//! }
//! ```

mod components;
mod core;
mod error;
mod events;
pub mod handlers;
pub mod logging;
mod model;
mod subscribers;

#[cfg(test)]
mod testkit;

// ---- Public re-exports ----

pub use components::{
    Auditor, AuthorizationGate, AutomationExecutor, Component, EntitiesSource, Gateway,
    MetricsSource, Role,
};
pub use crate::core::{
    Agent, AgentBuilder, AgentConfig, AgentState, DEFAULT_AUTHORIZATION_TIMEOUT,
    DEFAULT_BUS_CAPACITY, ExitHook, RESTART_EXIT_CODE, ScopeKind, ScopeState, Termination,
};
pub use error::{AgentError, AuthorizationError, ComponentError, FAILURE_EXIT_CODE, HandlerError};
pub use events::{Bus, Event, EventKind};
pub use logging::LogControl;
pub use model::{
    AgentIdentity, AuditCommand, AuditResult, AuditStatus, Automation, AutomationFeedback,
    AutomationStatus, Constraint, Delta, DeltaKind, EntitiesResync, EntityRef, Gvrk, LogLevel,
    Metric,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
