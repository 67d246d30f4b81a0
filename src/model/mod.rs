//! # Value objects exchanged between the agent and its collaborators.
//!
//! Everything here is plain data: `Clone`, `PartialEq` and serde-serializable so
//! the gateway transport can encode it however it likes.
//!
//! - [`AgentIdentity`] account/cluster/agent UUIDs fixed for the process lifetime
//! - [`LogLevel`] a requested level name, resolved to a tracing [`LevelFilter`](tracing::level_filters::LevelFilter)
//! - [`Automation`], [`AutomationFeedback`] remediation commands and their outcome
//! - [`Metric`] one sample produced by the metrics source
//! - [`Delta`], [`EntitiesResync`] incremental and full entity state
//! - [`AuditCommand`], [`Constraint`], [`AuditResult`] policy evaluation

mod audit;
mod automation;
mod entities;
mod identity;
mod log_level;
mod metrics;

pub use audit::{AuditCommand, AuditResult, AuditStatus, Constraint};
pub use automation::{Automation, AutomationFeedback, AutomationStatus};
pub use entities::{Delta, DeltaKind, EntitiesResync, EntityRef, Gvrk};
pub use identity::AgentIdentity;
pub use log_level::LogLevel;
pub use metrics::Metric;
