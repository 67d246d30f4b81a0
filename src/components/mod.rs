//! # Collaborator contracts consumed by the agent.
//!
//! The agent never implements transport, metrics collection, entity watching,
//! policy evaluation or automation execution itself. It drives collaborators
//! through these traits:
//!
//! - [`Component`] - async, cancelable, long-running unit (`start`)
//! - [`Gateway`] - control-plane transport with an authorization gate
//! - [`MetricsSource`], [`EntitiesSource`] - produce outbound data
//! - [`AutomationExecutor`] - executes remediation commands
//! - [`Auditor`] - evaluates constraints
//!
//! [`AuthorizationGate`] is a ready-made one-shot gate a [`Gateway`]
//! implementation can delegate `wait_authorization` to.

mod auditor;
mod automation;
mod entities;
mod gate;
mod gateway;
mod metrics;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;

pub use auditor::Auditor;
pub use automation::AutomationExecutor;
pub use entities::EntitiesSource;
pub use gate::AuthorizationGate;
pub use gateway::Gateway;
pub use metrics::MetricsSource;

/// # Asynchronous, cancelable component.
///
/// `start` runs until `ctx` is cancelled or the component fails irrecoverably.
/// On cancellation implementations return `Ok(())` or
/// `Err(ComponentError::Canceled)`; both count as a graceful stop.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use cluster_agent::{Component, ComponentError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Component for Heartbeat {
///     async fn start(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Runs the component until completion or cancellation.
    async fn start(&self, ctx: CancellationToken) -> Result<(), ComponentError>;
}

/// Role a component plays inside the agent; used for task names, logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Gateway,
    Entities,
    Metrics,
    Automation,
    Auditor,
}

impl Role {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Gateway => "gateway",
            Role::Entities => "entities",
            Role::Metrics => "metrics",
            Role::Automation => "automation",
            Role::Auditor => "auditor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborators owned by one agent.
///
/// Optional members are `Some` only when the corresponding feature is enabled,
/// so a disabled component can be neither wired nor started.
pub(crate) struct Components {
    pub gateway: Arc<dyn Gateway>,
    pub entities: Arc<dyn EntitiesSource>,
    pub auditor: Arc<dyn Auditor>,
    pub metrics: Option<Arc<dyn MetricsSource>>,
    pub automation: Option<Arc<dyn AutomationExecutor>>,
}
