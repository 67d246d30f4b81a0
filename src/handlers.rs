//! # Handler contracts.
//!
//! Each collaborator accepts function-shaped callbacks for the events it
//! produces. The agent registers them once, before any component starts, and
//! never replaces them afterwards.
//!
//! All handlers are `Arc<dyn Fn(..) + Send + Sync>`: collaborators may invoke
//! them from any task, concurrently and reentrantly. Handlers are synchronous;
//! a handler that needs to do I/O is expected to enqueue and return.
//!
//! [`HandlerSlot`] is the registration cell collaborators use to hold one
//! handler per event kind (last registration wins).

use std::sync::{Arc, RwLock};

use crate::error::HandlerError;
use crate::model::{
    AuditCommand, AuditResult, Automation, AutomationFeedback, Constraint, Delta, EntitiesResync,
    LogLevel, Metric,
};

/// Gateway → executor: an automation command arrived.
pub type AutomationHandler = Arc<dyn Fn(Automation) -> Result<(), HandlerError> + Send + Sync>;

/// Executor → gateway: an automation produced feedback.
pub type AutomationFeedbackHandler =
    Arc<dyn Fn(AutomationFeedback) -> Result<(), HandlerError> + Send + Sync>;

/// Gateway → agent: the control plane requested a restart.
pub type RestartHandler = Arc<dyn Fn() -> Result<(), HandlerError> + Send + Sync>;

/// Gateway → agent: the control plane requested a different log level.
pub type ChangeLogLevelHandler = Arc<dyn Fn(LogLevel) -> Result<(), HandlerError> + Send + Sync>;

/// Metrics source → gateway.
pub type MetricsHandler = Arc<dyn Fn(Vec<Metric>) -> Result<(), HandlerError> + Send + Sync>;

/// Entities source → gateway: incremental changes.
pub type DeltasHandler = Arc<dyn Fn(Vec<Delta>) -> Result<(), HandlerError> + Send + Sync>;

/// Entities source → gateway: full snapshot.
pub type EntitiesResyncHandler =
    Arc<dyn Fn(EntitiesResync) -> Result<(), HandlerError> + Send + Sync>;

/// Auditor → gateway: evaluation results ("recommendations").
pub type AuditResultHandler =
    Arc<dyn Fn(Vec<AuditResult>) -> Result<(), HandlerError> + Send + Sync>;

/// Gateway → auditor: run an audit now.
pub type AuditCommandHandler =
    Arc<dyn Fn(AuditCommand) -> Result<Vec<AuditResult>, HandlerError> + Send + Sync>;

/// Gateway → auditor: the constraint set changed.
pub type ConstraintsHandler =
    Arc<dyn Fn(Vec<Constraint>) -> Result<(), HandlerError> + Send + Sync>;

/// Holds at most one handler; a later [`set`](HandlerSlot::set) replaces the earlier one.
///
/// `get` clones the `Arc` out of the lock, so the handler runs without holding
/// it and may itself register handlers.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use cluster_agent::handlers::{HandlerSlot, RestartHandler};
///
/// let slot: HandlerSlot<RestartHandler> = HandlerSlot::new();
/// assert!(slot.get().is_none());
///
/// slot.set(Arc::new(|| Ok(())));
/// let handler = slot.get().unwrap();
/// assert!(handler().is_ok());
/// ```
pub struct HandlerSlot<H> {
    inner: RwLock<Option<H>>,
}

impl<H: Clone> HandlerSlot<H> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Registers `handler`, replacing any previous one.
    pub fn set(&self, handler: H) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(handler);
    }

    /// Returns the registered handler, if any.
    pub fn get(&self) -> Option<H> {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// True if a handler has been registered.
    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }
}

impl<H: Clone> Default for HandlerSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}
