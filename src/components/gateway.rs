use std::time::Duration;

use async_trait::async_trait;

use super::Component;
use crate::error::{AuthorizationError, HandlerError};
use crate::handlers::{
    AuditCommandHandler, AutomationHandler, ChangeLogLevelHandler, ConstraintsHandler,
    RestartHandler,
};
use crate::model::{AuditResult, AutomationFeedback, Delta, EntitiesResync, Metric};

/// # Control-plane transport.
///
/// `start` owns the connection (handshake, reconnects, backoff); it is the
/// first component launched and the only one the agent waits on before
/// launching anything else.
///
/// ### Sending
/// `send_*` methods hand a payload to the transport. They are invoked from
/// other components' tasks, concurrently, and must not block for long.
///
/// ### Receiving
/// Inbound commands are delivered through the handlers registered with
/// `set_*_handler`. Registration happens before `start` is called.
#[async_trait]
pub trait Gateway: Component {
    /// Blocks until the control plane authorizes this agent, rejects it, or
    /// `timeout` elapses.
    ///
    /// Resolves exactly once. Called at most once per agent run; a second call
    /// after resolution is not supported.
    async fn wait_authorization(&self, timeout: Duration) -> Result<(), AuthorizationError>;

    fn send_metrics(&self, metrics: Vec<Metric>) -> Result<(), HandlerError>;
    fn send_entities_deltas(&self, deltas: Vec<Delta>) -> Result<(), HandlerError>;
    fn send_entities_resync(&self, resync: EntitiesResync) -> Result<(), HandlerError>;
    fn send_automation_feedback(&self, feedback: AutomationFeedback) -> Result<(), HandlerError>;
    /// Sends audit results ("recommendations").
    fn send_recs(&self, results: Vec<AuditResult>) -> Result<(), HandlerError>;

    fn set_automation_handler(&self, handler: AutomationHandler);
    fn set_restart_handler(&self, handler: RestartHandler);
    fn set_change_log_level_handler(&self, handler: ChangeLogLevelHandler);
    fn set_audit_command_handler(&self, handler: AuditCommandHandler);
    fn set_constraints_handler(&self, handler: ConstraintsHandler);
}
