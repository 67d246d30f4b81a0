use super::Component;
use crate::error::HandlerError;
use crate::handlers::AutomationFeedbackHandler;
use crate::model::Automation;

/// Executes remediation commands and reports their outcome.
pub trait AutomationExecutor: Component {
    fn set_automation_feedback_handler(&self, handler: AutomationFeedbackHandler);

    /// Queues `automation` for execution.
    ///
    /// Returns once the command is accepted, not once it ran; the outcome is
    /// reported through the feedback handler.
    fn submit_automation(&self, automation: Automation) -> Result<(), HandlerError>;
}
