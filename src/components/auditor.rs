use super::Component;
use crate::error::HandlerError;
use crate::handlers::AuditResultHandler;
use crate::model::{AuditCommand, AuditResult, Constraint};

/// Evaluates cluster entities against policy constraints.
pub trait Auditor: Component {
    fn set_audit_result_handler(&self, handler: AuditResultHandler);

    /// Runs the requested audit and returns its immediate results.
    fn handle_audit_command(&self, command: AuditCommand) -> Result<Vec<AuditResult>, HandlerError>;

    /// Replaces the active constraint set.
    fn handle_constraints(&self, constraints: Vec<Constraint>) -> Result<(), HandlerError>;
}
