//! # Handler wiring between collaborators.
//!
//! ```text
//!   Gateway ── automation ─────────► AutomationExecutor::submit_automation   (automation)
//!   AutomationExecutor ── feedback ─► Gateway::send_automation_feedback       (automation)
//!   MetricsSource ── metrics ───────► Gateway::send_metrics                   (metrics)
//!   EntitiesSource ── deltas ───────► Gateway::send_entities_deltas
//!   EntitiesSource ── resync ───────► Gateway::send_entities_resync
//!   Gateway ── audit command ───────► Auditor::handle_audit_command
//!   Gateway ── constraints ─────────► Auditor::handle_constraints
//!   Auditor ── audit results ───────► Gateway::send_recs
//!   Gateway ── restart ─────────────► agent restart handler
//!   Gateway ── log level ───────────► agent log-level handler
//! ```
//!
//! Runs exactly once per agent, before any component is launched. Disabled
//! components are absent from [`Components`], so their edges are never wired.

use std::sync::Arc;

use tracing::debug;

use crate::components::{Components, Gateway};
use crate::error::HandlerError;
use crate::handlers::{ChangeLogLevelHandler, RestartHandler};

/// Handlers answered by the agent itself.
pub(crate) struct ControlHandlers {
    pub restart: RestartHandler,
    pub change_log_level: ChangeLogLevelHandler,
}

/// Registers every edge and returns the names of those wired.
pub(crate) fn wire(components: &Components, control: ControlHandlers) -> Vec<&'static str> {
    let gateway = &components.gateway;
    let mut edges = Vec::with_capacity(10);

    if let Some(executor) = &components.automation {
        let target = Arc::clone(executor);
        gateway.set_automation_handler(Arc::new(move |automation| {
            target.submit_automation(automation)
        }));
        edges.push("automation");

        executor.set_automation_feedback_handler(forward(
            "automation_feedback",
            gateway,
            |gw, feedback| gw.send_automation_feedback(feedback),
        ));
        edges.push("automation_feedback");
    }

    if let Some(metrics) = &components.metrics {
        metrics.set_metrics_handler(forward("metrics", gateway, |gw, batch| gw.send_metrics(batch)));
        edges.push("metrics");
    }

    let entities = &components.entities;
    entities.set_deltas_handler(forward("deltas", gateway, |gw, deltas| {
        gw.send_entities_deltas(deltas)
    }));
    entities.set_entities_resync_handler(forward("resync", gateway, |gw, resync| {
        gw.send_entities_resync(resync)
    }));
    edges.extend(["deltas", "resync"]);

    let auditor = &components.auditor;
    let target = Arc::clone(auditor);
    gateway.set_audit_command_handler(Arc::new(move |command| target.handle_audit_command(command)));
    let target = Arc::clone(auditor);
    gateway.set_constraints_handler(Arc::new(move |constraints| {
        target.handle_constraints(constraints)
    }));
    auditor.set_audit_result_handler(forward("audit_results", gateway, |gw, results| {
        gw.send_recs(results)
    }));
    edges.extend(["audit_command", "constraints", "audit_results"]);

    gateway.set_restart_handler(control.restart);
    gateway.set_change_log_level_handler(control.change_log_level);
    edges.extend(["restart", "change_log_level"]);

    edges
}

/// Builds a handler that hands its payload to one of the gateway's `send_*` methods.
///
/// Send failures go back to the producing collaborator; the run is unaffected.
fn forward<T, F>(
    edge: &'static str,
    gateway: &Arc<dyn Gateway>,
    send: F,
) -> Arc<dyn Fn(T) -> Result<(), HandlerError> + Send + Sync>
where
    T: 'static,
    F: Fn(&dyn Gateway, T) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    let gateway = Arc::clone(gateway);
    Arc::new(move |payload| {
        send(gateway.as_ref(), payload).inspect_err(|err| {
            debug!(edge, error = %err, "gateway send failed");
        })
    })
}
