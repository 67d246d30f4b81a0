//! Spy collaborators shared by the crate's tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::components::{
    Auditor, AuthorizationGate, AutomationExecutor, Component, EntitiesSource, Gateway,
    MetricsSource,
};
use crate::error::{AuthorizationError, ComponentError, HandlerError};
use crate::handlers::{
    AuditCommandHandler, AuditResultHandler, AutomationFeedbackHandler, AutomationHandler,
    ChangeLogLevelHandler, ConstraintsHandler, DeltasHandler, EntitiesResyncHandler, HandlerSlot,
    MetricsHandler, RestartHandler,
};
use crate::model::{
    AuditCommand, AuditResult, Automation, AutomationFeedback, Constraint, Delta, EntitiesResync,
    Metric,
};

/// How a [`SpyGateway`] resolves its authorization gate when started.
pub(crate) enum GatewayMode {
    AuthorizeOnStart,
    RejectOnStart(&'static str),
    /// Never resolves; the caller drives the gate.
    Silent,
    FailOnStart(&'static str),
    /// Authorizes, then fails in the same poll.
    AuthorizeThenFail(&'static str),
}

pub(crate) struct SpyGateway {
    pub gate: AuthorizationGate,
    mode: GatewayMode,
    pub started: AtomicBool,
    pub cancelled: AtomicBool,
    pub automation: HandlerSlot<AutomationHandler>,
    pub restart: HandlerSlot<RestartHandler>,
    pub log_level: HandlerSlot<ChangeLogLevelHandler>,
    pub audit_command: HandlerSlot<AuditCommandHandler>,
    pub constraints: HandlerSlot<ConstraintsHandler>,
    pub metrics_sent: Mutex<Vec<Metric>>,
    pub deltas_sent: Mutex<Vec<Delta>>,
    pub resyncs_sent: Mutex<Vec<EntitiesResync>>,
    pub feedback_sent: Mutex<Vec<AutomationFeedback>>,
    pub recs_sent: Mutex<Vec<AuditResult>>,
}

impl SpyGateway {
    pub fn new(mode: GatewayMode) -> Self {
        Self {
            gate: AuthorizationGate::new(),
            mode,
            started: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            automation: HandlerSlot::new(),
            restart: HandlerSlot::new(),
            log_level: HandlerSlot::new(),
            audit_command: HandlerSlot::new(),
            constraints: HandlerSlot::new(),
            metrics_sent: Mutex::new(Vec::new()),
            deltas_sent: Mutex::new(Vec::new()),
            resyncs_sent: Mutex::new(Vec::new()),
            feedback_sent: Mutex::new(Vec::new()),
            recs_sent: Mutex::new(Vec::new()),
        }
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Component for SpyGateway {
    async fn start(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
        self.started.store(true, Ordering::SeqCst);
        match self.mode {
            GatewayMode::AuthorizeOnStart => {
                self.gate.authorize();
            }
            GatewayMode::RejectOnStart(reason) => {
                self.gate.reject(reason);
            }
            GatewayMode::Silent => {}
            GatewayMode::FailOnStart(error) => {
                return Err(ComponentError::Fatal {
                    error: error.into(),
                });
            }
            GatewayMode::AuthorizeThenFail(error) => {
                self.gate.authorize();
                return Err(ComponentError::Fatal {
                    error: error.into(),
                });
            }
        }
        ctx.cancelled().await;
        self.cancelled.store(true, Ordering::SeqCst);
        Err(ComponentError::Canceled)
    }
}

#[async_trait]
impl Gateway for SpyGateway {
    async fn wait_authorization(&self, timeout: Duration) -> Result<(), AuthorizationError> {
        self.gate.wait(timeout).await
    }

    fn send_metrics(&self, metrics: Vec<Metric>) -> Result<(), HandlerError> {
        self.metrics_sent.lock().unwrap().extend(metrics);
        Ok(())
    }

    fn send_entities_deltas(&self, deltas: Vec<Delta>) -> Result<(), HandlerError> {
        self.deltas_sent.lock().unwrap().extend(deltas);
        Ok(())
    }

    fn send_entities_resync(&self, resync: EntitiesResync) -> Result<(), HandlerError> {
        self.resyncs_sent.lock().unwrap().push(resync);
        Ok(())
    }

    fn send_automation_feedback(&self, feedback: AutomationFeedback) -> Result<(), HandlerError> {
        self.feedback_sent.lock().unwrap().push(feedback);
        Ok(())
    }

    fn send_recs(&self, results: Vec<AuditResult>) -> Result<(), HandlerError> {
        self.recs_sent.lock().unwrap().extend(results);
        Ok(())
    }

    fn set_automation_handler(&self, handler: AutomationHandler) {
        self.automation.set(handler);
    }

    fn set_restart_handler(&self, handler: RestartHandler) {
        self.restart.set(handler);
    }

    fn set_change_log_level_handler(&self, handler: ChangeLogLevelHandler) {
        self.log_level.set(handler);
    }

    fn set_audit_command_handler(&self, handler: AuditCommandHandler) {
        self.audit_command.set(handler);
    }

    fn set_constraints_handler(&self, handler: ConstraintsHandler) {
        self.constraints.set(handler);
    }
}

/// What a [`SpyComponent`] does once started.
#[derive(Clone, Copy)]
pub(crate) enum Behavior {
    RunUntilCancelled,
    FailAfter(Duration, &'static str),
    /// Runs until cancelled, then reports a failure instead of `Canceled`.
    FailOnCancel,
    Panic(&'static str),
}

/// Plays any source role: entities, metrics, automation or auditor.
pub(crate) struct SpyComponent {
    behavior: Behavior,
    pub started: AtomicBool,
    pub cancelled: AtomicBool,
    pub metrics: HandlerSlot<MetricsHandler>,
    pub deltas: HandlerSlot<DeltasHandler>,
    pub resync: HandlerSlot<EntitiesResyncHandler>,
    pub feedback: HandlerSlot<AutomationFeedbackHandler>,
    pub audit_results: HandlerSlot<AuditResultHandler>,
    pub submitted: Mutex<Vec<Automation>>,
    pub constraints: Mutex<Vec<Constraint>>,
    pub commands: Mutex<Vec<AuditCommand>>,
}

impl SpyComponent {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            started: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            metrics: HandlerSlot::new(),
            deltas: HandlerSlot::new(),
            resync: HandlerSlot::new(),
            feedback: HandlerSlot::new(),
            audit_results: HandlerSlot::new(),
            submitted: Mutex::new(Vec::new()),
            constraints: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn running() -> Self {
        Self::new(Behavior::RunUntilCancelled)
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Component for SpyComponent {
    async fn start(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
        self.started.store(true, Ordering::SeqCst);
        match self.behavior {
            Behavior::RunUntilCancelled => {
                ctx.cancelled().await;
                self.cancelled.store(true, Ordering::SeqCst);
                Err(ComponentError::Canceled)
            }
            Behavior::FailAfter(delay, error) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => Err(ComponentError::Fail { error: error.into() }),
                    _ = ctx.cancelled() => {
                        self.cancelled.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                }
            }
            Behavior::FailOnCancel => {
                ctx.cancelled().await;
                self.cancelled.store(true, Ordering::SeqCst);
                Err(ComponentError::Fail {
                    error: "failed while stopping".into(),
                })
            }
            Behavior::Panic(msg) => panic!("{msg}"),
        }
    }
}

impl MetricsSource for SpyComponent {
    fn set_metrics_handler(&self, handler: MetricsHandler) {
        self.metrics.set(handler);
    }
}

impl EntitiesSource for SpyComponent {
    fn set_deltas_handler(&self, handler: DeltasHandler) {
        self.deltas.set(handler);
    }

    fn set_entities_resync_handler(&self, handler: EntitiesResyncHandler) {
        self.resync.set(handler);
    }
}

impl AutomationExecutor for SpyComponent {
    fn set_automation_feedback_handler(&self, handler: AutomationFeedbackHandler) {
        self.feedback.set(handler);
    }

    fn submit_automation(&self, automation: Automation) -> Result<(), HandlerError> {
        self.submitted.lock().unwrap().push(automation);
        Ok(())
    }
}

impl Auditor for SpyComponent {
    fn set_audit_result_handler(&self, handler: AuditResultHandler) {
        self.audit_results.set(handler);
    }

    fn handle_audit_command(&self, command: AuditCommand) -> Result<Vec<AuditResult>, HandlerError> {
        self.commands.lock().unwrap().push(command);
        Ok(Vec::new())
    }

    fn handle_constraints(&self, constraints: Vec<Constraint>) -> Result<(), HandlerError> {
        self.constraints.lock().unwrap().extend(constraints);
        Ok(())
    }
}
