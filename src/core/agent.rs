//! # Agent: authorizes with the gateway, runs the components, stops them together.
//!
//! ```text
//! start():
//!   scopes.arm()                              (second start → AlreadyStarted)
//!   subscriber listener: Bus ─► SubscriberSet::emit
//!   wiring::wire(components, control)         Created → Wired
//!   group.spawn(gateway, all)                 Wired → AuthorizingGateway
//!   select! (biased) {
//!     all.cancelled()                         → Stopped (authorization abandoned)
//!     gateway.wait_authorization(timeout)
//!       ├─ Err  → stop(all), join gateway     → Stopped, Err(Authorization)
//!       └─ Ok   → all fired meanwhile?        → abandoned as above
//!                 else spawn entities, auditor,
//!                 [metrics], [automation] under sources → Running
//!   }
//!   select! {
//!     group.wait()          (every task exited)
//!     all.cancelled()       → Stopping, then group.wait()
//!   }
//!   stop(all)                                 → Stopped
//!   result: first component error
//!         | RestartRequested (restart handler fired)
//!         | Ok(())
//! ```
//!
//! `stop`, `stop_sources` and `stop_sinks` only fire scopes; they never wait.
//! Waiting is done by whoever awaits `start`.

use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::builder::AgentBuilder;
use super::config::AgentConfig;
use super::control;
use super::exit::{ExitHook, Termination};
use super::group::ComponentGroup;
use super::lifecycle::{AgentState, Lifecycle};
use super::scope::{ScopeKind, ScopeState, Scopes};
use super::shutdown;
use super::wiring::{self, ControlHandlers};
use crate::components::{Components, Role};
use crate::error::AgentError;
use crate::events::{Bus, Event, EventKind};
use crate::logging::LogControl;
use crate::model::AgentIdentity;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Supervises one gateway and its cluster-facing components.
///
/// Share it behind an `Arc` to call [`stop`](Agent::stop) from another task
/// while [`start`](Agent::start) is running.
pub struct Agent {
    pub(crate) cfg: AgentConfig,
    pub(crate) components: Components,
    pub(crate) log_control: LogControl,
    pub(crate) scopes: Arc<Scopes>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) termination: Arc<OnceLock<Termination>>,
    pub(crate) bus: Bus,
    pub(crate) subscribers: Mutex<Vec<Arc<dyn Subscribe>>>,
    pub(crate) exit_hook: ExitHook,
}

impl Agent {
    /// Returns a builder for an agent configured with `cfg`.
    pub fn builder(cfg: AgentConfig) -> AgentBuilder {
        AgentBuilder::new(cfg)
    }

    /// Runs the agent until the first component failure, a restart request,
    /// an explicit [`stop`](Agent::stop) or every component exiting.
    ///
    /// Returns:
    /// - `Err(Authorization)` if the gateway did not authorize in time (nothing
    ///   but the gateway was launched);
    /// - `Err(Component | ComponentPanicked)` with the **first** failure;
    /// - `Err(RestartRequested)` if the control plane asked for a restart;
    /// - `Err(AlreadyStarted)` on any call after the first;
    /// - `Ok(())` otherwise.
    pub async fn start(&self) -> Result<(), AgentError> {
        if !self.scopes.arm() {
            return Err(AgentError::AlreadyStarted {
                state: self.lifecycle.current(),
            });
        }
        let listener = self.subscriber_listener();

        let edges = wiring::wire(&self.components, self.control_handlers());
        debug!(?edges, "handlers wired");
        self.lifecycle.advance(AgentState::Wired);

        let result = self.run().await;
        match &result {
            Ok(()) => info!("agent stopped"),
            Err(err) => info!(error = %err, label = err.as_label(), "agent stopped"),
        }

        if let Some(listener) = listener {
            let _ = listener.await;
        }
        result
    }

    /// Cancels the root scope, and with it every component.
    ///
    /// Returns `true` for the call that cancelled it. Idempotent, never blocks;
    /// a no-op before `start`.
    pub fn stop(&self) -> bool {
        self.scopes.stop(ScopeKind::All)
    }

    /// Cancels only the sources scope. Idempotent.
    pub fn stop_sources(&self) -> bool {
        self.scopes.stop(ScopeKind::Sources)
    }

    /// Cancels only the sinks scope. Idempotent.
    pub fn stop_sinks(&self) -> bool {
        self.scopes.stop(ScopeKind::Sinks)
    }

    /// Terminates the process with `code` through the exit hook.
    ///
    /// The agent never calls this itself; the process boundary does, typically
    /// with [`AgentError::exit_code`] after `start` returned.
    pub fn exit(&self, code: i32) {
        info!(code, "exiting");
        (self.exit_hook)(code);
    }

    /// Runs [`start`](Agent::start) and stops the agent on SIGINT/SIGTERM/SIGQUIT.
    pub async fn run_until_signal(&self) -> Result<(), AgentError> {
        let run = self.start();
        tokio::pin!(run);

        tokio::select! {
            res = &mut run => return res,
            signal = shutdown::wait_for_shutdown_signal() => match signal {
                Ok(name) => info!(signal = name, "shutdown signal received"),
                Err(err) => {
                    warn!(error = %err, "signal handling unavailable");
                    return run.await;
                }
            },
        }
        self.stop();
        run.await
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        self.lifecycle.current()
    }

    /// Receiver notified on every state change.
    pub fn watch_state(&self) -> watch::Receiver<AgentState> {
        self.lifecycle.watch()
    }

    /// State of one cancellation scope.
    pub fn scope_state(&self, kind: ScopeKind) -> ScopeState {
        self.scopes.state(kind)
    }

    /// Token of the sinks scope, for sink-side extensions run by the embedder.
    pub fn sinks_token(&self) -> CancellationToken {
        self.scopes.token(ScopeKind::Sinks)
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.cfg.identity
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    /// Raw receiver of runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    async fn run(&self) -> Result<(), AgentError> {
        let root = self.scopes.token(ScopeKind::All);
        let mut group = ComponentGroup::new(Arc::clone(&self.scopes), self.bus.clone());

        self.lifecycle.advance(AgentState::AuthorizingGateway);
        group.spawn(Role::Gateway, Arc::clone(&self.components.gateway), root.clone());

        let timeout = self.cfg.authorization_timeout;
        self.bus.publish(
            Event::new(EventKind::AuthorizationRequested)
                .with_component(Role::Gateway.as_str())
                .with_timeout(timeout),
        );

        // A fired root outranks a grant that landed in the same wakeup.
        let authorization = tokio::select! {
            biased;
            _ = root.cancelled() => None,
            res = self.components.gateway.wait_authorization(timeout) => Some(res),
        };

        match authorization {
            Some(Ok(())) if !root.is_cancelled() => {}
            Some(Err(err)) => {
                self.bus
                    .publish(Event::new(EventKind::AuthorizationFailed).with_reason(err.to_string()));
                self.scopes.stop(ScopeKind::All);
                if let Err(gateway_err) = group.wait().await {
                    debug!(error = %gateway_err, "gateway failure after authorization error");
                }
                self.lifecycle.advance(AgentState::Stopped);
                return Err(err.into());
            }
            Some(Ok(())) | None => {
                self.bus
                    .publish(Event::new(EventKind::AuthorizationFailed).with_reason("abandoned"));
                let res = group.wait().await;
                self.lifecycle.advance(AgentState::Stopped);
                return res.and_then(|()| self.termination_result());
            }
        }

        self.lifecycle.advance(AgentState::Running);
        self.bus.publish(Event::new(EventKind::AuthorizationGranted));
        self.spawn_sources(&mut group);

        let wait = group.wait();
        tokio::pin!(wait);
        let result = tokio::select! {
            res = &mut wait => res,
            _ = root.cancelled() => {
                self.enter_stopping();
                wait.await
            }
        };

        self.scopes.stop(ScopeKind::All);
        self.enter_stopping();
        self.lifecycle.advance(AgentState::Stopped);
        result.and_then(|()| self.termination_result())
    }

    fn spawn_sources(&self, group: &mut ComponentGroup) {
        let token = self.scopes.token(ScopeKind::Sources);
        let c = &self.components;

        group.spawn(Role::Entities, Arc::clone(&c.entities), token.clone());
        if let Some(metrics) = &c.metrics {
            group.spawn(Role::Metrics, Arc::clone(metrics), token.clone());
        }
        if let Some(automation) = &c.automation {
            group.spawn(Role::Automation, Arc::clone(automation), token.clone());
        }
        group.spawn(Role::Auditor, Arc::clone(&c.auditor), token);
    }

    fn enter_stopping(&self) {
        if self.lifecycle.current() == AgentState::Running {
            self.lifecycle.advance(AgentState::Stopping);
        }
    }

    fn termination_result(&self) -> Result<(), AgentError> {
        match self.termination.get() {
            Some(t) => Err(AgentError::RestartRequested {
                exit_code: t.exit_code,
            }),
            None => Ok(()),
        }
    }

    fn control_handlers(&self) -> ControlHandlers {
        ControlHandlers {
            restart: control::restart_handler(
                Arc::clone(&self.scopes),
                Arc::clone(&self.termination),
                self.cfg.restart_exit_code,
                self.bus.clone(),
            ),
            change_log_level: control::log_level_handler(self.log_control.clone(), self.bus.clone()),
        }
    }

    /// Forwards bus events to the subscriber set until the agent reaches `Stopped`.
    fn subscriber_listener(&self) -> Option<tokio::task::JoinHandle<()>> {
        let subs = {
            let mut guard = self.subscribers.lock().unwrap_or_else(|p| p.into_inner());
            std::mem::take(&mut *guard)
        };
        if subs.is_empty() {
            return None;
        }

        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(subs, self.bus.clone());
        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        set.emit(&ev);
                        if ev.is_terminal() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::time::{Duration, SystemTime};

    use async_trait::async_trait;
    use tokio::task::JoinHandle;
    use tracing_subscriber::filter::LevelFilter;
    use uuid::Uuid;

    use super::*;
    use crate::error::{AuthorizationError, ComponentError, HandlerError};
    use crate::model::{
        AuditCommand, AuditResult, AuditStatus, Automation, AutomationFeedback, AutomationStatus,
        Constraint, Delta, DeltaKind, EntitiesResync, EntityRef, Gvrk, LogLevel, Metric,
    };
    use crate::testkit::{Behavior, GatewayMode, SpyComponent, SpyGateway};

    struct Rig {
        gateway: Arc<SpyGateway>,
        entities: Arc<SpyComponent>,
        auditor: Arc<SpyComponent>,
        metrics: Arc<SpyComponent>,
        automation: Arc<SpyComponent>,
        log_control: LogControl,
    }

    impl Rig {
        fn new(mode: GatewayMode) -> Self {
            Self {
                gateway: Arc::new(SpyGateway::new(mode)),
                entities: Arc::new(SpyComponent::running()),
                auditor: Arc::new(SpyComponent::running()),
                metrics: Arc::new(SpyComponent::running()),
                automation: Arc::new(SpyComponent::running()),
                log_control: LogControl::detached(LevelFilter::INFO),
            }
        }

        fn cfg(&self) -> AgentConfig {
            AgentConfig::new(AgentIdentity::new(Uuid::new_v4(), Uuid::new_v4()))
        }

        fn build_with(&self, cfg: AgentConfig) -> Arc<Agent> {
            let agent = Agent::builder(cfg)
                .with_gateway(self.gateway.clone())
                .with_entities(self.entities.clone())
                .with_auditor(self.auditor.clone())
                .with_metrics(self.metrics.clone())
                .with_automation(self.automation.clone())
                .with_log_control(self.log_control.clone())
                .build()
                .unwrap();
            Arc::new(agent)
        }

        fn build(&self) -> Arc<Agent> {
            self.build_with(self.cfg())
        }

        fn sources(&self) -> [&Arc<SpyComponent>; 4] {
            [&self.entities, &self.auditor, &self.metrics, &self.automation]
        }
    }

    fn spawn_start(agent: &Arc<Agent>) -> JoinHandle<Result<(), AgentError>> {
        let agent = Arc::clone(agent);
        tokio::spawn(async move { agent.start().await })
    }

    async fn wait_for_state(agent: &Agent, state: AgentState) {
        let mut rx = agent.watch_state();
        rx.wait_for(|s| *s == state).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_authorization_timeout_launches_nothing_else() {
        let rig = Rig::new(GatewayMode::Silent);
        let agent = rig.build();

        let err = agent.start().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Authorization(AuthorizationError::Timeout { timeout })
                if timeout == Duration::from_secs(7200)
        ));
        assert!(rig.gateway.started());
        assert!(rig.gateway.cancelled());
        for source in rig.sources() {
            assert!(!source.started());
        }
        assert_eq!(agent.state(), AgentState::Stopped);
    }

    #[tokio::test]
    async fn test_rejected_authorization_cancels_gateway() {
        let rig = Rig::new(GatewayMode::RejectOnStart("agent revoked"));
        let agent = rig.build();

        let err = agent.start().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Authorization(AuthorizationError::Rejected { ref reason }) if reason == "agent revoked"
        ));
        assert!(rig.gateway.cancelled());
        for source in rig.sources() {
            assert!(!source.started());
        }
        assert_eq!(agent.scope_state(ScopeKind::All), ScopeState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_component_error_wins() {
        let mut rig = Rig::new(GatewayMode::AuthorizeOnStart);
        rig.metrics = Arc::new(SpyComponent::new(Behavior::FailAfter(
            Duration::from_millis(10),
            "kubelet unreachable",
        )));
        rig.entities = Arc::new(SpyComponent::new(Behavior::FailOnCancel));
        let agent = rig.build();

        let err = agent.start().await.unwrap_err();
        match err {
            AgentError::Component { component, source } => {
                assert_eq!(component, "metrics");
                assert_eq!(
                    source,
                    ComponentError::Fail {
                        error: "kubelet unreachable".into()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(rig.entities.cancelled());
        assert!(rig.auditor.cancelled());
        assert!(rig.automation.cancelled());
        assert!(rig.gateway.cancelled());
        assert_eq!(agent.state(), AgentState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        assert!(!agent.stop(), "stop before start is a no-op");

        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        assert!(agent.stop());
        assert!(!agent.stop());
        assert!(run.await.unwrap().is_ok());
        assert!(!agent.stop());

        assert_eq!(agent.state(), AgentState::Stopped);
        for source in rig.sources() {
            assert!(source.cancelled());
        }
    }

    #[tokio::test]
    async fn test_concurrent_stops() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let stoppers: Vec<_> = (0..4)
            .map(|_| {
                let agent = Arc::clone(&agent);
                tokio::spawn(async move { agent.stop() })
            })
            .collect();
        let mut fired = 0;
        for s in stoppers {
            if s.await.unwrap() {
                fired += 1;
            }
        }

        assert_eq!(fired, 1);
        assert!(run.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_metrics_disabled_is_neither_started_nor_wired() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let mut cfg = rig.cfg();
        cfg.enable_metrics = false;
        let agent = rig.build_with(cfg);

        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;
        tokio::task::yield_now().await;

        assert!(!rig.metrics.started());
        assert!(!rig.metrics.metrics.is_set());
        assert!(rig.entities.deltas.is_set());

        agent.stop();
        assert!(run.await.unwrap().is_ok());
        assert!(!rig.metrics.started());
    }

    #[tokio::test]
    async fn test_automation_round_trip() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let submit = rig.gateway.automation.get().unwrap();
        submit(Automation::new("a1", "scale", "deploy/default/web")).unwrap();
        assert_eq!(
            *rig.automation.submitted.lock().unwrap(),
            vec![Automation::new("a1", "scale", "deploy/default/web")]
        );

        let feedback = rig.automation.feedback.get().unwrap();
        feedback(AutomationFeedback::new("a1", AutomationStatus::Applied)).unwrap();
        assert_eq!(
            *rig.gateway.feedback_sent.lock().unwrap(),
            vec![AutomationFeedback::new("a1", AutomationStatus::Applied)]
        );

        agent.stop();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_audit_and_resync_edges_forward_once() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let command = AuditCommand {
            id: "c1".into(),
            constraint_ids: vec!["k8s-required-labels".into()],
        };
        let audit = rig.gateway.audit_command.get().unwrap();
        assert_eq!(audit(command.clone()).unwrap(), Vec::new());
        assert_eq!(*rig.auditor.commands.lock().unwrap(), vec![command]);

        let constraint = Constraint {
            id: "k8s-required-labels".into(),
            name: "Required labels".into(),
            category: "governance".into(),
            severity: "medium".into(),
            parameters: serde_json::json!({ "labels": ["team"] }),
        };
        let constraints = rig.gateway.constraints.get().unwrap();
        constraints(vec![constraint.clone()]).unwrap();
        assert_eq!(*rig.auditor.constraints.lock().unwrap(), vec![constraint]);

        let result = AuditResult {
            constraint_id: "k8s-required-labels".into(),
            entity: EntityRef::new("Deployment", "default", "web"),
            status: AuditStatus::Violation,
            message: Some("missing label team".into()),
        };
        let recs = rig.auditor.audit_results.get().unwrap();
        recs(vec![result.clone()]).unwrap();
        assert_eq!(*rig.gateway.recs_sent.lock().unwrap(), vec![result]);

        let resync = EntitiesResync {
            timestamp: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            snapshot: BTreeMap::from([(
                "apps/v1/deployments/Deployment".to_owned(),
                vec![serde_json::json!({ "metadata": { "name": "web" } })],
            )]),
        };
        let send_resync = rig.entities.resync.get().unwrap();
        send_resync(resync.clone()).unwrap();
        assert_eq!(*rig.gateway.resyncs_sent.lock().unwrap(), vec![resync]);

        agent.stop();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_automation_disabled_is_not_wired() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let mut cfg = rig.cfg();
        cfg.enable_automation = false;
        let agent = rig.build_with(cfg);
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        assert!(rig.gateway.automation.get().is_none());
        assert!(!rig.automation.feedback.is_set());

        agent.stop();
        run.await.unwrap().unwrap();
        assert!(!rig.automation.started());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_metrics_and_deltas_are_all_forwarded() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let metrics = rig.metrics.metrics.get().unwrap();
        let deltas = rig.entities.deltas.get().unwrap();
        let entity = EntityRef::new("Pod", "default", "web-0");
        let gvrk = Gvrk {
            group: String::new(),
            version: "v1".into(),
            resource: "pods".into(),
            kind: "Pod".into(),
        };

        let mut tasks = Vec::new();
        for i in 0..50 {
            let metrics = metrics.clone();
            let entity = entity.clone();
            tasks.push(tokio::spawn(async move {
                metrics(vec![Metric {
                    name: "cpu".into(),
                    entity,
                    container: None,
                    value: i,
                    timestamp: SystemTime::now(),
                }])
            }));
            let deltas = deltas.clone();
            let gvrk = gvrk.clone();
            tasks.push(tokio::spawn(async move {
                deltas(vec![Delta {
                    kind: DeltaKind::Upsert,
                    gvrk,
                    data: serde_json::json!({ "n": i }),
                    timestamp: SystemTime::now(),
                }])
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        assert_eq!(rig.gateway.metrics_sent.lock().unwrap().len(), 50);
        assert_eq!(rig.gateway.deltas_sent.lock().unwrap().len(), 50);

        agent.stop();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_log_level_change() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let change = rig.gateway.log_level.get().unwrap();
        change(LogLevel::new("debug")).unwrap();
        assert_eq!(rig.log_control.level(), Some(LevelFilter::DEBUG));

        let err = change(LogLevel::new("verbose")).unwrap_err();
        assert_eq!(
            err,
            HandlerError::UnsupportedLevel {
                level: "verbose".into()
            }
        );
        assert_eq!(rig.log_control.level(), Some(LevelFilter::DEBUG));

        agent.stop();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_restart_request_ends_run() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let restart = rig.gateway.restart.get().unwrap();
        restart().unwrap();

        let err = run.await.unwrap().unwrap_err();
        assert!(matches!(err, AgentError::RestartRequested { exit_code: 10 }));
        assert_eq!(err.exit_code(), 10);
        assert!(rig.gateway.cancelled());
        for source in rig.sources() {
            assert!(source.cancelled());
        }
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        let err = agent.start().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::AlreadyStarted {
                state: AgentState::Running
            }
        ));

        agent.stop();
        run.await.unwrap().unwrap();
        assert!(matches!(
            agent.start().await,
            Err(AgentError::AlreadyStarted {
                state: AgentState::Stopped
            })
        ));
    }

    #[tokio::test]
    async fn test_stop_sources_keeps_gateway_running() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        assert!(agent.stop_sources());
        assert!(!agent.stop_sources());
        tokio::time::timeout(Duration::from_secs(5), async {
            while !rig.sources().iter().all(|s| s.cancelled()) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(!rig.gateway.cancelled());
        assert_eq!(agent.scope_state(ScopeKind::Sinks), ScopeState::Running);
        assert_eq!(agent.scope_state(ScopeKind::All), ScopeState::Running);
        assert!(!run.is_finished());

        agent.stop();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_stop_sinks_is_isolated() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let sinks = agent.sinks_token();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;

        assert!(agent.stop_sinks());
        assert!(sinks.is_cancelled());
        assert_eq!(agent.scope_state(ScopeKind::Sources), ScopeState::Running);
        assert_eq!(agent.scope_state(ScopeKind::Sinks), ScopeState::Stopped);

        agent.stop();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_component_panic_is_reported() {
        let mut rig = Rig::new(GatewayMode::AuthorizeOnStart);
        rig.auditor = Arc::new(SpyComponent::new(Behavior::Panic("auditor bug")));
        let agent = rig.build();

        let err = agent.start().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::ComponentPanicked { component: "auditor", ref info } if info == "auditor bug"
        ));
        assert!(rig.entities.cancelled());
    }

    #[tokio::test]
    async fn test_stop_during_authorization() {
        let rig = Rig::new(GatewayMode::Silent);
        let agent = rig.build();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::AuthorizingGateway).await;

        agent.stop();
        assert!(run.await.unwrap().is_ok());
        assert_eq!(agent.state(), AgentState::Stopped);
        for source in rig.sources() {
            assert!(!source.started());
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_during_authorization() {
        let rig = Rig::new(GatewayMode::FailOnStart("handshake refused"));
        let agent = rig.build();

        let err = agent.start().await.unwrap_err();
        assert!(matches!(err, AgentError::Component { component: "gateway", .. }));
        for source in rig.sources() {
            assert!(!source.started());
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_right_after_authorization_launches_nothing() {
        for _ in 0..50 {
            let rig = Rig::new(GatewayMode::AuthorizeThenFail("stream reset"));
            let agent = rig.build();

            let err = agent.start().await.unwrap_err();
            assert!(matches!(err, AgentError::Component { component: "gateway", .. }));
            for source in rig.sources() {
                assert!(!source.started());
            }
            assert_eq!(agent.state(), AgentState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_events_follow_lifecycle_order() {
        let rig = Rig::new(GatewayMode::AuthorizeOnStart);
        let agent = rig.build();
        let mut rx = agent.subscribe();
        let run = spawn_start(&agent);
        wait_for_state(&agent, AgentState::Running).await;
        agent.stop();
        run.await.unwrap().unwrap();

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            let done = ev.is_terminal();
            kinds.push((ev.kind, ev.state, ev.component.as_deref().map(str::to_owned)));
            if done {
                break;
            }
        }

        let pos = |kind: EventKind, component: Option<&str>| {
            kinds
                .iter()
                .position(|(k, _, c)| *k == kind && c.as_deref() == component)
                .unwrap()
        };
        let granted = pos(EventKind::AuthorizationGranted, None);
        assert!(pos(EventKind::ComponentStarting, Some("gateway")) < granted);
        assert!(granted < pos(EventKind::ComponentStarting, Some("entities")));
        assert!(granted < pos(EventKind::ComponentStarting, Some("auditor")));

        let states: Vec<_> = kinds.iter().filter_map(|(_, s, _)| *s).collect();
        assert_eq!(
            states,
            vec![
                AgentState::Wired,
                AgentState::AuthorizingGateway,
                AgentState::Running,
                AgentState::Stopping,
                AgentState::Stopped,
            ]
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_the_whole_run() {
        #[derive(Default)]
        struct Collect(Mutex<Vec<EventKind>>);

        #[async_trait]
        impl Subscribe for Collect {
            async fn on_event(&self, event: &Event) {
                self.0.lock().unwrap().push(event.kind);
            }
        }

        let rig = Rig::new(GatewayMode::RejectOnStart("no"));
        let collect = Arc::new(Collect::default());
        let agent = Agent::builder(rig.cfg())
            .with_gateway(rig.gateway.clone())
            .with_entities(rig.entities.clone())
            .with_auditor(rig.auditor.clone())
            .with_metrics(rig.metrics.clone())
            .with_automation(rig.automation.clone())
            .with_subscribers(vec![collect.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();

        assert!(agent.start().await.is_err());

        let seen = collect.0.lock().unwrap();
        assert!(seen.contains(&EventKind::AuthorizationFailed));
        assert_eq!(seen.last(), Some(&EventKind::StateChanged));
    }

    #[test]
    fn test_exit_uses_hook() {
        let rig = Rig::new(GatewayMode::Silent);
        let code = Arc::new(AtomicI32::new(-1));
        let seen = Arc::clone(&code);
        let agent = Agent::builder(rig.cfg())
            .with_gateway(rig.gateway.clone())
            .with_entities(rig.entities.clone())
            .with_auditor(rig.auditor.clone())
            .with_metrics(rig.metrics.clone())
            .with_automation(rig.automation.clone())
            .with_exit_hook(Arc::new(move |c| seen.store(c, Ordering::SeqCst)))
            .build()
            .unwrap();

        agent.exit(10);
        assert_eq!(code.load(Ordering::SeqCst), 10);
        assert_eq!(agent.state(), AgentState::Created);
    }
}
