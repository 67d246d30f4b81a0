use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use super::agent::Agent;
use super::config::AgentConfig;
use super::exit::{ExitHook, process_exit_hook};
use super::lifecycle::Lifecycle;
use super::scope::Scopes;
use crate::components::{
    Auditor, AutomationExecutor, Components, EntitiesSource, Gateway, MetricsSource, Role,
};
use crate::error::AgentError;
use crate::events::Bus;
use crate::logging::LogControl;
use crate::subscribers::Subscribe;

/// Builder for constructing an [`Agent`] from its collaborators.
pub struct AgentBuilder {
    cfg: AgentConfig,
    gateway: Option<Arc<dyn Gateway>>,
    entities: Option<Arc<dyn EntitiesSource>>,
    auditor: Option<Arc<dyn Auditor>>,
    metrics: Option<Arc<dyn MetricsSource>>,
    automation: Option<Arc<dyn AutomationExecutor>>,
    log_control: Option<LogControl>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    exit_hook: Option<ExitHook>,
}

impl AgentBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: AgentConfig) -> Self {
        Self {
            cfg,
            gateway: None,
            entities: None,
            auditor: None,
            metrics: None,
            automation: None,
            log_control: None,
            subscribers: Vec::new(),
            exit_hook: None,
        }
    }

    /// Sets the control-plane transport. Required.
    pub fn with_gateway(mut self, gateway: Arc<dyn Gateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Sets the entities watcher. Required.
    pub fn with_entities(mut self, entities: Arc<dyn EntitiesSource>) -> Self {
        self.entities = Some(entities);
        self
    }

    /// Sets the policy auditor. Required.
    pub fn with_auditor(mut self, auditor: Arc<dyn Auditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    /// Sets the metrics source. Required iff `enable_metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSource>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the automation executor. Required iff `enable_automation`.
    pub fn with_automation(mut self, automation: Arc<dyn AutomationExecutor>) -> Self {
        self.automation = Some(automation);
        self
    }

    /// Sets the log sink the log-level handler reconfigures.
    ///
    /// Defaults to a detached sink at `INFO`, which validates and records
    /// level changes without affecting process output.
    pub fn with_log_control(mut self, control: LogControl) -> Self {
        self.log_control = Some(control);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with
    /// bounded queues, for the duration of `Agent::start`.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the hook `Agent::exit` uses (default: `std::process::exit`).
    pub fn with_exit_hook(mut self, hook: ExitHook) -> Self {
        self.exit_hook = Some(hook);
        self
    }

    /// Validates the collaborator set and builds the agent.
    ///
    /// Components supplied for a disabled feature are dropped, so they are
    /// neither wired nor started.
    pub fn build(self) -> Result<Agent, AgentError> {
        let gateway = require(self.gateway, Role::Gateway)?;
        let entities = require(self.entities, Role::Entities)?;
        let auditor = require(self.auditor, Role::Auditor)?;
        let metrics = optional(self.metrics, self.cfg.enable_metrics, Role::Metrics)?;
        let automation = optional(self.automation, self.cfg.enable_automation, Role::Automation)?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let scopes = Arc::new(Scopes::new(bus.clone()));
        let lifecycle = Lifecycle::new(bus.clone());

        Ok(Agent {
            cfg: self.cfg,
            components: Components {
                gateway,
                entities,
                auditor,
                metrics,
                automation,
            },
            log_control: self
                .log_control
                .unwrap_or_else(|| LogControl::detached(LevelFilter::INFO)),
            scopes,
            lifecycle,
            termination: Arc::new(OnceLock::new()),
            bus,
            subscribers: Mutex::new(self.subscribers),
            exit_hook: self.exit_hook.unwrap_or_else(process_exit_hook),
        })
    }
}

fn require<T: ?Sized>(component: Option<Arc<T>>, role: Role) -> Result<Arc<T>, AgentError> {
    component.ok_or(AgentError::MissingComponent {
        component: role.as_str(),
    })
}

fn optional<T: ?Sized>(
    component: Option<Arc<T>>,
    enabled: bool,
    role: Role,
) -> Result<Option<Arc<T>>, AgentError> {
    match (enabled, component) {
        (true, Some(c)) => Ok(Some(c)),
        (true, None) => Err(AgentError::MissingComponent {
            component: role.as_str(),
        }),
        (false, Some(_)) => {
            debug!(component = role.as_str(), "component disabled, dropping it");
            Ok(None)
        }
        (false, None) => Ok(None),
    }
}
