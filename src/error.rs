//! Error types used by the agent supervisor, its collaborators and handlers.
//!
//! This module defines four error enums, one per failure domain:
//!
//! - [`AgentError`] - errors surfaced by [`Agent::start`](crate::Agent::start) and the builder.
//! - [`AuthorizationError`] - the gateway authorization gate did not open.
//! - [`ComponentError`] - a long-running component task returned a failure.
//! - [`HandlerError`] - a single callback invocation failed; local to that event.
//!
//! Every type provides `as_label` (stable snake_case label for logs/metrics).

use std::time::Duration;
use thiserror::Error;

use crate::core::AgentState;

/// Exit status used when an error does not carry its own hint.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// # Errors produced by the agent supervisor.
///
/// Any of these returned from [`Agent::start`](crate::Agent::start) is terminal for
/// the agent instance; the process boundary is expected to log it and exit with
/// [`AgentError::exit_code`].
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The gateway never authorized the agent; nothing but the gateway was launched.
    #[error("gateway authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    /// The first component task that failed. Later failures are suppressed.
    #[error("component '{component}' failed: {source}")]
    Component {
        /// Role of the failed component (e.g. "gateway", "entities").
        component: &'static str,
        /// The error returned by the component.
        #[source]
        source: ComponentError,
    },

    /// A component task panicked.
    #[error("component '{component}' panicked: {info}")]
    ComponentPanicked {
        /// Role of the panicked component.
        component: &'static str,
        /// Panic payload rendered as text.
        info: String,
    },

    /// `start` was called on an agent that already left [`AgentState::Created`].
    #[error("agent already started (state: {state:?})")]
    AlreadyStarted {
        /// State observed when the second start was attempted.
        state: AgentState,
    },

    /// A component was enabled in the configuration but never supplied.
    #[error("component '{component}' is enabled but was not provided")]
    MissingComponent {
        /// Role of the missing component.
        component: &'static str,
    },

    /// The gateway asked the agent to restart; the process should exit with `exit_code`.
    #[error("restart requested (exit code {exit_code})")]
    RestartRequested {
        /// Status understood by the process manager as "relaunch me".
        exit_code: i32,
    },

    /// The process-wide logging sink could not be installed.
    #[error("logging setup failed: {error}")]
    Logging {
        /// The underlying error message.
        error: String,
    },
}

impl AgentError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cluster_agent::AgentError;
    ///
    /// let err = AgentError::RestartRequested { exit_code: 10 };
    /// assert_eq!(err.as_label(), "agent_restart_requested");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AgentError::Authorization(_) => "agent_unauthorized",
            AgentError::Component { .. } => "agent_component_failed",
            AgentError::ComponentPanicked { .. } => "agent_component_panicked",
            AgentError::AlreadyStarted { .. } => "agent_already_started",
            AgentError::MissingComponent { .. } => "agent_missing_component",
            AgentError::RestartRequested { .. } => "agent_restart_requested",
            AgentError::Logging { .. } => "agent_logging_failed",
        }
    }

    /// Process exit status the outer boundary should use for this error.
    ///
    /// Restart requests carry their own code; everything else maps to
    /// [`FAILURE_EXIT_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            AgentError::RestartRequested { exit_code } => *exit_code,
            _ => FAILURE_EXIT_CODE,
        }
    }
}

/// # Errors produced by the gateway authorization gate.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No authorization signal arrived within the timeout.
    #[error("authorization timed out after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The control plane explicitly rejected the agent.
    #[error("authorization rejected: {reason}")]
    Rejected {
        /// Rejection reason reported by the gateway.
        reason: String,
    },
}

impl AuthorizationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AuthorizationError::Timeout { .. } => "authorization_timeout",
            AuthorizationError::Rejected { .. } => "authorization_rejected",
        }
    }
}

/// # Errors produced by component tasks.
///
/// Returned from [`Component::start`](crate::Component::start). `Canceled` is the
/// graceful reaction to cancellation and is never reported as a failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// Component stopped because of an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error (misconfiguration, lost credentials, ...).
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Component observed cancellation of its token.
    #[error("context cancelled")]
    Canceled,
}

impl ComponentError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cluster_agent::ComponentError;
    ///
    /// let err = ComponentError::Fail { error: "watch closed".into() };
    /// assert_eq!(err.as_label(), "component_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Fail { .. } => "component_failed",
            ComponentError::Fatal { .. } => "component_fatal",
            ComponentError::Canceled => "component_canceled",
        }
    }

    /// True for the graceful cancellation outcome.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ComponentError::Canceled)
    }
}

/// # Errors returned by a single handler invocation.
///
/// Handler failures stay local to the event: they are returned to the
/// collaborator that invoked the callback and never cancel the run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Log level name is not one of the recognized levels.
    #[error("unsupported log level '{level}'")]
    UnsupportedLevel {
        /// The rejected level name.
        level: String,
    },

    /// The receiving collaborator refused the payload (malformed, unknown id, ...).
    #[error("rejected: {reason}")]
    Rejected {
        /// Why the payload was refused.
        reason: String,
    },

    /// The gateway failed to hand the payload to its transport.
    #[error("transport error: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// The reloadable logging sink is gone (its subscriber was dropped).
    #[error("logging sink unavailable")]
    LoggingUnavailable,
}

impl HandlerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::UnsupportedLevel { .. } => "handler_unsupported_level",
            HandlerError::Rejected { .. } => "handler_rejected",
            HandlerError::Transport { .. } => "handler_transport",
            HandlerError::LoggingUnavailable => "handler_logging_unavailable",
        }
    }
}
