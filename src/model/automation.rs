use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A remediation command received from the control plane.
///
/// `action` is interpreted by the automation executor (e.g. `scale`,
/// `restart`); `target` addresses the workload as `kind/namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automation {
    /// Control-plane id, echoed back in [`AutomationFeedback::id`].
    pub id: String,
    /// Requested action.
    pub action: String,
    /// Workload the action applies to.
    pub target: String,
    /// Action-specific arguments (replicas, container name, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl Automation {
    /// Creates a command without parameters.
    pub fn new(id: impl Into<String>, action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            target: target.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds one parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Execution state reported back for an [`Automation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationStatus {
    /// Accepted, not yet executed.
    Pending,
    /// Executed successfully.
    Applied,
    /// Execution failed; see [`AutomationFeedback::message`].
    Failed,
}

/// Outcome of an automation, produced by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationFeedback {
    /// Id of the originating [`Automation`].
    pub id: String,
    /// Current status.
    pub status: AutomationStatus,
    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AutomationFeedback {
    /// Creates feedback without a message.
    pub fn new(id: impl Into<String>, status: AutomationStatus) -> Self {
        Self {
            id: id.into(),
            status,
            message: None,
        }
    }

    /// Attaches a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
