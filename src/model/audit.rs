use serde::{Deserialize, Serialize};

use super::EntityRef;

/// Request to evaluate cluster entities against constraints.
///
/// An empty `constraint_ids` means "all known constraints".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCommand {
    pub id: String,
    #[serde(default)]
    pub constraint_ids: Vec<String>,
}

/// A policy rule the auditor evaluates entities against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub severity: String,
    /// Template-specific parameters, passed through untouched.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Evaluation verdict for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Compliant,
    Violation,
    Error,
}

/// Result of evaluating one constraint against one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub constraint_id: String,
    pub entity: EntityRef,
    pub status: AuditStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
