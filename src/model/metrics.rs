use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::EntityRef;

/// One metric sample for an entity (optionally a single container of it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name, e.g. `container/cpu/usage`.
    pub name: String,
    pub entity: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub value: i64,
    pub timestamp: SystemTime,
}
