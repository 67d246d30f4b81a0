use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Group/version/resource/kind of a Kubernetes object type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Gvrk {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub kind: String,
}

impl fmt::Display for Gvrk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.resource)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.resource)
        }
    }
}

/// Reference to one cluster entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    /// Empty for cluster-scoped entities.
    #[serde(default)]
    pub namespace: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaKind {
    /// Added or updated.
    Upsert,
    Delete,
}

/// Incremental change of one entity since the last report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub kind: DeltaKind,
    pub gvrk: Gvrk,
    /// The object as observed (for deletes, its last known state).
    pub data: serde_json::Value,
    pub timestamp: SystemTime,
}

/// Full snapshot of entity state, keyed by the rendered [`Gvrk`] of each type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitiesResync {
    pub timestamp: SystemTime,
    pub snapshot: BTreeMap<String, Vec<serde_json::Value>>,
}

impl EntitiesResync {
    /// Total number of entities across all types.
    pub fn len(&self) -> usize {
        self.snapshot.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
