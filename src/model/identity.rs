use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identity of one running agent.
///
/// Supplied at construction and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Account the cluster belongs to.
    pub account_id: Uuid,
    /// Cluster this agent runs in.
    pub cluster_id: Uuid,
    /// This agent process.
    pub agent_id: Uuid,
}

impl AgentIdentity {
    /// Creates an identity with a freshly generated (v4) agent id.
    pub fn new(account_id: Uuid, cluster_id: Uuid) -> Self {
        Self {
            account_id,
            cluster_id,
            agent_id: Uuid::new_v4(),
        }
    }

    /// Replaces the generated agent id with a known one.
    #[must_use]
    pub fn with_agent_id(mut self, agent_id: Uuid) -> Self {
        self.agent_id = agent_id;
        self
    }
}
