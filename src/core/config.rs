//! # Agent configuration.
//!
//! [`AgentConfig`] collects the settings fixed for the lifetime of one agent.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`AgentConfig::bus_capacity_clamped`]
//! - `authorization_timeout = 0s` → authorization fails immediately unless the
//!   gateway is already authorized

use std::time::Duration;

use crate::core::exit::RESTART_EXIT_CODE;
use crate::model::AgentIdentity;

/// Default authorization timeout (2 hours).
pub const DEFAULT_AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Default event bus capacity.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Configuration of one agent instance.
///
/// ## Field semantics
/// - `identity`: account/cluster/agent ids, reported by the gateway
/// - `enable_metrics`: launch and wire the metrics source
/// - `enable_automation`: launch and wire the automation executor
/// - `authorization_timeout`: how long `start` waits for the gateway's authorization
/// - `restart_exit_code`: status carried by `AgentError::RestartRequested`
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// All fields are public; the enablement flags must not change once the
/// agent is built, since they decide both wiring and launch.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Who this agent is.
    pub identity: AgentIdentity,

    /// Whether the metrics source runs.
    pub enable_metrics: bool,

    /// Whether the automation executor runs.
    pub enable_automation: bool,

    /// Maximum wait for the gateway authorization gate.
    pub authorization_timeout: Duration,

    /// Exit status requested by the restart handler.
    pub restart_exit_code: i32,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Subscribers lagging more than this many events skip the oldest ones.
    pub bus_capacity: usize,
}

impl AgentConfig {
    /// Default configuration for `identity`:
    ///
    /// - `enable_metrics = true`
    /// - `enable_automation = true`
    /// - `authorization_timeout = 2h`
    /// - `restart_exit_code = 10`
    /// - `bus_capacity = 1024`
    pub fn new(identity: AgentIdentity) -> Self {
        Self {
            identity,
            enable_metrics: true,
            enable_automation: true,
            authorization_timeout: DEFAULT_AUTHORIZATION_TIMEOUT,
            restart_exit_code: RESTART_EXIT_CODE,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}
