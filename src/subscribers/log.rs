//! # LogWriter: renders agent events through `tracing`.
//!
//! Failures are logged at `warn`/`error`, lifecycle at `info`, the rest at `debug`.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO  agent state changed state=AuthorizingGateway
//! INFO  gateway authorized
//! INFO  component starting component="entities"
//! ERROR component failed component="metrics" reason="kubelet unreachable"
//! INFO  scope cancelled scope="all"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::StateChanged => {
                info!(state = ?e.state, seq = e.seq, "agent state changed");
            }
            EventKind::ScopeCancelled => {
                info!(scope = reason, "scope cancelled");
            }
            EventKind::AuthorizationRequested => {
                info!(timeout_ms = ?e.timeout_ms, "waiting for gateway authorization");
            }
            EventKind::AuthorizationGranted => {
                info!("gateway authorized");
            }
            EventKind::AuthorizationFailed => {
                error!(reason, "gateway authorization failed");
            }
            EventKind::ComponentStarting => {
                info!(component, "component starting");
            }
            EventKind::ComponentStopped => {
                debug!(component, "component stopped");
            }
            EventKind::ComponentFailed => {
                error!(component, reason, "component failed");
            }
            EventKind::RestartRequested => {
                warn!(exit_code = reason, "restart requested by control plane");
            }
            EventKind::LogLevelChanged => {
                info!(level = reason, "log level changed");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = component, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(subscriber = component, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
