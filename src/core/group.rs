//! # Component group: one task per component, first error wins.
//!
//! ```text
//!   spawn(role, component, token) ──► JoinSet task ──► component.start(token)
//!                                          │
//!                          Ok / Canceled ──┼──► ComponentStopped
//!                          Err / panic   ──┴──► ComponentFailed
//!                                                 │
//!                                   first_error.set(err)
//!                                     ├─ won  → scopes.stop(All)
//!                                     └─ lost → suppressed (debug log)
//!
//!   wait() ── join all ──► first recorded error, or Ok(())
//! ```
//!
//! Panics are caught per task and recorded like any other failure.

use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::components::{Component, Role};
use crate::core::scope::{ScopeKind, Scopes};
use crate::error::{AgentError, ComponentError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::panic_message;

pub(crate) struct ComponentGroup {
    set: JoinSet<()>,
    first_error: Arc<OnceLock<AgentError>>,
    scopes: Arc<Scopes>,
    bus: Bus,
}

impl ComponentGroup {
    pub fn new(scopes: Arc<Scopes>, bus: Bus) -> Self {
        Self {
            set: JoinSet::new(),
            first_error: Arc::new(OnceLock::new()),
            scopes,
            bus,
        }
    }

    /// Launches `component` under `ctx`.
    pub fn spawn<C>(&mut self, role: Role, component: Arc<C>, ctx: CancellationToken)
    where
        C: Component + ?Sized,
    {
        let first_error = Arc::clone(&self.first_error);
        let scopes = Arc::clone(&self.scopes);
        let bus = self.bus.clone();

        self.bus
            .publish(Event::new(EventKind::ComponentStarting).with_component(role.as_str()));

        self.set.spawn(async move {
            let outcome = std::panic::AssertUnwindSafe(component.start(ctx))
                .catch_unwind()
                .await;

            let failure = match outcome {
                Ok(Ok(())) | Ok(Err(ComponentError::Canceled)) => None,
                Ok(Err(source)) => Some(AgentError::Component {
                    component: role.as_str(),
                    source,
                }),
                Err(payload) => Some(AgentError::ComponentPanicked {
                    component: role.as_str(),
                    info: panic_message(&*payload),
                }),
            };

            let Some(err) = failure else {
                bus.publish(Event::new(EventKind::ComponentStopped).with_component(role.as_str()));
                return;
            };

            bus.publish(
                Event::new(EventKind::ComponentFailed)
                    .with_component(role.as_str())
                    .with_reason(err.to_string()),
            );
            match first_error.set(err) {
                Ok(()) => {
                    debug!(component = role.as_str(), "first failure recorded, stopping agent");
                    scopes.stop(ScopeKind::All);
                }
                Err(suppressed) => {
                    debug!(component = role.as_str(), error = %suppressed, "later failure suppressed");
                }
            }
        });
    }

    /// Joins every task and returns the first recorded failure.
    pub async fn wait(mut self) -> Result<(), AgentError> {
        while let Some(joined) = self.set.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "component task aborted");
            }
        }
        match self.first_error.get() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
