//! Handlers the agent itself answers: restart and log-level change.
//!
//! Both capture only cloned handles (scopes, termination slot, bus, log
//! control), never the agent.

use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::core::exit::Termination;
use crate::core::scope::{ScopeKind, Scopes};
use crate::events::{Bus, Event, EventKind};
use crate::handlers::{ChangeLogLevelHandler, RestartHandler};
use crate::logging::LogControl;
use crate::model::LogLevel;

/// Records a termination with `exit_code`, then stops sources and the root.
///
/// Repeated requests keep the first recorded termination.
pub(crate) fn restart_handler(
    scopes: Arc<Scopes>,
    termination: Arc<OnceLock<Termination>>,
    exit_code: i32,
    bus: Bus,
) -> RestartHandler {
    Arc::new(move || {
        if termination.set(Termination { exit_code }).is_ok() {
            bus.publish(Event::new(EventKind::RestartRequested).with_reason(exit_code.to_string()));
        } else {
            debug!("restart already requested");
        }
        scopes.stop(ScopeKind::Sources);
        scopes.stop(ScopeKind::All);
        Ok(())
    })
}

pub(crate) fn log_level_handler(control: LogControl, bus: Bus) -> ChangeLogLevelHandler {
    Arc::new(move |level: LogLevel| {
        let filter = control.apply(&level).inspect_err(|err| {
            warn!(requested = %level.level, error = %err, "log level change refused");
        })?;
        bus.publish(Event::new(EventKind::LogLevelChanged).with_reason(filter.to_string()));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;
    use crate::error::HandlerError;

    #[tokio::test]
    async fn test_restart_records_first_termination_and_stops() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let scopes = Arc::new(Scopes::new(bus.clone()));
        scopes.arm();
        let termination = Arc::new(OnceLock::new());

        let handler = restart_handler(Arc::clone(&scopes), Arc::clone(&termination), 10, bus);
        assert!(handler().is_ok());
        assert!(handler().is_ok());

        assert_eq!(termination.get(), Some(&Termination { exit_code: 10 }));
        assert!(scopes.token(ScopeKind::All).is_cancelled());

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::RestartRequested);
        let sources = rx.recv().await.unwrap();
        assert_eq!(sources.kind, EventKind::ScopeCancelled);
        assert_eq!(sources.reason.as_deref(), Some("sources"));
        assert_eq!(rx.recv().await.unwrap().reason.as_deref(), Some("all"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_log_level_change_publishes_only_on_success() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let control = LogControl::detached(LevelFilter::INFO);
        let handler = log_level_handler(control.clone(), bus);

        assert!(handler(LogLevel::new("debug")).is_ok());
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::LogLevelChanged);
        assert_eq!(ev.reason.as_deref(), Some(LevelFilter::DEBUG.to_string().as_str()));

        let err = handler(LogLevel::new("verbose")).unwrap_err();
        assert!(matches!(err, HandlerError::UnsupportedLevel { .. }));
        assert_eq!(control.level(), Some(LevelFilter::DEBUG));
        assert!(rx.try_recv().is_err());
    }
}
