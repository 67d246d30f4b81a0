//! # Process-wide log sink with a reloadable level.
//!
//! [`init`] installs the global `tracing` subscriber:
//!
//! ```text
//! registry()
//!   └── reload::Layer<LevelFilter>   ◄── LogControl::apply (log-level handler)
//!         └── fmt::layer()
//! ```
//!
//! The returned [`LogControl`] is handed to the agent builder; the control
//! plane's "change log level" command reconfigures the filter in place without
//! reinstalling anything.

use std::fmt;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, fmt as tfmt, reload};

use crate::error::{AgentError, HandlerError};
use crate::model::LogLevel;

/// Handle to the reloadable level filter of a log sink.
///
/// Cheap to clone; every clone controls the same filter.
#[derive(Clone)]
pub struct LogControl {
    handle: reload::Handle<LevelFilter, Registry>,
    // Keeps a detached sink alive; the handle only holds a weak reference.
    _sink: Option<Arc<dyn Subscriber + Send + Sync>>,
}

impl LogControl {
    /// Builds a sink that is not installed as the global default.
    ///
    /// Useful for embedding and tests: level changes are tracked and validated
    /// but nothing is printed.
    pub fn detached(initial: LevelFilter) -> Self {
        let (filter, handle) = reload::Layer::new(initial);
        let sink = tracing_subscriber::registry().with(filter);
        Self {
            handle,
            _sink: Some(Arc::new(sink)),
        }
    }

    /// Currently active level, or `None` if the sink is gone.
    pub fn level(&self) -> Option<LevelFilter> {
        self.handle.clone_current()
    }

    /// Switches the sink to `level`.
    ///
    /// The name is resolved before anything is touched, so an unsupported
    /// name leaves the active level unchanged.
    pub fn apply(&self, level: &LogLevel) -> Result<LevelFilter, HandlerError> {
        let filter = level.resolve()?;
        self.handle
            .modify(|current| *current = filter)
            .map_err(|_| HandlerError::LoggingUnavailable)?;
        Ok(filter)
    }
}

impl fmt::Debug for LogControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogControl")
            .field("level", &self.level())
            .field("detached", &self._sink.is_some())
            .finish()
    }
}

/// Installs the global subscriber at `level` and returns its control handle.
///
/// Fails if the level name is unsupported or a global subscriber is already set.
pub fn init(level: &LogLevel) -> Result<LogControl, AgentError> {
    let initial = level.resolve().map_err(|e| AgentError::Logging {
        error: e.to_string(),
    })?;
    let (filter, handle) = reload::Layer::new(initial);

    tracing_subscriber::registry()
        .with(filter)
        .with(tfmt::layer().with_target(false))
        .try_init()
        .map_err(|e| AgentError::Logging {
            error: e.to_string(),
        })?;

    Ok(LogControl {
        handle,
        _sink: None,
    })
}
