//! # Requested log level.
//!
//! The gateway sends level names as free text. [`LogLevel::resolve`] maps a
//! name onto a tracing [`LevelFilter`]; unknown names are rejected with
//! [`HandlerError::UnsupportedLevel`] so the caller can refuse the change
//! without touching the active configuration.
//!
//! | Name                 | Filter             |
//! |----------------------|--------------------|
//! | `trace`              | `LevelFilter::TRACE` |
//! | `debug`              | `LevelFilter::DEBUG` |
//! | `info`               | `LevelFilter::INFO`  |
//! | `warn`, `warning`    | `LevelFilter::WARN`  |
//! | `error`              | `LevelFilter::ERROR` |

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::HandlerError;

/// A log level name as requested by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLevel {
    /// Level name (case-insensitive).
    pub level: String,
}

impl LogLevel {
    /// Wraps a level name.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
        }
    }

    /// Resolves the name to a tracing filter.
    ///
    /// Leading/trailing whitespace is ignored and matching is ASCII
    /// case-insensitive.
    pub fn resolve(&self) -> Result<LevelFilter, HandlerError> {
        let name = self.level.trim().to_ascii_lowercase();
        match name.as_str() {
            "trace" => Ok(LevelFilter::TRACE),
            "debug" => Ok(LevelFilter::DEBUG),
            "info" => Ok(LevelFilter::INFO),
            "warn" | "warning" => Ok(LevelFilter::WARN),
            "error" => Ok(LevelFilter::ERROR),
            _ => Err(HandlerError::UnsupportedLevel {
                level: self.level.clone(),
            }),
        }
    }
}

impl From<&str> for LogLevel {
    fn from(level: &str) -> Self {
        Self::new(level)
    }
}
