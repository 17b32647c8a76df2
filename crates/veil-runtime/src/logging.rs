#![forbid(unsafe_code)]

//! Process-wide `tracing` subscriber setup.
//!
//! Library code only emits events; binaries and tests that want to see them
//! call [`init`] once. The filter is read from the `VEIL_LOG` environment
//! variable (same syntax as `RUST_LOG`) and falls back to [`DEFAULT_FILTER`].

use std::fmt;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

/// Environment variable consulted for the filter directives.
pub const LOG_ENV: &str = "VEIL_LOG";

/// Directives used when `VEIL_LOG` is unset or empty.
pub const DEFAULT_FILTER: &str = "warn";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug)]
pub enum LoggingError {
    /// `VEIL_LOG` held directives that failed to parse.
    InvalidFilter(String),
    /// A global subscriber was already installed.
    AlreadyInitialized,
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFilter(msg) => write!(f, "invalid {LOG_ENV} directives: {msg}"),
            Self::AlreadyInitialized => f.write_str("a global tracing subscriber is already set"),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Build the filter from `VEIL_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> Result<EnvFilter, LoggingError> {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .map_err(|err| LoggingError::InvalidFilter(err.to_string())),
        _ => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber.
pub fn init(format: LogFormat) -> Result<(), LoggingError> {
    let filter = env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry.with(tfmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(tfmt::layer().json().with_current_span(true))
            .try_init(),
    };
    result.map_err(|_| LoggingError::AlreadyInitialized)
}
