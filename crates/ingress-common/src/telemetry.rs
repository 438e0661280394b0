//! Logging initialization
//!
//! Structured logging through a `tracing-subscriber` registry. The filter
//! honors `RUST_LOG` and otherwise falls back to [`DEFAULT_FILTER`].

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,nginx_ingress=debug,kube=info,tower=warn,hyper=warn";

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON lines with span context
    #[default]
    Json,
    /// Human-readable single-line output
    Plain,
}

/// Build the env filter, falling back to [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global tracing subscriber
///
/// Returns an error if a subscriber was already installed.
pub fn init_logging(format: LogFormat) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init(),
    };
    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_json() {
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_second_init_fails() {
        // Whichever call installs the subscriber first, the next one must fail.
        let _ = init_logging(LogFormat::Plain);
        let err = init_logging(LogFormat::Json).unwrap_err();
        assert!(err.to_string().contains("tracing subscriber"));
    }
}
