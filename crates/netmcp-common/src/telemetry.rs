//! Structured telemetry initialisation for tool servers.
//!
//! Logs go to stderr; stdout belongs to the tool protocol.

use std::env;
use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, info, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use netmcp_config::{LogFormat, LogFormatParseError, default_log_filter, default_log_format};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Environment variable holding the log format (`compact` or `json`).
pub const LOG_FORMAT_ENV: &str = "MCP_LOG_FORMAT";

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// The log format variable holds an unknown format.
    #[error("invalid log format '{value}': {source}")]
    Format {
        /// Raw variable value.
        value: String,
        /// Parser error.
        #[source]
        source: LogFormatParseError,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Logging settings for one tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    service: String,
    filter: String,
    format: LogFormat,
}

impl TelemetryConfig {
    /// Default settings for the named service.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            filter: default_log_filter().to_owned(),
            format: default_log_format(),
        }
    }

    /// Settings from `RUST_LOG` and [`LOG_FORMAT_ENV`], with defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Format`] when the format variable holds an
    /// unknown format.
    pub fn from_env(service: impl Into<String>) -> Result<Self, TelemetryError> {
        let mut config = Self::new(service);
        if let Ok(filter) = env::var(EnvFilter::DEFAULT_ENV) {
            config.filter = filter;
        }
        if let Ok(value) = env::var(LOG_FORMAT_ENV) {
            config.format = value
                .parse()
                .map_err(|source| TelemetryError::Format { value, source })?;
        }
        Ok(config)
    }

    /// Replaces the filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Replaces the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Service name recorded at start-up.
    #[must_use]
    pub const fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Filter expression.
    #[must_use]
    pub const fn filter(&self) -> &str {
        self.filter.as_str()
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and later invocations return a fresh [`TelemetryHandle`]
/// without touching the global state again.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse or another
/// subscriber is already installed.
///
/// # Examples
///
/// ```rust
/// use netmcp_common::telemetry::{self, TelemetryConfig};
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let config = TelemetryConfig::new("fortigate-mcp");
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// drop((first, second));
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &TelemetryConfig) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| TelemetryHandle)
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter(error.to_string()))
}

fn install_subscriber(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.filter())?;

    let builder = |env_filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;
    info!(service = config.service(), format = %config.format(), "telemetry initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn new_config_uses_defaults() {
        let config = TelemetryConfig::new("ios-mcp");
        assert_eq!(config.service(), "ios-mcp");
        assert_eq!(config.filter(), "info");
        assert_eq!(config.format(), LogFormat::Compact);
    }

    #[rstest]
    #[case::level("debug")]
    #[case::directives("info,netmcp_common::failure=debug")]
    fn accepts_filter_expressions(#[case] expression: &str) {
        assert!(parse_filter(expression).is_ok());
    }

    #[test]
    fn rejects_unknown_level() {
        let error = parse_filter("netmcp_common=loud").expect_err("unknown level");
        assert!(error.to_string().starts_with("invalid log filter"));
    }

    #[test]
    fn initialise_is_idempotent() {
        let config = TelemetryConfig::new("ios-mcp").with_format(LogFormat::Json);
        assert!(initialise(&config).is_ok());
        assert!(initialise(&config.with_filter("debug")).is_ok());
    }
}
