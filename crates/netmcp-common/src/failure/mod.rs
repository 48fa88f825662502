//! Translation of tool failures into error envelopes.
//!
//! Tool bodies return `Result<String, ToolError>`. The wrappers in this
//! module await them and always hand back an envelope string: successes pass
//! through untouched, expected transport failures become short prefixed
//! messages, and everything else is logged with its full diagnostic before
//! being reported by message only.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::future::Future;

use thiserror::Error;
use tracing::error;

use netmcp_config::InventoryError;
use netmcp_policy::Rejection;

use crate::envelope::error_response;
use crate::transport::cli::SessionError;
use crate::transport::http::HttpClientError;

const FAILURE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::failure");

/// Boxed error carried by [`ToolError::Other`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of failures a tool body can report.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Credentials were refused by the device.
    #[error("{0}")]
    Authentication(String),
    /// The device could not be reached or dropped the connection.
    #[error("{0}")]
    Connection(String),
    /// A connect, handshake, or command deadline elapsed.
    #[error("{0}")]
    Timeout(String),
    /// The device answered an HTTP request with a failure status.
    #[error("{message}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Failure description.
        message: String,
    },
    /// The request was refused before any I/O, e.g. an unknown device or a
    /// blocked command. The message is returned to the caller verbatim.
    #[error("{0}")]
    InvalidInput(String),
    /// Any other failure.
    #[error("{0}")]
    Other(BoxError),
}

impl ToolError {
    /// Authentication failure with `details`.
    pub fn authentication(details: impl Into<String>) -> Self {
        Self::Authentication(details.into())
    }

    /// Connectivity failure with `details`.
    pub fn connection(details: impl Into<String>) -> Self {
        Self::Connection(details.into())
    }

    /// Deadline failure with `details`.
    pub fn timeout(details: impl Into<String>) -> Self {
        Self::Timeout(details.into())
    }

    /// HTTP status failure.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Input refused before any I/O.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Wraps an arbitrary error.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }
}

impl From<InventoryError> for ToolError {
    fn from(error: InventoryError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

impl From<Rejection> for ToolError {
    fn from(rejection: Rejection) -> Self {
        Self::InvalidInput(rejection.to_string())
    }
}

impl From<SessionError> for ToolError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Authentication { .. } => Self::Authentication(error.to_string()),
            SessionError::Timeout { .. } => Self::Timeout(error.to_string()),
            SessionError::Connect { .. } | SessionError::Protocol { .. } => {
                Self::Connection(error_chain(&error))
            }
        }
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout(error_chain(&error));
        }
        if error.is_connect() {
            return Self::Connection(error_chain(&error));
        }
        if error.is_decode() {
            return Self::InvalidInput(error_chain(&error));
        }
        match error.status() {
            Some(status) if error.is_status() => Self::Status {
                status: status.as_u16(),
                message: error.to_string(),
            },
            _ => Self::Other(Box::new(error)),
        }
    }
}

impl From<HttpClientError> for ToolError {
    fn from(error: HttpClientError) -> Self {
        Self::Other(Box::new(error))
    }
}

/// Transport family a tool talks to; selects the translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Interactive command-line session.
    Cli,
    /// HTTP API.
    Http,
}

/// Maps a failure to the error envelope for `device_name`, logging it.
///
/// HTTP has no authentication branch: credential failures there read as
/// connection errors. Status failures are only recognised for HTTP and are
/// reported as unexpected failures over the command line.
#[must_use]
pub fn translate(kind: TransportKind, device_name: &str, failure: &ToolError) -> String {
    match (kind, failure) {
        (TransportKind::Cli, ToolError::Authentication(details)) => {
            error!(
                target: FAILURE_TARGET,
                device = device_name,
                error = %details,
                "authentication failed"
            );
            error_response(format!("Authentication failed: {details}"))
        }
        (_, ToolError::Connection(details) | ToolError::Timeout(details))
        | (TransportKind::Http, ToolError::Authentication(details)) => {
            error!(
                target: FAILURE_TARGET,
                device = device_name,
                error = %details,
                "connection error"
            );
            error_response(format!("Connection error: {details}"))
        }
        (TransportKind::Http, ToolError::Status { status, message }) => {
            error!(
                target: FAILURE_TARGET,
                device = device_name,
                status = *status,
                error = %message,
                "HTTP error"
            );
            error_response(format!("HTTP {status}: {message}"))
        }
        (_, ToolError::InvalidInput(message)) => error_response(message),
        (_, unexpected) => {
            error!(
                target: FAILURE_TARGET,
                device = device_name,
                error = %error_chain(unexpected),
                diagnostic = ?unexpected,
                "unexpected error"
            );
            error_response(unexpected)
        }
    }
}

/// Awaits a command-line tool body and converts any failure to an envelope.
pub async fn handle_cli_errors<F>(device_name: &str, operation: F) -> String
where
    F: Future<Output = Result<String, ToolError>>,
{
    operation
        .await
        .unwrap_or_else(|failure| translate(TransportKind::Cli, device_name, &failure))
}

/// Awaits an HTTP tool body and converts any failure to an envelope.
pub async fn handle_http_errors<F>(device_name: &str, operation: F) -> String
where
    F: Future<Output = Result<String, ToolError>>,
{
    operation
        .await
        .unwrap_or_else(|failure| translate(TransportKind::Http, device_name, &failure))
}

/// Renders `error` followed by each of its sources, separated by `": "`.
///
/// [`ToolError::Other`] contributes its inner error's chain.
#[must_use]
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = match error.downcast_ref::<ToolError>() {
        Some(ToolError::Other(inner)) => inner.source(),
        _ => error.source(),
    };
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.ends_with(text.as_str()) {
            let _ignored = write!(rendered, ": {text}");
        }
        source = cause.source();
    }
    rendered
}
