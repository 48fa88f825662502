//! Transport factories for reaching devices.
//!
//! [`cli`] opens authenticated SSH sessions for command-line devices and
//! [`http`] builds clients for devices with a REST API. Both surface their
//! failures in a form [`crate::failure::ToolError`] converts from.

pub mod cli;
pub mod http;

pub use cli::{
    CliSession, CliSessionOptions, CommandOutput, SessionError, SessionStage, SessionTimeouts,
    with_session,
};
pub use http::{HttpAuth, HttpClientError, HttpClientOptions, HttpSession, http_client};
