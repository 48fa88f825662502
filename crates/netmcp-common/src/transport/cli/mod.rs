//! Command-line sessions over SSH.
//!
//! Each command runs on its own exec channel of a single authenticated
//! connection. Host keys are not verified: lab and management networks rarely
//! carry trustworthy known-hosts data, so every key is accepted and logged.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle};
use russh::keys::PublicKey;
use russh::{ChannelMsg, Disconnect};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use netmcp_config::Device;
use netmcp_config::defaults::{
    DEFAULT_OPS_TIMEOUT, DEFAULT_SOCKET_TIMEOUT, DEFAULT_TRANSPORT_TIMEOUT,
};

use crate::failure::ToolError;

const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport::cli");

/// Extra-field name consulted for the SSH port unless overridden.
pub const DEFAULT_PORT_KEY: &str = "port";

/// Deadlines applied to a command-line session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// TCP connect.
    pub socket: Duration,
    /// SSH handshake and authentication.
    pub transport: Duration,
    /// A single command, from channel open to channel close.
    pub ops: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            socket: DEFAULT_SOCKET_TIMEOUT,
            transport: DEFAULT_TRANSPORT_TIMEOUT,
            ops: DEFAULT_OPS_TIMEOUT,
        }
    }
}

/// Options for [`CliSession::open`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use netmcp_common::transport::cli::CliSessionOptions;
///
/// let options = CliSessionOptions::new("cisco_iosxe")
///     .with_port_key("ssh_port")
///     .with_ops_timeout(Duration::from_secs(120));
/// assert_eq!(options.port_key(), "ssh_port");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliSessionOptions {
    platform: String,
    port_key: String,
    timeouts: SessionTimeouts,
}

impl CliSessionOptions {
    /// Options for a device of the given platform with default timeouts.
    #[must_use]
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            port_key: DEFAULT_PORT_KEY.to_owned(),
            timeouts: SessionTimeouts::default(),
        }
    }

    /// Options taking the platform from the device's `platform` field,
    /// falling back to `fallback`.
    #[must_use]
    pub fn for_device(device: &Device, fallback: &str) -> Self {
        Self::new(device.platform().unwrap_or(fallback))
    }

    /// Reads the SSH port from `key` in the device's extra fields.
    #[must_use]
    pub fn with_port_key(mut self, key: impl Into<String>) -> Self {
        self.port_key = key.into();
        self
    }

    /// Replaces all deadlines.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: SessionTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replaces the TCP connect deadline.
    #[must_use]
    pub const fn with_socket_timeout(mut self, limit: Duration) -> Self {
        self.timeouts.socket = limit;
        self
    }

    /// Replaces the handshake and authentication deadline.
    #[must_use]
    pub const fn with_transport_timeout(mut self, limit: Duration) -> Self {
        self.timeouts.transport = limit;
        self
    }

    /// Replaces the per-command deadline.
    #[must_use]
    pub const fn with_ops_timeout(mut self, limit: Duration) -> Self {
        self.timeouts.ops = limit;
        self
    }

    /// Platform identifier, e.g. `cisco_iosxe`.
    #[must_use]
    pub const fn platform(&self) -> &str {
        self.platform.as_str()
    }

    /// Extra-field name holding the SSH port.
    #[must_use]
    pub const fn port_key(&self) -> &str {
        self.port_key.as_str()
    }

    /// Configured deadlines.
    #[must_use]
    pub const fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }
}

/// Phase of a session a deadline applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    /// TCP connect.
    Connect,
    /// SSH key exchange.
    Handshake,
    /// Password authentication.
    Authentication,
    /// Command execution.
    Command,
}

impl SessionStage {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Handshake => "handshake",
            Self::Authentication => "authentication",
            Self::Command => "command",
        }
    }
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a command-line session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The device rejected the credentials.
    #[error("authentication failed for {username}@{host}")]
    Authentication {
        /// Device address.
        host: String,
        /// Username presented.
        username: String,
    },
    /// The TCP connection could not be established.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        /// Device address.
        host: String,
        /// SSH port.
        port: u16,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },
    /// A deadline elapsed.
    #[error("{stage} timed out after {}s on {host}", .after.as_secs_f32())]
    Timeout {
        /// Device address.
        host: String,
        /// Phase that overran.
        stage: SessionStage,
        /// Deadline that elapsed.
        after: Duration,
    },
    /// The SSH protocol layer failed.
    #[error("SSH session with {host} failed: {source}")]
    Protocol {
        /// Device address.
        host: String,
        /// Underlying SSH error.
        #[source]
        source: russh::Error,
    },
}

/// Output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Command as sent.
    pub command: String,
    /// Standard output and standard error, in arrival order.
    pub output: String,
    /// Exit status reported by the device, when it sends one.
    pub exit_status: Option<u32>,
}

struct AcceptAnyHostKey {
    host: String,
}

impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        debug!(
            target: CLI_TARGET,
            host = %self.host,
            "accepting unverified host key"
        );
        Ok(true)
    }
}

/// Authenticated SSH connection to one device.
///
/// Dropping the session closes the connection, so an operation cancelled
/// mid-flight still releases it. [`CliSession::close`] additionally sends a
/// disconnect message.
pub struct CliSession {
    handle: Handle<AcceptAnyHostKey>,
    host: String,
    platform: String,
    ops_timeout: Duration,
}

impl fmt::Debug for CliSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliSession")
            .field("host", &self.host)
            .field("platform", &self.platform)
            .field("ops_timeout", &self.ops_timeout)
            .finish_non_exhaustive()
    }
}

impl CliSession {
    /// Connects and authenticates to `device`.
    ///
    /// The port is read from the extra field named by
    /// [`CliSessionOptions::port_key`], falling back to 22.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the connection, handshake, or
    /// authentication fails or overruns its deadline.
    pub async fn open(device: &Device, options: &CliSessionOptions) -> Result<Self, SessionError> {
        let host = device.host().to_owned();
        let port = device.port_for(options.port_key());
        let timeouts = options.timeouts();

        let stream = timeout(timeouts.socket, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| SessionError::Timeout {
                host: host.clone(),
                stage: SessionStage::Connect,
                after: timeouts.socket,
            })?
            .map_err(|source| SessionError::Connect {
                host: host.clone(),
                port,
                source,
            })?;

        let handler = AcceptAnyHostKey { host: host.clone() };
        let config = Arc::new(client::Config::default());
        let mut handle = timeout(
            timeouts.transport,
            client::connect_stream(config, stream, handler),
        )
        .await
        .map_err(|_| SessionError::Timeout {
            host: host.clone(),
            stage: SessionStage::Handshake,
            after: timeouts.transport,
        })?
        .map_err(|source| SessionError::Protocol {
            host: host.clone(),
            source,
        })?;

        let outcome = timeout(
            timeouts.transport,
            handle.authenticate_password(device.username(), device.password()),
        )
        .await
        .map_err(|_| SessionError::Timeout {
            host: host.clone(),
            stage: SessionStage::Authentication,
            after: timeouts.transport,
        })?
        .map_err(|source| SessionError::Protocol {
            host: host.clone(),
            source,
        })?;

        if !outcome.success() {
            return Err(SessionError::Authentication {
                host,
                username: device.username().to_owned(),
            });
        }

        info!(
            target: CLI_TARGET,
            host = %host,
            port,
            platform = options.platform(),
            "SSH session opened"
        );

        Ok(Self {
            handle,
            host,
            platform: options.platform().to_owned(),
            ops_timeout: timeouts.ops,
        })
    }

    /// Device address.
    #[must_use]
    pub const fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Platform identifier the session was opened with.
    #[must_use]
    pub const fn platform(&self) -> &str {
        self.platform.as_str()
    }

    /// Runs one command and collects its output.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Timeout`] when the command overruns the ops
    /// deadline and [`SessionError::Protocol`] when the channel fails.
    pub async fn send_command(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        let limit = self.ops_timeout;
        match timeout(limit, self.exec(command)).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout {
                host: self.host.clone(),
                stage: SessionStage::Command,
                after: limit,
            }),
        }
    }

    /// Runs commands in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SessionError`] from
    /// [`CliSession::send_command`].
    pub async fn send_commands<I, S>(&mut self, commands: I) -> Result<Vec<CommandOutput>, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outputs = Vec::new();
        for command in commands {
            outputs.push(self.send_command(command.as_ref()).await?);
        }
        Ok(outputs)
    }

    /// Sends a disconnect message and drops the connection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Protocol`] when the disconnect cannot be sent.
    pub async fn close(self) -> Result<(), SessionError> {
        debug!(target: CLI_TARGET, host = %self.host, "closing SSH session");
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|source| SessionError::Protocol {
                host: self.host.clone(),
                source,
            })
    }

    async fn exec(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|source| self.protocol(source))?;
        channel
            .exec(true, command)
            .await
            .map_err(|source| self.protocol(source))?;

        let mut collected = Vec::new();
        let mut exit_status = None;
        while let Some(message) = channel.wait().await {
            match message {
                ChannelMsg::Data { ref data } | ChannelMsg::ExtendedData { ref data, .. } => {
                    collected.extend_from_slice(data);
                }
                ChannelMsg::ExitStatus {
                    exit_status: status,
                } => exit_status = Some(status),
                _ => {}
            }
        }

        debug!(
            target: CLI_TARGET,
            host = %self.host,
            command,
            bytes = collected.len(),
            "command completed"
        );

        Ok(CommandOutput {
            command: command.to_owned(),
            output: String::from_utf8_lossy(&collected).into_owned(),
            exit_status,
        })
    }

    fn protocol(&self, source: russh::Error) -> SessionError {
        SessionError::Protocol {
            host: self.host.clone(),
            source,
        }
    }
}

/// Opens a session, runs `operation` against it, and closes it.
///
/// The session is closed whatever `operation` returns; a failed disconnect
/// is logged and does not mask the operation's result.
///
/// # Errors
///
/// Returns the [`ToolError`] from opening the session or from `operation`.
pub async fn with_session<T, F>(
    device: &Device,
    options: &CliSessionOptions,
    operation: F,
) -> Result<T, ToolError>
where
    F: AsyncFnOnce(&mut CliSession) -> Result<T, ToolError>,
{
    let mut session = CliSession::open(device, options).await?;
    let result = operation(&mut session).await;
    let host = session.host.clone();
    if let Err(error) = session.close().await {
        debug!(target: CLI_TARGET, host = %host, error = %error, "SSH session did not close cleanly");
    }
    result
}
