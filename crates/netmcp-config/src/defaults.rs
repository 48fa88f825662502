//! Built-in defaults shared by the inventory loader and transport factories.

use std::time::Duration;

use crate::logging::LogFormat;

/// Username applied when a device record omits one.
pub const DEFAULT_USERNAME: &str = "admin";

/// SSH port applied when a device record omits one.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Inventory key used for the single-device environment fallback.
pub const DEFAULT_DEVICE_KEY: &str = "default";

/// Time allowed for the TCP connection to a device.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for the SSH handshake and authentication.
pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for a single command to complete.
pub const DEFAULT_OPS_TIMEOUT: Duration = Duration::from_secs(60);

/// Request timeout applied to HTTP sessions.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default log filter expression used by tool servers.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned default username used by serde.
pub fn default_username() -> String {
    DEFAULT_USERNAME.to_owned()
}

/// Default SSH port used by serde.
pub const fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// Default log filter expression.
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
