//! Connection parameters for a single managed device.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::{DEFAULT_SSH_PORT, default_port, default_username};

/// Stored connection parameters for one network device.
///
/// Vendor-specific fields such as `platform` are preserved verbatim in
/// [`Device::extra`]. The password is redacted from `Debug` output.
///
/// # Example
///
/// ```
/// use netmcp_config::Device;
///
/// let device = Device::new("10.0.0.1").with_port(2222);
/// assert_eq!(device.username(), "admin");
/// assert_eq!(device.port(), 2222);
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    host: String,
    #[serde(default = "default_username")]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Device {
    /// Creates a record for `host` with default credentials and port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: default_username(),
            password: String::new(),
            port: DEFAULT_SSH_PORT,
            extra: Map::new(),
        }
    }

    /// Sets the login username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the login password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Sets the SSH port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Merges a field into the record.
    ///
    /// Core fields (`host`, `username`, `password`, `port`) are overwritten
    /// when the value has the matching JSON type; every other key is stored
    /// as a vendor extra.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let name: String = key.into();
        let port = if name == "port" {
            port_value(&value)
        } else {
            None
        };
        match (name.as_str(), value) {
            ("host", Value::String(host)) => self.host = host,
            ("username", Value::String(username)) => self.username = username,
            ("password", Value::String(password)) => self.password = password,
            (_, other) => match port {
                Some(number) => self.port = number,
                None => {
                    self.extra.insert(name.clone(), other);
                }
            },
        }
        self
    }

    /// Hostname or address used to reach the device.
    #[must_use]
    pub const fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Login username.
    #[must_use]
    pub const fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Login password.
    #[must_use]
    pub const fn password(&self) -> &str {
        self.password.as_str()
    }

    /// SSH port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Vendor-specific fields carried alongside the connection parameters.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Platform tag, when the record declares one.
    #[must_use]
    pub fn platform(&self) -> Option<&str> {
        self.extra.get("platform").and_then(Value::as_str)
    }

    /// Resolves the port stored under `key`.
    ///
    /// `"port"` returns [`Device::port`]. Other keys are read from the vendor
    /// extras, accepting either a number or a numeric string, and fall back
    /// to the standard SSH port when absent or malformed.
    #[must_use]
    pub fn port_for(&self, key: &str) -> u16 {
        if key == "port" {
            return self.port;
        }
        self.extra
            .get(key)
            .and_then(port_value)
            .unwrap_or(DEFAULT_SSH_PORT)
    }
}

fn port_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|raw| u16::try_from(raw).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("extra", &self.extra)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialises_with_defaults() {
        let device: Device =
            serde_json::from_value(json!({ "host": "10.0.0.1" })).expect("device parses");
        assert_eq!(device.host(), "10.0.0.1");
        assert_eq!(device.username(), "admin");
        assert_eq!(device.password(), "");
        assert_eq!(device.port(), 22);
        assert!(device.extra().is_empty());
    }

    #[test]
    fn keeps_vendor_fields() {
        let device: Device = serde_json::from_value(json!({
            "host": "fw01.lab",
            "port": 8022,
            "platform": "fortios",
            "vdom": "root",
        }))
        .expect("device parses");
        assert_eq!(device.port(), 8022);
        assert_eq!(device.platform(), Some("fortios"));
        assert_eq!(device.extra().get("vdom"), Some(&json!("root")));
    }

    #[test]
    fn rejects_record_without_host() {
        let result = serde_json::from_value::<Device>(json!({ "username": "ops" }));
        assert!(result.is_err(), "host is required");
    }

    #[test]
    fn debug_output_redacts_password() {
        let device = Device::new("sw01").with_password("s3cret");
        let rendered = format!("{device:?}");
        assert!(!rendered.contains("s3cret"), "password leaked: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    #[case::core_port("port", 2222)]
    #[case::numeric_extra("ssh_port", 830)]
    #[case::string_extra("mgmt_port", 8443)]
    #[case::missing_extra("console_port", 22)]
    fn resolves_port_by_key(#[case] key: &str, #[case] expected: u16) {
        let device = Device::new("r1")
            .with_port(2222)
            .with_field("ssh_port", json!(830))
            .with_field("mgmt_port", json!("8443"));
        assert_eq!(device.port_for(key), expected);
    }

    #[test]
    fn with_field_overrides_core_fields() {
        let device = Device::new("r1")
            .with_field("username", json!("netops"))
            .with_field("port", json!(830))
            .with_field("platform", json!("junos"));
        assert_eq!(device.username(), "netops");
        assert_eq!(device.port(), 830);
        assert_eq!(device.platform(), Some("junos"));
        assert!(!device.extra().contains_key("username"));
    }
}
