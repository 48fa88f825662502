//! Device inventory loaded once at startup.
//!
//! Each tool server picks an environment prefix (for example `CISCO`) and the
//! [`InventoryLoader`] resolves devices from it:
//!
//! 1. `<PREFIX>_DEVICES_JSON` names a JSON file mapping device names to
//!    [`Device`] records. When the file exists it is the only source.
//! 2. Otherwise `<PREFIX>_HOST`, `<PREFIX>_USER`, `<PREFIX>_PASS`, and
//!    `<PREFIX>_PORT` describe a single device stored under `"default"`.
//!
//! Loading reads variables through a lookup function, so the result depends
//! only on the variables and the file contents.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::num::ParseIntError;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::defaults::{DEFAULT_DEVICE_KEY, DEFAULT_SSH_PORT, DEFAULT_USERNAME};
use crate::device::Device;

/// Tracing target for inventory operations.
const INVENTORY_TARGET: &str = "netmcp_config::inventory";

/// Errors raised while loading or querying the inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The requested device is not in the inventory.
    #[error("Device '{name}' not in inventory. Available: {available:?}")]
    UnknownDevice {
        /// Name that was looked up.
        name: String,
        /// Every device name the inventory holds.
        available: Vec<String>,
    },

    /// The inventory file exists but could not be read.
    #[error("failed to read inventory file '{path}': {source}")]
    ReadFile {
        /// Path named by the environment.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The inventory file is not a JSON object of device records.
    #[error("failed to parse inventory file '{path}': {source}")]
    ParseFile {
        /// Path named by the environment.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The single-device port variable is not a valid port number.
    #[error("{variable} must be a port number, got '{value}'")]
    InvalidPort {
        /// Environment variable holding the port.
        variable: String,
        /// Raw value that failed to parse.
        value: String,
        /// Underlying parse error.
        #[source]
        source: ParseIntError,
    },
}

/// Mapping from device name to connection parameters.
///
/// Built once and shared by reference afterwards; there is no mutation API.
///
/// # Example
///
/// ```
/// use netmcp_config::{Device, Inventory};
///
/// let inventory: Inventory = [("sw01".to_owned(), Device::new("10.0.0.1"))]
///     .into_iter()
///     .collect();
/// assert_eq!(inventory.get("sw01").map(|d| d.host()).ok(), Some("10.0.0.1"));
/// assert!(inventory.get("sw99").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    devices: BTreeMap<String, Device>,
}

impl Inventory {
    /// Loads the inventory for `prefix` from the process environment.
    ///
    /// # Errors
    ///
    /// See [`InventoryLoader::load_with`].
    pub fn from_env(prefix: &str) -> Result<Self, InventoryError> {
        InventoryLoader::new(prefix).load_from_env()
    }

    /// Looks up a device by name.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::UnknownDevice`] listing the available names
    /// when `name` is absent.
    pub fn get(&self, name: &str) -> Result<&Device, InventoryError> {
        self.devices
            .get(name)
            .ok_or_else(|| InventoryError::UnknownDevice {
                name: name.to_owned(),
                available: self.names().map(str::to_owned).collect(),
            })
    }

    /// Device names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Iterates over `(name, device)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Device)> {
        self.devices
            .iter()
            .map(|(name, device)| (name.as_str(), device))
    }

    /// Returns `true` when a device with `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.devices.contains_key(name)
    }

    /// Number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` when no devices were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<(String, Device)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (String, Device)>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

/// Resolves an [`Inventory`] from prefixed environment variables.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use netmcp_config::InventoryLoader;
/// use serde_json::json;
///
/// let vars = HashMap::from([("CISCO_HOST", "10.0.0.1")]);
/// let inventory = InventoryLoader::new("CISCO")
///     .with_default_field("platform", json!("iosxe"))
///     .load_with(|key| vars.get(key).map(|value| (*value).to_owned()))
///     .expect("inventory loads");
/// let device = inventory.get("default").expect("fallback device");
/// assert_eq!(device.platform(), Some("iosxe"));
/// ```
#[derive(Debug, Clone)]
pub struct InventoryLoader {
    prefix: String,
    default_fields: Map<String, Value>,
}

impl InventoryLoader {
    /// Creates a loader reading variables named `<prefix>_*`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            default_fields: Map::new(),
        }
    }

    /// Adds a field merged into the single-device fallback entry.
    ///
    /// Fields are ignored when the inventory comes from a JSON file.
    #[must_use]
    pub fn with_default_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.default_fields.insert(key.into(), value);
        self
    }

    /// Name of the variable `<prefix>_<suffix>`.
    #[must_use]
    pub fn variable(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.prefix)
    }

    /// Loads the inventory from the process environment.
    ///
    /// # Errors
    ///
    /// See [`InventoryLoader::load_with`].
    pub fn load_from_env(&self) -> Result<Inventory, InventoryError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Loads the inventory using `lookup` to read variables.
    ///
    /// Empty values are treated as unset. A devices file path that does not
    /// exist falls through to the single-device variables. When neither
    /// source is configured the inventory is empty.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ReadFile`] or [`InventoryError::ParseFile`]
    /// when the devices file cannot be used, and
    /// [`InventoryError::InvalidPort`] when the port variable is not numeric.
    pub fn load_with<F>(&self, lookup: F) -> Result<Inventory, InventoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Credentials keep empty values; the other variables treat them as unset.
        let raw = |suffix: &str| lookup(self.variable(suffix).as_str());
        let read = |suffix: &str| raw(suffix).filter(|value| !value.is_empty());

        if let Some(raw_path) = read("DEVICES_JSON") {
            let path = Utf8PathBuf::from(raw_path);
            if path.exists() {
                let inventory = load_file(&path)?;
                info!(
                    target: INVENTORY_TARGET,
                    devices = inventory.len(),
                    path = %path,
                    "loaded devices from inventory file"
                );
                return Ok(inventory);
            }
            debug!(
                target: INVENTORY_TARGET,
                path = %path,
                "inventory file does not exist; falling back to single-device variables"
            );
        }

        let Some(host) = read("HOST") else {
            debug!(
                target: INVENTORY_TARGET,
                prefix = %self.prefix,
                "no devices configured"
            );
            return Ok(Inventory::default());
        };

        let port_variable = self.variable("PORT");
        let port = match read("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| InventoryError::InvalidPort {
                    variable: port_variable,
                    value,
                    source,
                })?,
            None => DEFAULT_SSH_PORT,
        };

        let device = self.default_fields.iter().fold(
            Device::new(host.as_str())
                .with_username(raw("USER").unwrap_or_else(|| DEFAULT_USERNAME.to_owned()))
                .with_password(raw("PASS").unwrap_or_default())
                .with_port(port),
            |device, (key, value)| device.with_field(key.as_str(), value.clone()),
        );

        info!(target: INVENTORY_TARGET, host = %host, "loaded single device");
        Ok(std::iter::once((DEFAULT_DEVICE_KEY.to_owned(), device)).collect())
    }
}

fn load_file(path: &Utf8Path) -> Result<Inventory, InventoryError> {
    let contents = fs::read_to_string(path).map_err(|source| InventoryError::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    let devices: BTreeMap<String, Device> =
        serde_json::from_str(&contents).map_err(|source| InventoryError::ParseFile {
            path: path.to_owned(),
            source,
        })?;
    Ok(Inventory { devices })
}
