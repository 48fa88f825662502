//! Configuration shared by netmcp device tool servers.
//!
//! This crate owns everything a server resolves from its environment at
//! startup: the [`Inventory`] of managed devices, the process-wide
//! [`TlsPolicy`] for HTTP transports, the [`LogFormat`] for telemetry, and the
//! built-in [`defaults`] for credentials, ports, and timeouts.
//!
//! The inventory is an explicit value. Servers construct it once and pass it
//! by reference to the handlers that resolve devices; nothing here installs a
//! global.

pub mod defaults;
mod device;
mod inventory;
mod logging;
mod tls;

pub use defaults::{default_log_filter, default_log_format};
pub use device::Device;
pub use inventory::{Inventory, InventoryError, InventoryLoader};
pub use logging::{LogFormat, LogFormatParseError};
pub use tls::{TLS_VERIFY_ENV, TlsPolicy};
