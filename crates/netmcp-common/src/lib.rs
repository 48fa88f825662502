//! Shared support for network-device tool servers.
//!
//! A tool server resolves a device from its [`Inventory`], checks the
//! requested command with a [`CommandValidator`], talks to the device over a
//! [`transport`], and always answers with a JSON [`envelope`]. The
//! [`failure`] wrappers turn every error along that path into an error
//! envelope, so a tool body only has to propagate `ToolError` with `?`.
//!
//! ```rust
//! use netmcp_common::envelope::ok_response;
//! use netmcp_common::failure::{ToolError, handle_cli_errors};
//! use netmcp_common::{CommandValidator, Inventory};
//! use serde_json::json;
//!
//! async fn show(inventory: &Inventory, device: &str, command: &str) -> String {
//!     handle_cli_errors(device, async {
//!         let record = inventory.get(device)?;
//!         CommandValidator::for_vendor(Default::default())
//!             .map_err(ToolError::other)?
//!             .validate_readonly(command)?;
//!         Ok::<String, ToolError>(ok_response([
//!             ("device", json!(device)),
//!             ("host", json!(record.host())),
//!         ]))
//!     })
//!     .await
//! }
//! ```

pub mod envelope;
pub mod failure;
pub mod telemetry;
pub mod transport;

pub use netmcp_config as config;
pub use netmcp_config::{Device, Inventory, InventoryError, InventoryLoader, TlsPolicy};
pub use netmcp_policy as policy;
pub use netmcp_policy::{CommandValidator, Rejection, Ruleset, Vendor};

pub use envelope::{Envelope, OkResponse, error_response, ok_response, to_pretty_json};
pub use failure::{ToolError, TransportKind, handle_cli_errors, handle_http_errors, translate};

#[cfg(test)]
mod tests;
