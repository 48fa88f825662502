//! Command safety policy for network device tool servers.
//!
//! The `netmcp-policy` crate decides whether a command proposed by a caller
//! may be sent to a device, without ever executing it. A [`Ruleset`] holds the
//! allow/deny data and a [`CommandValidator`] compiles it once and evaluates
//! commands against it:
//!
//! - [`CommandValidator::validate_readonly`] allow-lists query commands by
//!   prefix, then refuses block-listed words and pipe/redirect characters.
//! - [`CommandValidator::validate_config`] refuses configuration blocks that
//!   match a catastrophic pattern such as `write erase` or `reload`.
//!
//! Vendor families use different rulesets built from [`Vendor`] presets, and
//! several validators may coexist in one process.
//!
//! ```
//! use netmcp_policy::{CommandValidator, Rejection, Vendor};
//!
//! # fn main() -> Result<(), netmcp_policy::RulesetError> {
//! let validator = CommandValidator::for_vendor(Vendor::Cisco)?;
//! assert_eq!(
//!     validator.validate_readonly("show running | include interface"),
//!     Err(Rejection::PipeRedirect),
//! );
//! assert!(validator.validate_config(["write erase"]).is_err());
//! # Ok(()) }
//! ```

mod error;
mod ruleset;
mod validator;

pub use error::{Rejection, RulesetError};
pub use ruleset::{ConfigRule, Ruleset, Vendor};
pub use validator::CommandValidator;
