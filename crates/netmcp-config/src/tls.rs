//! Process-wide TLS verification toggle for HTTP transports.
//!
//! Lab devices commonly present self-signed certificates, so verification is
//! disabled unless `MCP_TLS_VERIFY` holds anything other than `false`.

use std::env;

/// Environment variable controlling certificate verification.
pub const TLS_VERIFY_ENV: &str = "MCP_TLS_VERIFY";

/// Certificate verification policy applied to HTTP sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Skip certificate and hostname checks.
    #[default]
    AcceptInvalid,
    /// Apply standard certificate and hostname verification.
    Verify,
}

impl TlsPolicy {
    /// Reads the policy from `MCP_TLS_VERIFY`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_value(env::var(TLS_VERIFY_ENV).ok().as_deref())
    }

    /// Derives the policy from a raw toggle value.
    ///
    /// `None` and any casing of `"false"` disable verification; every other
    /// value enables it.
    #[must_use]
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(raw) if !raw.eq_ignore_ascii_case("false") => Self::Verify,
            _ => Self::AcceptInvalid,
        }
    }

    /// Returns `true` when certificates must be verified.
    #[must_use]
    pub const fn verifies_certificates(self) -> bool {
        matches!(self, Self::Verify)
    }
}
