//! Outcomes raised by the command validator.

use thiserror::Error;

/// Reason a proposed command was blocked.
///
/// The `Display` text is the human-readable reason returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The command does not start with an allowed read-only prefix.
    #[error("Only read-only commands allowed ({}). Got: '{command}'", .allowed.join(", "))]
    PrefixNotAllowed {
        /// Prefixes the ruleset accepts.
        allowed: Vec<String>,
        /// Command as supplied by the caller.
        command: String,
    },

    /// A word-like token of the command is block-listed.
    #[error("Blocked term '{term}' in command.")]
    BlockedTerm {
        /// Token that matched the block list.
        term: String,
    },

    /// The command contains `|`, `>`, or `<`.
    #[error("Pipe/redirect characters not allowed.")]
    PipeRedirect,

    /// A configuration block matched a dangerous pattern.
    #[error("Dangerous command blocked: '{label}'")]
    DangerousConfig {
        /// Label of the first matching rule.
        label: String,
    },
}

/// Errors raised while compiling a ruleset into a validator.
#[derive(Debug, Error)]
pub enum RulesetError {
    /// A configuration rule pattern is not a valid regular expression.
    #[error("invalid pattern for rule '{label}' ({pattern}): {source}")]
    InvalidPattern {
        /// Label of the offending rule.
        label: String,
        /// Pattern text.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}
