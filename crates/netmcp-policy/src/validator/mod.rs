//! Rule engine deciding whether a proposed device command is safe to run.
//!
//! Read-only commands are allow-listed: they must start with a configured
//! prefix and may not contain a block-listed word or, optionally, any pipe or
//! redirect character. Configuration blocks are deny-listed: only the
//! configured catastrophic patterns are refused, so configuration validation
//! is advisory rather than exhaustive.
//!
//! Evaluation is pure. Nothing here performs I/O, and every input string
//! produces either `Ok(())` or a [`Rejection`].

use regex::{Regex, RegexBuilder};

use crate::error::{Rejection, RulesetError};
use crate::ruleset::{Ruleset, Vendor};

const PIPE_REDIRECT_CHARS: [char; 3] = ['|', '>', '<'];

/// Validator compiled from a [`Ruleset`].
///
/// # Example
///
/// ```
/// use netmcp_policy::{CommandValidator, Ruleset};
///
/// let validator = CommandValidator::new(Ruleset::default())?;
/// assert!(validator.validate_readonly("show ip route").is_ok());
///
/// let rejection = validator
///     .validate_readonly("show delete flash:")
///     .expect_err("delete is block-listed");
/// assert_eq!(rejection.to_string(), "Blocked term 'delete' in command.");
/// # Ok::<(), netmcp_policy::RulesetError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CommandValidator {
    ruleset: Ruleset,
    config_patterns: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    label: String,
}

impl CommandValidator {
    /// Compiles the configuration patterns of `ruleset`.
    ///
    /// # Errors
    ///
    /// Returns [`RulesetError::InvalidPattern`] for the first rule whose
    /// pattern is not a valid regular expression.
    pub fn new(ruleset: Ruleset) -> Result<Self, RulesetError> {
        let config_patterns = ruleset
            .config_rules()
            .iter()
            .map(|rule| {
                RegexBuilder::new(rule.pattern())
                    .multi_line(true)
                    .build()
                    .map(|regex| CompiledRule {
                        regex,
                        label: rule.label().to_owned(),
                    })
                    .map_err(|source| RulesetError::InvalidPattern {
                        label: rule.label().to_owned(),
                        pattern: rule.pattern().to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ruleset,
            config_patterns,
        })
    }

    /// Builds the validator for a vendor preset.
    ///
    /// # Errors
    ///
    /// Propagates [`RulesetError`] from [`CommandValidator::new`].
    pub fn for_vendor(vendor: Vendor) -> Result<Self, RulesetError> {
        Self::new(Ruleset::for_vendor(vendor))
    }

    /// Ruleset this validator enforces.
    #[must_use]
    pub const fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Checks a read-only command.
    ///
    /// The command is trimmed and lowercased, then checked in order against
    /// the prefix allow-list, the block-listed words, and the pipe/redirect
    /// toggle. The first failing check is reported.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] describing the first failing check.
    pub fn validate_readonly(&self, command: &str) -> Result<(), Rejection> {
        let normalised = command.trim().to_lowercase();
        let prefixes = self.ruleset.readonly_prefixes();

        if !prefixes
            .iter()
            .any(|prefix| normalised.starts_with(prefix.as_str()))
        {
            return Err(Rejection::PrefixNotAllowed {
                allowed: prefixes.to_vec(),
                command: command.to_owned(),
            });
        }

        let block_words = self.ruleset.block_words();
        if let Some(term) = word_tokens(&normalised).find(|token| block_words.contains(*token)) {
            return Err(Rejection::BlockedTerm {
                term: term.to_owned(),
            });
        }

        if self.ruleset.blocks_pipe_redirect() && normalised.contains(PIPE_REDIRECT_CHARS) {
            return Err(Rejection::PipeRedirect);
        }

        Ok(())
    }

    /// Checks a configuration block.
    ///
    /// Lines are joined with newlines and lowercased; each rule is searched
    /// in declaration order and the first match is reported.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::DangerousConfig`] naming the first matching rule.
    pub fn validate_config<I, S>(&self, lines: I) -> Result<(), Rejection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|line| line.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase();

        match self
            .config_patterns
            .iter()
            .find(|rule| rule.regex.is_match(&joined))
        {
            Some(rule) => Err(Rejection::DangerousConfig {
                label: rule.label.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Splits on everything except ASCII letters, digits, `_`, and `-`.
fn word_tokens(command: &str) -> impl Iterator<Item = &str> {
    command
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests;
