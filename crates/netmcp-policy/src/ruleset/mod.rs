//! Validator rulesets and per-vendor presets.
//!
//! A [`Ruleset`] is plain data: the read-only prefixes a command must start
//! with, the words that block a read-only command, the ordered configuration
//! patterns that block a configuration change, and whether pipe/redirect
//! characters are refused. Vendor families get their own preset values
//! through [`Vendor`]; callers derive variants with the builder methods.

use std::collections::BTreeSet;

use strum::{Display, EnumString};

/// A configuration-mode pattern paired with the label reported on match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRule {
    pattern: String,
    label: String,
}

impl ConfigRule {
    /// Creates a rule. `pattern` is compiled in multi-line mode.
    #[must_use]
    pub fn new(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
        }
    }

    /// Regular expression source.
    #[must_use]
    pub const fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Human-readable label reported when the pattern matches.
    #[must_use]
    pub const fn label(&self) -> &str {
        self.label.as_str()
    }
}

/// Immutable allow/deny configuration for a command validator.
///
/// `Ruleset::default()` is the generic network-OS profile: `show` commands
/// only, destructive verbs blocked, pipes and redirects refused.
///
/// # Example
///
/// ```
/// use netmcp_policy::Ruleset;
///
/// let ruleset = Ruleset::default()
///     .with_prefixes(["show", "ping"])
///     .with_block_word("traceroute");
/// assert_eq!(ruleset.readonly_prefixes().join(", "), "show, ping");
/// assert!(ruleset.block_words().contains("traceroute"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    readonly_prefixes: Vec<String>,
    block_words: BTreeSet<String>,
    config_rules: Vec<ConfigRule>,
    block_pipe_redirect: bool,
}

const GENERIC_PREFIXES: &[&str] = &["show"];

const GENERIC_BLOCK_WORDS: &[&str] = &[
    "copy",
    "delete",
    "erase",
    "reload",
    "write",
    "configure",
    "conf",
];

const GENERIC_CONFIG_RULES: &[(&str, &str)] = &[
    (r"\bwrite\s+erase\b", "write erase"),
    (r"^\s*erase\b", "erase"),
    (r"\breload\b", "reload"),
    (r"\bdelete\b", "delete"),
    (r"\bformat\b", "format"),
];

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            readonly_prefixes: to_strings(GENERIC_PREFIXES),
            block_words: GENERIC_BLOCK_WORDS.iter().map(|word| (*word).to_owned()).collect(),
            config_rules: GENERIC_CONFIG_RULES
                .iter()
                .map(|(pattern, label)| ConfigRule::new(*pattern, *label))
                .collect(),
            block_pipe_redirect: true,
        }
    }
}

impl Ruleset {
    /// Preset ruleset for a vendor family.
    #[must_use]
    pub fn for_vendor(vendor: Vendor) -> Self {
        match vendor {
            Vendor::Generic | Vendor::Cisco => Self::default(),
            Vendor::Fortinet => Self::default()
                .with_prefixes(["get", "show"])
                .with_block_words_added(["execute", "config", "purge", "shutdown", "reboot"])
                .with_config_rule(r"\bexecute\s+factoryreset\b", "execute factoryreset")
                .with_config_rule(r"\bexecute\s+reboot\b", "execute reboot")
                .with_config_rule(r"\bexecute\s+shutdown\b", "execute shutdown")
                .with_config_rule(r"\bexecute\s+formatlogdisk\b", "execute formatlogdisk"),
            Vendor::Junos => Self::default()
                .with_block_words_added(["request", "commit", "rollback", "clear", "restart"])
                .with_config_rule(r"\brequest\s+system\s+zeroize\b", "request system zeroize")
                .with_config_rule(r"\brequest\s+system\s+reboot\b", "request system reboot")
                .with_config_rule(r"\brequest\s+system\s+halt\b", "request system halt")
                .with_config_rule(r"\bload\s+factory-default\b", "load factory-default"),
        }
    }

    /// Replaces the allowed read-only prefixes.
    #[must_use]
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readonly_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the block-listed words.
    #[must_use]
    pub fn with_block_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Adds words to the block list.
    #[must_use]
    pub fn with_block_words_added<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block_words.extend(words.into_iter().map(Into::into));
        self
    }

    /// Adds a single word to the block list.
    #[must_use]
    pub fn with_block_word(self, word: impl Into<String>) -> Self {
        self.with_block_words_added([word.into()])
    }

    /// Appends a configuration rule after the existing ones.
    #[must_use]
    pub fn with_config_rule(mut self, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        self.config_rules.push(ConfigRule::new(pattern, label));
        self
    }

    /// Replaces the configuration rules.
    #[must_use]
    pub fn with_config_rules(mut self, rules: Vec<ConfigRule>) -> Self {
        self.config_rules = rules;
        self
    }

    /// Enables or disables pipe/redirect blocking for read-only commands.
    #[must_use]
    pub const fn with_pipe_redirect_blocking(mut self, enabled: bool) -> Self {
        self.block_pipe_redirect = enabled;
        self
    }

    /// Allowed read-only prefixes in declaration order.
    #[must_use]
    pub fn readonly_prefixes(&self) -> &[String] {
        &self.readonly_prefixes
    }

    /// Words that block a read-only command.
    #[must_use]
    pub const fn block_words(&self) -> &BTreeSet<String> {
        &self.block_words
    }

    /// Configuration rules in evaluation order.
    #[must_use]
    pub fn config_rules(&self) -> &[ConfigRule] {
        &self.config_rules
    }

    /// Whether `|`, `>`, and `<` are refused in read-only commands.
    #[must_use]
    pub const fn blocks_pipe_redirect(&self) -> bool {
        self.block_pipe_redirect
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Device families with a preset [`Ruleset`].
///
/// Parsing is case-insensitive:
///
/// ```
/// use netmcp_policy::Vendor;
///
/// assert_eq!("Fortinet".parse::<Vendor>().ok(), Some(Vendor::Fortinet));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Vendor {
    /// Generic network OS with `show` commands.
    #[default]
    Generic,
    /// Cisco IOS, IOS-XE, and NX-OS.
    Cisco,
    /// Fortinet FortiOS, which also accepts `get` queries.
    Fortinet,
    /// Juniper Junos.
    Junos,
}

#[cfg(test)]
mod tests;
