//! Unit tests for command validation.

use rstest::{fixture, rstest};

use super::*;
use crate::ruleset::ConfigRule;

#[fixture]
fn validator() -> CommandValidator {
    CommandValidator::new(Ruleset::default()).expect("default ruleset compiles")
}

// ---------------------------------------------------------------------------
// Read-only commands
// ---------------------------------------------------------------------------

#[rstest]
#[case::plain("show ip route")]
#[case::padded_and_upper("   SHOW Version  ")]
#[case::hyphenated("show ip bgp summary vrf mgmt-vrf")]
fn accepts_safe_show_commands(validator: CommandValidator, #[case] command: &str) {
    assert_eq!(validator.validate_readonly(command), Ok(()));
}

#[rstest]
#[case::config_mode("configure terminal")]
#[case::empty("")]
#[case::ping("ping 10.0.0.1")]
fn rejects_commands_without_allowed_prefix(validator: CommandValidator, #[case] command: &str) {
    let rejection = validator
        .validate_readonly(command)
        .expect_err("prefix must be enforced");
    let reason = rejection.to_string();
    assert!(reason.contains("(show)"), "reason lists prefixes: {reason}");
    assert_eq!(
        reason,
        format!("Only read-only commands allowed (show). Got: '{command}'")
    );
}

#[rstest]
fn rejection_quotes_command_verbatim(validator: CommandValidator) {
    let rejection = validator
        .validate_readonly("  Reload in 5")
        .expect_err("reload is not a show command");
    assert_eq!(
        rejection.to_string(),
        "Only read-only commands allowed (show). Got: '  Reload in 5'"
    );
}

#[rstest]
#[case::delete("show delete flash:", "delete")]
#[case::reload("show reload status", "reload")]
#[case::uppercase("SHOW COPY running-config", "copy")]
#[case::after_punctuation("show run;write", "write")]
fn rejects_block_listed_words(
    validator: CommandValidator,
    #[case] command: &str,
    #[case] term: &str,
) {
    let rejection = validator
        .validate_readonly(command)
        .expect_err("block word must be enforced");
    assert_eq!(
        rejection,
        Rejection::BlockedTerm {
            term: term.to_owned()
        }
    );
    assert_eq!(
        rejection.to_string(),
        format!("Blocked term '{term}' in command.")
    );
}

#[rstest]
#[case::substring("show configuration-register")]
#[case::suffix("show rewrite-rules")]
fn block_words_match_whole_tokens_only(validator: CommandValidator, #[case] command: &str) {
    assert_eq!(validator.validate_readonly(command), Ok(()));
}

#[rstest]
#[case::pipe("show running | include interface")]
#[case::redirect("show tech > flash:tech.txt")]
#[case::inside_token("show host a<b")]
fn rejects_pipe_and_redirect(validator: CommandValidator, #[case] command: &str) {
    let rejection = validator
        .validate_readonly(command)
        .expect_err("pipe/redirect must be refused");
    assert_eq!(rejection, Rejection::PipeRedirect);
    assert_eq!(rejection.to_string(), "Pipe/redirect characters not allowed.");
}

#[test]
fn pipe_blocking_can_be_disabled() {
    let validator =
        CommandValidator::new(Ruleset::default().with_pipe_redirect_blocking(false))
            .expect("ruleset compiles");
    assert_eq!(
        validator.validate_readonly("show running | include interface"),
        Ok(())
    );
}

#[rstest]
fn block_word_wins_over_pipe(validator: CommandValidator) {
    let rejection = validator
        .validate_readonly("show run | copy")
        .expect_err("blocked");
    assert!(matches!(rejection, Rejection::BlockedTerm { .. }));
}

#[rstest]
fn prefix_wins_over_block_word(validator: CommandValidator) {
    let rejection = validator
        .validate_readonly("delete flash: | more")
        .expect_err("blocked");
    assert!(matches!(rejection, Rejection::PrefixNotAllowed { .. }));
}

// ---------------------------------------------------------------------------
// Configuration blocks
// ---------------------------------------------------------------------------

#[rstest]
fn accepts_ordinary_configuration(validator: CommandValidator) {
    let lines = [
        "interface GigabitEthernet0/1",
        " description uplink",
        " no shutdown",
    ];
    assert_eq!(validator.validate_config(lines), Ok(()));
}

#[rstest]
fn accepts_empty_configuration(validator: CommandValidator) {
    assert_eq!(validator.validate_config(Vec::<String>::new()), Ok(()));
}

#[rstest]
#[case::write_erase(&["write erase"], "write erase")]
#[case::erase_at_line_start(&["hostname r1", "  erase startup-config"], "erase")]
#[case::reload(&["do reload in 10"], "reload")]
#[case::delete(&["DELETE flash:vlan.dat"], "delete")]
#[case::format(&["format bootflash:"], "format")]
fn rejects_dangerous_configuration(
    validator: CommandValidator,
    #[case] lines: &[&str],
    #[case] label: &str,
) {
    let rejection = validator
        .validate_config(lines)
        .expect_err("dangerous pattern must be refused");
    assert_eq!(
        rejection.to_string(),
        format!("Dangerous command blocked: '{label}'")
    );
}

#[rstest]
fn erase_pattern_is_anchored_to_line_start(validator: CommandValidator) {
    assert_eq!(
        validator.validate_config(["banner motd erase-me"]),
        Ok(()),
        "erase mid-line is not the erase command"
    );
}

#[rstest]
fn first_declared_rule_wins(validator: CommandValidator) {
    let rejection = validator
        .validate_config(["delete flash:x", "reload"])
        .expect_err("blocked");
    assert_eq!(
        rejection,
        Rejection::DangerousConfig {
            label: "reload".to_owned()
        }
    );
}

#[test]
fn custom_rule_order_is_respected() {
    let ruleset = Ruleset::default().with_config_rules(vec![
        ConfigRule::new(r"\bdelete\b", "delete first"),
        ConfigRule::new(r"\breload\b", "reload second"),
    ]);
    let validator = CommandValidator::new(ruleset).expect("ruleset compiles");
    let rejection = validator
        .validate_config(["reload", "delete flash:x"])
        .expect_err("blocked");
    assert_eq!(
        rejection.to_string(),
        "Dangerous command blocked: 'delete first'"
    );
}

#[test]
fn invalid_pattern_fails_construction() {
    let ruleset = Ruleset::default().with_config_rule("(unclosed", "broken");
    let error = CommandValidator::new(ruleset).expect_err("pattern must compile");
    match error {
        RulesetError::InvalidPattern { label, pattern, .. } => {
            assert_eq!(label, "broken");
            assert_eq!(pattern, "(unclosed");
        }
    }
}

// ---------------------------------------------------------------------------
// Vendor presets
// ---------------------------------------------------------------------------

#[rstest]
#[case::generic(Vendor::Generic)]
#[case::cisco(Vendor::Cisco)]
#[case::fortinet(Vendor::Fortinet)]
#[case::junos(Vendor::Junos)]
fn every_preset_compiles(#[case] vendor: Vendor) {
    assert!(CommandValidator::for_vendor(vendor).is_ok());
}

#[test]
fn fortinet_accepts_get_queries() {
    let validator = CommandValidator::for_vendor(Vendor::Fortinet).expect("preset compiles");
    assert_eq!(validator.validate_readonly("get system status"), Ok(()));
    let rejection = validator
        .validate_readonly("diagnose sys top")
        .expect_err("diagnose is not allow-listed");
    assert_eq!(
        rejection.to_string(),
        "Only read-only commands allowed (get, show). Got: 'diagnose sys top'"
    );
    let rejection = validator
        .validate_config(["execute factoryreset"])
        .expect_err("factory reset");
    assert_eq!(
        rejection.to_string(),
        "Dangerous command blocked: 'execute factoryreset'"
    );
}

#[test]
fn junos_blocks_request_commands() {
    let validator = CommandValidator::for_vendor(Vendor::Junos).expect("preset compiles");
    let rejection = validator
        .validate_readonly("show system request")
        .expect_err("request is block-listed");
    assert_eq!(rejection.to_string(), "Blocked term 'request' in command.");
    let rejection = validator
        .validate_config(["request system zeroize"])
        .expect_err("zeroize");
    assert_eq!(
        rejection.to_string(),
        "Dangerous command blocked: 'request system zeroize'"
    );
}
