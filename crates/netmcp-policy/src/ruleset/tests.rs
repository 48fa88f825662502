//! Unit tests for ruleset presets and builders.

use rstest::rstest;

use super::*;

#[test]
fn default_ruleset_matches_generic_profile() {
    let ruleset = Ruleset::default();
    assert_eq!(ruleset.readonly_prefixes(), &["show".to_owned()]);
    for word in ["copy", "delete", "erase", "reload", "write", "configure", "conf"] {
        assert!(ruleset.block_words().contains(word), "missing {word}");
    }
    let labels: Vec<&str> = ruleset.config_rules().iter().map(ConfigRule::label).collect();
    assert_eq!(
        labels,
        vec!["write erase", "erase", "reload", "delete", "format"]
    );
    assert!(ruleset.blocks_pipe_redirect());
}

#[rstest]
#[case::lowercase("junos", Vendor::Junos)]
#[case::mixed_case("FortiNet", Vendor::Fortinet)]
#[case::cisco("CISCO", Vendor::Cisco)]
fn vendor_parses_case_insensitively(#[case] input: &str, #[case] expected: Vendor) {
    assert_eq!(input.parse::<Vendor>().ok(), Some(expected));
}

#[test]
fn unknown_vendor_is_rejected() {
    assert!("arista-eos-x".parse::<Vendor>().is_err());
}

#[test]
fn presets_extend_rather_than_reorder_generic_rules() {
    let generic = Ruleset::default();
    let junos = Ruleset::for_vendor(Vendor::Junos);
    let prefix = junos
        .config_rules()
        .get(..generic.config_rules().len())
        .expect("junos keeps the generic rules");
    assert_eq!(prefix, generic.config_rules());
}

#[test]
fn builders_leave_the_base_ruleset_untouched() {
    let base = Ruleset::default();
    let derived = base
        .clone()
        .with_block_words(["ping"])
        .with_pipe_redirect_blocking(false);
    assert!(base.block_words().contains("reload"));
    assert!(!derived.block_words().contains("reload"));
    assert!(derived.block_words().contains("ping"));
    assert!(!derived.blocks_pipe_redirect());
}
