//! Loads configuration from the real process environment.

use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard, OnceLock};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use netmcp_config::{Inventory, TLS_VERIFY_ENV, TlsPolicy};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Applies environment overrides and restores them on drop.
struct EnvHarness {
    overrides: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvHarness {
    fn new() -> Self {
        Self {
            overrides: Vec::new(),
            _lock: lock_env(),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Serialised by `ENV_MUTEX`.
        unsafe { std::env::set_var(key, value) };
        self.overrides.push((key.to_owned(), previous));
    }

    fn unset(&mut self, key: &str) {
        let previous = std::env::var_os(key);
        unsafe { std::env::remove_var(key) };
        self.overrides.push((key.to_owned(), previous));
    }
}

impl Drop for EnvHarness {
    fn drop(&mut self) {
        while let Some((key, value)) = self.overrides.pop() {
            match value {
                Some(previous) => unsafe { std::env::set_var(&key, previous) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> EnvHarness {
    EnvHarness::new()
}

#[rstest]
fn single_device_from_process_environment(mut harness: EnvHarness) {
    harness.unset("NETMCPTEST_DEVICES_JSON");
    harness.set("NETMCPTEST_HOST", "198.51.100.7");
    harness.set("NETMCPTEST_PORT", "830");

    let inventory = Inventory::from_env("NETMCPTEST").expect("inventory loads");
    let device = inventory.get("default").expect("default device");
    assert_eq!(device.host(), "198.51.100.7");
    assert_eq!(device.port(), 830);
}

#[rstest]
fn devices_file_hides_single_device_variables(mut harness: EnvHarness) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("inventory.json");
    fs::write(&path, r#"{"edge1": {"host": "203.0.113.1"}}"#).expect("write inventory");

    harness.set(
        "NETMCPFILE_DEVICES_JSON",
        path.to_str().expect("utf-8 temp path"),
    );
    harness.set("NETMCPFILE_HOST", "203.0.113.99");

    let first = Inventory::from_env("NETMCPFILE").expect("inventory loads");
    let second = Inventory::from_env("NETMCPFILE").expect("inventory reloads");
    assert_eq!(first, second);
    assert_eq!(first.names().collect::<Vec<_>>(), vec!["edge1"]);
    assert!(!first.contains("default"));
}

#[rstest]
#[case::unset(None, false)]
#[case::disabled(Some("False"), false)]
#[case::enabled(Some("true"), true)]
fn tls_policy_reads_toggle(
    mut harness: EnvHarness,
    #[case] value: Option<&str>,
    #[case] verifies: bool,
) {
    match value {
        Some(raw) => harness.set(TLS_VERIFY_ENV, raw),
        None => harness.unset(TLS_VERIFY_ENV),
    }
    assert_eq!(TlsPolicy::from_env().verifies_certificates(), verifies);
}
