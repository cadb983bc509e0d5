use quorum_core::config::{
    ENV_INIT_LIMIT, ENV_QUORUM_ENCRYPTED, ENV_SECURITY_STATE, ENV_TLS_ENABLED, ENV_UNIT_NAME,
};
use quorum_core::{ClusterSecurityState, DesiredState, QuorumError, Tuning};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
#[serial]
async fn test_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "desired.toml",
        r#"
clients = [1]

[node]
data_dir = "/srv/zk"
unit_name = "zookeeper/3"

[tuning]
init_limit = 10
sync_limit = 5
tick_time = 3000

[credentials]
sync_password = "s"
super_password = "S"
"#,
    );

    let state = DesiredState::load(&path).await.unwrap();
    assert_eq!(state.tuning, Tuning::new(10, 5, 3000));
    assert_eq!(state.identity().unwrap().id(), 4);
    assert_eq!(state.clients.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_load_json() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "desired.json",
        r#"{
            "node": {"unit_name": "zookeeper/0"},
            "security": {"state": "tls", "quorum_encrypted": true}
        }"#,
    );

    let state = DesiredState::load(&path).await.unwrap();
    assert_eq!(state.security.state, ClusterSecurityState::Tls);
    assert!(state.security.quorum_encrypted);
}

#[tokio::test]
#[serial]
async fn test_load_rejects_non_positive_tuning() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "desired.toml", "[tuning]\ntick_time = 0\n");

    let err = DesiredState::load(&path).await.unwrap_err();
    assert!(matches!(err, QuorumError::InvalidConfig { .. }));
}

#[test]
#[serial]
fn test_environment_override() {
    std::env::set_var(ENV_INIT_LIMIT, "42");
    std::env::set_var(ENV_TLS_ENABLED, "true");
    std::env::set_var(ENV_SECURITY_STATE, "migrating-to-tls");

    let mut state = DesiredState::default();
    let result = state.apply_env_overrides();

    std::env::remove_var(ENV_INIT_LIMIT);
    std::env::remove_var(ENV_TLS_ENABLED);
    std::env::remove_var(ENV_SECURITY_STATE);

    result.unwrap();
    assert_eq!(state.tuning.init_limit, 42);
    assert!(state.tls.enabled);
    assert_eq!(state.security.state, ClusterSecurityState::MigratingToTls);
}

#[test]
#[serial]
fn test_invalid_environment_override() {
    std::env::set_var(ENV_INIT_LIMIT, "lots");
    let mut state = DesiredState::default();
    let result = state.apply_env_overrides();
    std::env::remove_var(ENV_INIT_LIMIT);

    assert!(matches!(result, Err(QuorumError::InvalidConfig { .. })));
}

#[test]
#[serial]
fn test_boolean_override_spellings() {
    for (raw, expected) in [("1", true), ("YES", true), ("on", true), ("0", false), ("No", false)] {
        std::env::set_var(ENV_QUORUM_ENCRYPTED, raw);
        let mut state = DesiredState::default();
        state.security.quorum_encrypted = !expected;
        let result = state.apply_env_overrides();
        std::env::remove_var(ENV_QUORUM_ENCRYPTED);

        result.unwrap();
        assert_eq!(state.security.quorum_encrypted, expected, "{}", raw);
    }

    std::env::set_var(ENV_TLS_ENABLED, "enabled");
    let result = DesiredState::default().apply_env_overrides();
    std::env::remove_var(ENV_TLS_ENABLED);
    assert!(matches!(result, Err(QuorumError::InvalidConfig { .. })));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_non_unicode_override_is_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    std::env::set_var(ENV_UNIT_NAME, OsStr::from_bytes(b"zookeeper/\xff"));
    let mut state = DesiredState::default();
    let result = state.apply_env_overrides();
    std::env::remove_var(ENV_UNIT_NAME);

    assert!(matches!(result, Err(QuorumError::InvalidConfig { .. })));
}
