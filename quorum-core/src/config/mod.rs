//! Desired-state document for one node
//!
//! Everything a reconciliation needs from the outside world: node naming,
//! tuning, TLS material, the cluster security state and the credential
//! snapshot. Loaded from TOML (or JSON/YAML), then overridden from the
//! environment and validated.
//!
//! # Example
//!
//! ```toml
//! clients = [3, 7]
//!
//! [node]
//! data_dir = "/data/zookeeper"
//! unit_name = "zookeeper/2"
//!
//! [tuning]
//! init_limit = 10
//! sync_limit = 5
//! tick_time = 3000
//!
//! [tls]
//! enabled = true
//! keystore_password = "changeit"
//!
//! [security]
//! state = "migrating-to-tls"
//! quorum_encrypted = false
//!
//! [credentials]
//! sync_password = "..."
//! super_password = "..."
//!
//! [credentials.client_passwords]
//! relation-3 = "..."
//! ```

pub mod defaults;

use crate::auth::{ClientRegistration, CredentialSet};
use crate::common::file_io::read_config_file;
use crate::error::{QuorumError, QuorumResult};
use crate::identity::NodeIdentity;
use crate::migration::{ClusterSecurity, ClusterSecurityState};
use crate::paths::ConfigPaths;
use crate::properties::{TlsSettings, Tuning};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use defaults::*;

/// Node naming and filesystem location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Root under which `config/` is laid out
    pub data_dir: PathBuf,

    /// `<application>/<ordinal>`, source of the node identity
    pub unit_name: String,

    /// Where the JVM options line is written
    pub environment_file: PathBuf,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            unit_name: DEFAULT_UNIT_NAME.to_string(),
            environment_file: PathBuf::from(DEFAULT_ENVIRONMENT_FILE),
        }
    }
}

/// Complete desired state for one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesiredState {
    pub node: NodeConfig,
    pub tuning: Tuning,
    pub tls: TlsSettings,
    pub security: ClusterSecurity,
    pub credentials: CredentialSet,

    /// Active client registrations
    pub clients: Vec<ClientRegistration>,
}

/// Value of an override variable, `None` when unset
fn env_var(key: &str) -> QuorumResult<Option<String>> {
    match std::env::var(key) {
        Ok(raw) => Ok(Some(raw)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(raw)) => Err(QuorumError::invalid_config(
            key,
            format!("value {:?} is not valid unicode", raw),
        )),
    }
}

fn env_parse<T: FromStr>(key: &str) -> QuorumResult<Option<T>> {
    match env_var(key)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| QuorumError::invalid_config(key, format!("cannot parse '{}'", raw))),
        None => Ok(None),
    }
}

fn env_bool(key: &str) -> QuorumResult<Option<bool>> {
    match env_var(key)? {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(QuorumError::invalid_config(
                key,
                format!("expected a boolean, got '{}'", raw),
            )),
        },
        None => Ok(None),
    }
}

impl DesiredState {
    /// Load from a file, apply environment overrides and validate
    pub async fn load<P: AsRef<Path>>(path: P) -> QuorumResult<Self> {
        let mut state: DesiredState = read_config_file(path, "desired state").await?;
        state.apply_env_overrides()?;
        state.validate()?;
        Ok(state)
    }

    /// Apply `QUORUM_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> QuorumResult<()> {
        if let Some(dir) = env_var(ENV_DATA_DIR)? {
            self.node.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = env_var(ENV_UNIT_NAME)? {
            self.node.unit_name = name;
        }
        if let Some(file) = env_var(ENV_ENVIRONMENT_FILE)? {
            self.node.environment_file = PathBuf::from(file);
        }

        if let Some(value) = env_parse(ENV_INIT_LIMIT)? {
            self.tuning.init_limit = value;
        }
        if let Some(value) = env_parse(ENV_SYNC_LIMIT)? {
            self.tuning.sync_limit = value;
        }
        if let Some(value) = env_parse(ENV_TICK_TIME)? {
            self.tuning.tick_time = value;
        }

        if let Some(enabled) = env_bool(ENV_TLS_ENABLED)? {
            self.tls.enabled = enabled;
        }
        if let Some(state) = env_parse::<ClusterSecurityState>(ENV_SECURITY_STATE)? {
            self.security.state = state;
        }
        if let Some(encrypted) = env_bool(ENV_QUORUM_ENCRYPTED)? {
            self.security.quorum_encrypted = encrypted;
        }
        Ok(())
    }

    /// Checks that do not depend on credentials having been issued
    pub fn validate(&self) -> QuorumResult<()> {
        if self.node.data_dir.as_os_str().is_empty() {
            return Err(QuorumError::invalid_config("node.data_dir", "cannot be empty"));
        }
        NodeIdentity::from_unit_name(&self.node.unit_name)?;
        self.tuning.validate()?;

        if self.tls.keystore_type.is_empty() || self.tls.truststore_type.is_empty() {
            return Err(QuorumError::invalid_config(
                "tls",
                "keystore_type and truststore_type cannot be empty",
            ));
        }
        Ok(())
    }

    pub fn paths(&self) -> ConfigPaths {
        ConfigPaths::new(&self.node.data_dir)
            .with_environment_file(self.node.environment_file.clone())
    }

    pub fn identity(&self) -> QuorumResult<NodeIdentity> {
        NodeIdentity::from_unit_name(&self.node.unit_name)
    }
}

/// Builder for DesiredState
pub struct DesiredStateBuilder {
    state: DesiredState,
}

impl DesiredStateBuilder {
    pub fn new() -> Self {
        Self {
            state: DesiredState::default(),
        }
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state.node.data_dir = dir.into();
        self
    }

    pub fn unit_name(mut self, name: impl Into<String>) -> Self {
        self.state.node.unit_name = name.into();
        self
    }

    pub fn environment_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.state.node.environment_file = file.into();
        self
    }

    pub fn tuning(mut self, init_limit: i64, sync_limit: i64, tick_time: i64) -> Self {
        self.state.tuning = Tuning::new(init_limit, sync_limit, tick_time);
        self
    }

    pub fn tls(mut self, tls: TlsSettings) -> Self {
        self.state.tls = tls;
        self
    }

    pub fn security(mut self, state: ClusterSecurityState, quorum_encrypted: bool) -> Self {
        self.state.security = ClusterSecurity::new(state, quorum_encrypted);
        self
    }

    pub fn sync_password(mut self, password: impl Into<String>) -> Self {
        self.state.credentials.sync_password = Some(password.into());
        self
    }

    pub fn super_password(mut self, password: impl Into<String>) -> Self {
        self.state.credentials.super_password = Some(password.into());
        self
    }

    /// Register a client, with its password if one has been issued
    pub fn client(mut self, id: u64, password: Option<&str>) -> Self {
        let registration = ClientRegistration::new(id);
        if let Some(password) = password {
            self.state
                .credentials
                .client_passwords
                .insert(registration.username(), password.to_string());
        }
        self.state.clients.push(registration);
        self
    }

    pub fn build(self) -> QuorumResult<DesiredState> {
        self.state.validate()?;
        Ok(self.state)
    }
}

impl Default for DesiredStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = DesiredState::default();
        assert_eq!(state.tuning, Tuning::new(5, 2, 2000));
        assert_eq!(state.node.data_dir, PathBuf::from("/data/zookeeper"));
        assert_eq!(state.tls.truststore_type, "JKS");
        assert_eq!(state.tls.keystore_type, "PKCS12");
        assert_eq!(state.security, ClusterSecurity::plaintext());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let state = DesiredStateBuilder::new()
            .data_dir("/srv/zk")
            .unit_name("zookeeper/4")
            .tuning(10, 5, 3000)
            .security(ClusterSecurityState::MigratingToTls, false)
            .client(3, Some("pw3"))
            .client(4, None)
            .build()
            .unwrap();

        assert_eq!(state.identity().unwrap().id(), 5);
        assert_eq!(state.clients.len(), 2);
        assert_eq!(state.credentials.client_password("relation-3"), Some("pw3"));
        assert_eq!(state.credentials.client_password("relation-4"), None);
        assert_eq!(
            state.paths().properties,
            PathBuf::from("/srv/zk/config/zookeeper.properties")
        );
    }

    #[test]
    fn test_builder_rejects_invalid() {
        assert!(DesiredStateBuilder::new()
            .tuning(0, 5, 3000)
            .build()
            .is_err());
        assert!(DesiredStateBuilder::new()
            .unit_name("zookeeper")
            .build()
            .is_err());
        assert!(DesiredStateBuilder::new()
            .data_dir("")
            .build()
            .is_err());
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
clients = [3, 7]

[node]
data_dir = "/srv/zk"
unit_name = "zookeeper/1"

[tuning]
init_limit = 10

[tls]
enabled = true
keystore_password = "storepw"

[security]
state = "migrating-to-plaintext"
quorum_encrypted = true

[credentials]
sync_password = "s"
super_password = "S"

[credentials.client_passwords]
relation-3 = "c3"
"#;
        let state: DesiredState = toml::from_str(content).unwrap();
        assert_eq!(state.tuning, Tuning::new(10, 2, 2000));
        assert_eq!(state.clients, vec![ClientRegistration::new(3), ClientRegistration::new(7)]);
        assert!(state.tls.enabled);
        assert_eq!(state.tls.keystore_type, "PKCS12");
        assert_eq!(
            state.security,
            ClusterSecurity::new(ClusterSecurityState::MigratingToPlaintext, true)
        );
        assert_eq!(state.credentials.client_password("relation-3"), Some("c3"));
    }
}
