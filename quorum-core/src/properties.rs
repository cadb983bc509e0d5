//! Static properties assembly
//!
//! The property list is built in a fixed order: tuning, operational baseline,
//! directories and the dynamic config pointer, the TLS block, and finally the
//! migration flags. Duplicate keys are legal and the server keeps the last
//! one, which is why the flags must stay at the end.

use crate::continuity::DynamicConfigPointer;
use crate::error::{QuorumError, QuorumResult};
use crate::migration::ClusterSecurity;
use crate::partition;
use crate::paths::ConfigPaths;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Operational defaults, version 1
pub const DEFAULT_PROPERTIES: &[&str] = &[
    "syncEnabled=true",
    "maxClientCnxns=60",
    "minSessionTimeout=4000",
    "maxSessionTimeout=40000",
    "autopurge.snapRetainCount=3",
    "autopurge.purgeInterval=0",
    "reconfigEnabled=true",
    "standaloneEnabled=false",
    "4lw.commands.whitelist=mntr,srvr",
    "DigestAuthenticationProvider.digestAlg=SHA3-256",
    "quorum.auth.enableSasl=true",
    "quorum.auth.learnerRequireSasl=true",
    "quorum.auth.serverRequireSasl=true",
    "authProvider.sasl=org.apache.zookeeper.server.auth.SASLAuthenticationProvider",
    "audit.enable=true",
];

/// TLS transport defaults; store types are appended separately
pub const TLS_PROPERTIES: &[&str] = &[
    "secureClientPort=2182",
    "ssl.clientAuth=none",
    "ssl.quorum.clientAuth=none",
    "ssl.client.enable=true",
    "clientCnxnSocket=org.apache.zookeeper.ClientCnxnSocketNetty",
    "serverCnxnFactory=org.apache.zookeeper.server.NettyServerCnxnFactory",
    "ssl.quorum.hostnameVerification=false",
    "ssl.hostnameVerification=false",
];

pub const DEFAULT_INIT_LIMIT: i64 = 5;
pub const DEFAULT_SYNC_LIMIT: i64 = 2;
pub const DEFAULT_TICK_TIME: i64 = 2000;
pub const DEFAULT_TRUSTSTORE_TYPE: &str = "JKS";
pub const DEFAULT_KEYSTORE_TYPE: &str = "PKCS12";

/// Ordered `key=value` lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyList(Vec<String>);

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    pub fn push_property(&mut self, key: &str, value: impl fmt::Display) {
        self.0.push(format!("{}={}", key, value));
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(lines.into_iter().map(Into::into));
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn into_lines(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.0.iter().any(|l| l == line)
    }

    /// Effective value of `key`, last occurrence wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find_map(|line| match line.split_once('=') {
                Some((k, v)) if k.trim() == key => Some(v),
                _ => None,
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|line| partition::property_key(line))
    }

    /// Without the properties owned by dynamic reconfiguration
    pub fn to_static(&self) -> PropertyList {
        PropertyList(partition::static_properties(&self.0))
    }

    /// File contents, newline-joined
    pub fn render(&self) -> String {
        self.0.join("\n")
    }
}

impl fmt::Display for PropertyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Vec<String>> for PropertyList {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}

/// Leader/follower timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ticks a follower may take to connect and sync to the leader
    pub init_limit: i64,
    /// Ticks a follower may lag behind the leader
    pub sync_limit: i64,
    /// Length of a tick in milliseconds
    pub tick_time: i64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            init_limit: DEFAULT_INIT_LIMIT,
            sync_limit: DEFAULT_SYNC_LIMIT,
            tick_time: DEFAULT_TICK_TIME,
        }
    }
}

impl Tuning {
    pub fn new(init_limit: i64, sync_limit: i64, tick_time: i64) -> Self {
        Self {
            init_limit,
            sync_limit,
            tick_time,
        }
    }

    pub fn validate(&self) -> QuorumResult<()> {
        for (field, value) in [
            ("init-limit", self.init_limit),
            ("sync-limit", self.sync_limit),
            ("tick-time", self.tick_time),
        ] {
            if value <= 0 {
                return Err(QuorumError::invalid_config(
                    field,
                    format!("must be a positive integer, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// TLS inputs for the node
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    pub enabled: bool,

    /// Shared by the keystore and the truststore
    pub keystore_password: Option<String>,

    pub keystore_type: String,

    pub truststore_type: String,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            keystore_password: None,
            keystore_type: DEFAULT_KEYSTORE_TYPE.to_string(),
            truststore_type: DEFAULT_TRUSTSTORE_TYPE.to_string(),
        }
    }
}

impl fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSettings")
            .field("enabled", &self.enabled)
            .field("keystore_password", &self.keystore_password.as_ref().map(|_| "<redacted>"))
            .field("keystore_type", &self.keystore_type)
            .field("truststore_type", &self.truststore_type)
            .finish()
    }
}

impl TlsSettings {
    pub fn enabled(keystore_password: impl Into<String>) -> Self {
        Self {
            enabled: true,
            keystore_password: Some(keystore_password.into()),
            ..Default::default()
        }
    }

    fn password(&self) -> QuorumResult<&str> {
        self.keystore_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| QuorumError::missing_credential("keystore-password"))
    }
}

fn push_tls_properties(
    properties: &mut PropertyList,
    tls: &TlsSettings,
    paths: &ConfigPaths,
) -> QuorumResult<()> {
    let password = tls.password()?;
    let keystore = paths.keystore.display();
    let truststore = paths.truststore.display();

    properties.extend(TLS_PROPERTIES.iter().copied());
    properties.push_property("ssl.trustStore.type", &tls.truststore_type);
    properties.push_property("ssl.keyStore.type", &tls.keystore_type);

    properties.push_property("ssl.quorum.keyStore.location", &keystore);
    properties.push_property("ssl.quorum.trustStore.location", &truststore);
    properties.push_property("ssl.keyStore.location", &keystore);
    properties.push_property("ssl.trustStore.location", &truststore);

    properties.push_property("ssl.quorum.keyStore.password", password);
    properties.push_property("ssl.quorum.trustStore.password", password);
    properties.push_property("ssl.keyStore.password", password);
    properties.push_property("ssl.trustStore.password", password);
    Ok(())
}

/// Assemble the full property list for a node.
///
/// Pure apart from logging: the dynamic config pointer must already have been
/// recovered by the caller.
pub fn assemble(
    tuning: &Tuning,
    tls: &TlsSettings,
    security: ClusterSecurity,
    paths: &ConfigPaths,
    pointer: &DynamicConfigPointer,
) -> QuorumResult<PropertyList> {
    tuning.validate()?;

    if security.is_inconsistent() {
        warn!(
            "Cluster security state {} disagrees with quorum_encrypted={}, \
             following the quorum flag",
            security.state, security.quorum_encrypted
        );
    }
    if security.quorum_encrypted && !tls.enabled {
        warn!("sslQuorum requested while TLS is disabled on this node");
    }

    let mut properties = PropertyList::new();
    properties.push_property("initLimit", tuning.init_limit);
    properties.push_property("syncLimit", tuning.sync_limit);
    properties.push_property("tickTime", tuning.tick_time);

    properties.extend(DEFAULT_PROPERTIES.iter().copied());

    properties.push_property("dataDir", paths.data_dir.display());
    properties.push_property("dataLogDir", paths.log_dir.display());
    properties.push(pointer.line());

    if tls.enabled {
        push_tls_properties(&mut properties, tls, paths)?;
    }

    properties.extend(security.flags().lines());

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuity::{current_dynamic_pointer, DefaultReason};
    use crate::migration::ClusterSecurityState;

    fn pointer(paths: &ConfigPaths) -> DynamicConfigPointer {
        DynamicConfigPointer::default_for(&paths.dynamic_properties, DefaultReason::FirstBoot)
    }

    #[test]
    fn test_plaintext_layout() {
        let paths = ConfigPaths::new("/srv/zk");
        let props = assemble(
            &Tuning::new(10, 5, 3000),
            &TlsSettings::default(),
            ClusterSecurity::plaintext(),
            &paths,
            &pointer(&paths),
        )
        .unwrap();

        assert_eq!(&props.lines()[..3], &["initLimit=10", "syncLimit=5", "tickTime=3000"]);
        assert_eq!(props.len(), 3 + DEFAULT_PROPERTIES.len() + 3);
        assert_eq!(props.get("dataDir"), Some("/srv/zk/config/data"));
        assert_eq!(props.get("dataLogDir"), Some("/srv/zk/config/log"));
        assert_eq!(
            props.get("dynamicConfigFile"),
            Some("/srv/zk/config/zookeeper-dynamic.properties")
        );
        assert!(props.keys().all(|k| !k.starts_with("ssl")));
    }

    #[test]
    fn test_tls_block() {
        let paths = ConfigPaths::new("/srv/zk");
        let props = assemble(
            &Tuning::default(),
            &TlsSettings::enabled("storepw"),
            ClusterSecurity::tls(),
            &paths,
            &pointer(&paths),
        )
        .unwrap();

        assert_eq!(props.get("ssl.trustStore.type"), Some("JKS"));
        assert_eq!(props.get("ssl.keyStore.type"), Some("PKCS12"));
        assert_eq!(
            props.get("ssl.quorum.keyStore.location"),
            Some("/srv/zk/config/keystore.p12")
        );
        assert_eq!(
            props.get("ssl.trustStore.location"),
            Some("/srv/zk/config/truststore.jks")
        );
        assert_eq!(props.get("ssl.quorum.trustStore.password"), Some("storepw"));
        assert_eq!(props.lines().last().map(String::as_str), Some("sslQuorum=true"));
    }

    #[test]
    fn test_store_types_are_independent() {
        let paths = ConfigPaths::new("/srv/zk");
        let tls = TlsSettings {
            truststore_type: "PKCS12".to_string(),
            keystore_type: "JKS".to_string(),
            ..TlsSettings::enabled("pw")
        };
        let props = assemble(
            &Tuning::default(),
            &tls,
            ClusterSecurity::tls(),
            &paths,
            &pointer(&paths),
        )
        .unwrap();
        assert_eq!(props.get("ssl.trustStore.type"), Some("PKCS12"));
        assert_eq!(props.get("ssl.keyStore.type"), Some("JKS"));
    }

    #[test]
    fn test_tls_without_password() {
        let paths = ConfigPaths::new("/srv/zk");
        let tls = TlsSettings {
            enabled: true,
            ..Default::default()
        };
        let err = assemble(
            &Tuning::default(),
            &tls,
            ClusterSecurity::tls(),
            &paths,
            &pointer(&paths),
        )
        .unwrap_err();
        assert!(matches!(err, QuorumError::MissingCredential { .. }));
    }

    #[test]
    fn test_rejects_non_positive_tuning() {
        let paths = ConfigPaths::new("/srv/zk");
        for tuning in [Tuning::new(0, 5, 3000), Tuning::new(10, -1, 3000), Tuning::new(10, 5, 0)] {
            let err = assemble(
                &tuning,
                &TlsSettings::default(),
                ClusterSecurity::plaintext(),
                &paths,
                &pointer(&paths),
            )
            .unwrap_err();
            assert!(matches!(err, QuorumError::InvalidConfig { .. }));
        }
    }

    #[test]
    fn test_deployed_pointer_carried_forward() {
        let paths = ConfigPaths::new("/cfg");
        let deployed = current_dynamic_pointer(
            Some("dynamicConfigFile=/cfg/zookeeper-dynamic-v7.properties"),
            &paths.dynamic_properties,
        );
        let props = assemble(
            &Tuning::default(),
            &TlsSettings::default(),
            ClusterSecurity::new(ClusterSecurityState::MigratingToTls, false),
            &paths,
            &deployed,
        )
        .unwrap();
        assert!(props.contains("dynamicConfigFile=/cfg/zookeeper-dynamic-v7.properties"));
        assert_eq!(props.lines().last().map(String::as_str), Some("portUnification=true"));
    }

    #[test]
    fn test_get_last_writer_wins() {
        let props =
            PropertyList::from(vec!["a=1".to_string(), "b=2".to_string(), "a=3".to_string()]);
        assert_eq!(props.get("a"), Some("3"));
        assert_eq!(props.get("c"), None);
        assert_eq!(props.render(), "a=1\nb=2\na=3");
    }
}
