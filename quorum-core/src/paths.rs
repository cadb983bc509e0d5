//! On-disk layout of a node's configuration

use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = "config";
pub const PROPERTIES_FILE: &str = "zookeeper.properties";
pub const DYNAMIC_PROPERTIES_FILE: &str = "zookeeper-dynamic.properties";
pub const JAAS_FILE: &str = "zookeeper-jaas.cfg";
pub const KEYSTORE_FILE: &str = "keystore.p12";
pub const TRUSTSTORE_FILE: &str = "truststore.jks";
pub const MYID_FILE: &str = "myid";
pub const DEFAULT_ENVIRONMENT_FILE: &str = "/etc/environment";
pub const SERVER_ENTRYPOINT: &str = "/opt/kafka/bin/zookeeper-server-start.sh";

/// Every path derived from the node's data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub properties: PathBuf,
    pub dynamic_properties: PathBuf,
    pub jaas: PathBuf,
    pub keystore: PathBuf,
    pub truststore: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub myid: PathBuf,
    pub environment: PathBuf,
}

impl ConfigPaths {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let config_dir = data_dir.as_ref().join(CONFIG_DIR);
        let server_data = config_dir.join("data");
        Self {
            properties: config_dir.join(PROPERTIES_FILE),
            dynamic_properties: config_dir.join(DYNAMIC_PROPERTIES_FILE),
            jaas: config_dir.join(JAAS_FILE),
            keystore: config_dir.join(KEYSTORE_FILE),
            truststore: config_dir.join(TRUSTSTORE_FILE),
            myid: server_data.join(MYID_FILE),
            log_dir: config_dir.join("log"),
            data_dir: server_data,
            environment: PathBuf::from(DEFAULT_ENVIRONMENT_FILE),
            config_dir,
        }
    }

    pub fn with_environment_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.environment = path.into();
        self
    }
}
