//! Default values for the desired-state document
//!
//! Centralized so the CLI help, the loader and the tests agree.

pub use crate::properties::{
    DEFAULT_INIT_LIMIT, DEFAULT_KEYSTORE_TYPE, DEFAULT_SYNC_LIMIT, DEFAULT_TICK_TIME,
    DEFAULT_TRUSTSTORE_TYPE,
};

pub const DEFAULT_DATA_DIR: &str = "/data/zookeeper";
pub const DEFAULT_UNIT_NAME: &str = "zookeeper/0";
pub const DEFAULT_ENVIRONMENT_FILE: &str = crate::paths::DEFAULT_ENVIRONMENT_FILE;

// Environment overrides
pub const ENV_DATA_DIR: &str = "QUORUM_DATA_DIR";
pub const ENV_UNIT_NAME: &str = "QUORUM_UNIT_NAME";
pub const ENV_ENVIRONMENT_FILE: &str = "QUORUM_ENVIRONMENT_FILE";
pub const ENV_INIT_LIMIT: &str = "QUORUM_INIT_LIMIT";
pub const ENV_SYNC_LIMIT: &str = "QUORUM_SYNC_LIMIT";
pub const ENV_TICK_TIME: &str = "QUORUM_TICK_TIME";
pub const ENV_TLS_ENABLED: &str = "QUORUM_TLS_ENABLED";
pub const ENV_SECURITY_STATE: &str = "QUORUM_SECURITY_STATE";
pub const ENV_QUORUM_ENCRYPTED: &str = "QUORUM_QUORUM_ENCRYPTED";
