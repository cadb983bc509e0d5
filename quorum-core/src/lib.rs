//! Configuration synthesis for coordination-service ensemble nodes
//!
//! Builds the static properties file, the JAAS file, the JVM options and the
//! node identity for one node, carries the server-managed dynamic config
//! pointer across rewrites, and emits the right flags for each stage of a
//! plaintext <-> TLS quorum migration.

pub mod auth;
pub mod common;
pub mod config;
pub mod continuity;
pub mod error;
pub mod identity;
pub mod launch;
pub mod migration;
pub mod partition;
pub mod paths;
pub mod properties;
pub mod store;
pub mod synthesizer;

pub use auth::{generate_auth, ClientRegistration, CredentialSet};
pub use config::{DesiredState, DesiredStateBuilder};
pub use continuity::{current_dynamic_pointer, DynamicConfigPointer, PointerSource};
pub use error::{QuorumError, QuorumResult};
pub use identity::NodeIdentity;
pub use migration::{ClusterSecurity, ClusterSecurityState, MigrationStage, TransitionFlags};
pub use partition::static_properties;
pub use paths::ConfigPaths;
pub use properties::{assemble, PropertyList, TlsSettings, Tuning};
pub use store::{ConfigStore, MockConfigStore, TokioConfigStore};
pub use synthesizer::{NodeArtifacts, QuorumSynthesizer, ReconcileReport};
