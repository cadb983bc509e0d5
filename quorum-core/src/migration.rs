//! Quorum security-mode migration
//!
//! Moving an ensemble between a plaintext quorum and a TLS quorum takes three
//! rolling restarts in either direction:
//!
//! ```text
//! PLAINTEXT -> add portUnification -> add sslQuorum    -> remove portUnification -> TLS
//! TLS       -> add portUnification -> remove sslQuorum -> remove portUnification -> PLAINTEXT
//! ```
//!
//! The caller owns the sequencing. This module only maps the current stage to
//! the flag lines a node must carry while that stage is rolled out.

use crate::error::{QuorumError, QuorumResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PORT_UNIFICATION_KEY: &str = "portUnification";
pub const SSL_QUORUM_KEY: &str = "sslQuorum";

/// Cluster-wide security mode as recorded in the shared cluster state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterSecurityState {
    #[default]
    Plaintext,
    MigratingToTls,
    Tls,
    MigratingToPlaintext,
}

impl ClusterSecurityState {
    pub const ALL: [ClusterSecurityState; 4] = [
        ClusterSecurityState::Plaintext,
        ClusterSecurityState::MigratingToTls,
        ClusterSecurityState::Tls,
        ClusterSecurityState::MigratingToPlaintext,
    ];

    pub fn is_migrating(self) -> bool {
        matches!(
            self,
            ClusterSecurityState::MigratingToTls | ClusterSecurityState::MigratingToPlaintext
        )
    }

    /// Quorum encryption a stable state implies. `None` while migrating, since
    /// the quorum flag flips halfway through a migration.
    pub fn stable_encryption(self) -> Option<bool> {
        match self {
            ClusterSecurityState::Plaintext => Some(false),
            ClusterSecurityState::Tls => Some(true),
            ClusterSecurityState::MigratingToTls | ClusterSecurityState::MigratingToPlaintext => {
                None
            }
        }
    }
}

impl fmt::Display for ClusterSecurityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClusterSecurityState::Plaintext => "plaintext",
            ClusterSecurityState::MigratingToTls => "migrating-to-tls",
            ClusterSecurityState::Tls => "tls",
            ClusterSecurityState::MigratingToPlaintext => "migrating-to-plaintext",
        };
        f.write_str(name)
    }
}

impl FromStr for ClusterSecurityState {
    type Err = QuorumError;

    fn from_str(s: &str) -> QuorumResult<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "plaintext" => Ok(ClusterSecurityState::Plaintext),
            "migrating-to-tls" => Ok(ClusterSecurityState::MigratingToTls),
            "tls" => Ok(ClusterSecurityState::Tls),
            "migrating-to-plaintext" => Ok(ClusterSecurityState::MigratingToPlaintext),
            other => Err(QuorumError::invalid_config(
                "security.state",
                format!("unknown security state '{}'", other),
            )),
        }
    }
}

/// Security state of the cluster together with the resolved quorum mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSecurity {
    pub state: ClusterSecurityState,

    /// Whether the quorum currently runs with `sslQuorum`
    pub quorum_encrypted: bool,
}

impl ClusterSecurity {
    pub fn new(state: ClusterSecurityState, quorum_encrypted: bool) -> Self {
        Self {
            state,
            quorum_encrypted,
        }
    }

    pub fn plaintext() -> Self {
        Self::new(ClusterSecurityState::Plaintext, false)
    }

    pub fn tls() -> Self {
        Self::new(ClusterSecurityState::Tls, true)
    }

    /// A stable state whose quorum flag disagrees with it
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            self.state.stable_encryption(),
            Some(expected) if expected != self.quorum_encrypted
        )
    }

    pub fn flags(&self) -> TransitionFlags {
        TransitionFlags::resolve(self.state, self.quorum_encrypted)
    }
}

/// Flags appended after every other property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionFlags {
    pub port_unification: bool,
    pub ssl_quorum: bool,
}

impl TransitionFlags {
    pub fn resolve(state: ClusterSecurityState, quorum_encrypted: bool) -> Self {
        Self {
            port_unification: state.is_migrating(),
            ssl_quorum: quorum_encrypted,
        }
    }

    /// Property lines in the order the migration protocol needs them
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if self.port_unification {
            lines.push(format!("{}=true", PORT_UNIFICATION_KEY));
        }
        if self.ssl_quorum {
            lines.push(format!("{}=true", SSL_QUORUM_KEY));
        }
        lines
    }
}

/// One rolling-restart stage of a quorum security migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationStage {
    Plaintext,
    /// Towards TLS, stage 1
    AddPortUnification,
    /// Towards TLS, stage 2
    AddSslQuorum,
    /// Towards TLS, stage 3
    RemovePortUnification,
    Tls,
    /// Towards plaintext, stage 1
    AddPortUnificationForPlaintext,
    /// Towards plaintext, stage 2
    RemoveSslQuorum,
    /// Towards plaintext, stage 3
    RemovePortUnificationForPlaintext,
}

impl MigrationStage {
    pub const ALL: [MigrationStage; 8] = [
        MigrationStage::Plaintext,
        MigrationStage::AddPortUnification,
        MigrationStage::AddSslQuorum,
        MigrationStage::RemovePortUnification,
        MigrationStage::Tls,
        MigrationStage::AddPortUnificationForPlaintext,
        MigrationStage::RemoveSslQuorum,
        MigrationStage::RemovePortUnificationForPlaintext,
    ];

    /// Cluster security a node observes while this stage rolls out
    pub fn security(self) -> ClusterSecurity {
        use ClusterSecurityState::*;
        match self {
            MigrationStage::Plaintext => ClusterSecurity::new(Plaintext, false),
            MigrationStage::AddPortUnification => ClusterSecurity::new(MigratingToTls, false),
            MigrationStage::AddSslQuorum => ClusterSecurity::new(MigratingToTls, true),
            MigrationStage::RemovePortUnification => ClusterSecurity::new(Tls, true),
            MigrationStage::Tls => ClusterSecurity::new(Tls, true),
            MigrationStage::AddPortUnificationForPlaintext => {
                ClusterSecurity::new(MigratingToPlaintext, true)
            }
            MigrationStage::RemoveSslQuorum => ClusterSecurity::new(MigratingToPlaintext, false),
            MigrationStage::RemovePortUnificationForPlaintext => {
                ClusterSecurity::new(Plaintext, false)
            }
        }
    }

    pub fn flags(self) -> TransitionFlags {
        self.security().flags()
    }

    pub fn is_transient(self) -> bool {
        !matches!(self, MigrationStage::Plaintext | MigrationStage::Tls)
    }

    /// Stage that follows this one once its rolling restart has completed.
    /// Stable stages have no successor.
    pub fn next(self) -> Option<MigrationStage> {
        match self {
            MigrationStage::Plaintext | MigrationStage::Tls => None,
            MigrationStage::AddPortUnification => Some(MigrationStage::AddSslQuorum),
            MigrationStage::AddSslQuorum => Some(MigrationStage::RemovePortUnification),
            MigrationStage::RemovePortUnification => Some(MigrationStage::Tls),
            MigrationStage::AddPortUnificationForPlaintext => Some(MigrationStage::RemoveSslQuorum),
            MigrationStage::RemoveSslQuorum => {
                Some(MigrationStage::RemovePortUnificationForPlaintext)
            }
            MigrationStage::RemovePortUnificationForPlaintext => Some(MigrationStage::Plaintext),
        }
    }

    /// Stages the ensemble rolls through, one rolling restart each, to move
    /// the quorum from one encryption mode to the other.
    pub fn plan(from_encrypted: bool, to_encrypted: bool) -> Vec<MigrationStage> {
        match (from_encrypted, to_encrypted) {
            (false, true) => vec![
                MigrationStage::AddPortUnification,
                MigrationStage::AddSslQuorum,
                MigrationStage::RemovePortUnification,
            ],
            (true, false) => vec![
                MigrationStage::AddPortUnificationForPlaintext,
                MigrationStage::RemoveSslQuorum,
                MigrationStage::RemovePortUnificationForPlaintext,
            ],
            _ => Vec::new(),
        }
    }

    /// Stage matching an observed cluster security. Stable states map to the
    /// stable stage; inconsistent combinations have no stage.
    pub fn from_security(security: ClusterSecurity) -> Option<MigrationStage> {
        use ClusterSecurityState::*;
        match (security.state, security.quorum_encrypted) {
            (Plaintext, false) => Some(MigrationStage::Plaintext),
            (Tls, true) => Some(MigrationStage::Tls),
            (MigratingToTls, false) => Some(MigrationStage::AddPortUnification),
            (MigratingToTls, true) => Some(MigrationStage::AddSslQuorum),
            (MigratingToPlaintext, true) => Some(MigrationStage::AddPortUnificationForPlaintext),
            (MigratingToPlaintext, false) => Some(MigrationStage::RemoveSslQuorum),
            (Plaintext, true) | (Tls, false) => None,
        }
    }
}

impl fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationStage::Plaintext => "plaintext",
            MigrationStage::AddPortUnification => "add-port-unification",
            MigrationStage::AddSslQuorum => "add-ssl-quorum",
            MigrationStage::RemovePortUnification => "remove-port-unification",
            MigrationStage::Tls => "tls",
            MigrationStage::AddPortUnificationForPlaintext => "add-port-unification-for-plaintext",
            MigrationStage::RemoveSslQuorum => "remove-ssl-quorum",
            MigrationStage::RemovePortUnificationForPlaintext => {
                "remove-port-unification-for-plaintext"
            }
        };
        f.write_str(name)
    }
}
