//! JAAS login-module configuration
//!
//! Three sections are generated: `QuorumServer` and `QuorumLearner` for
//! SASL-authenticated quorum traffic, and `Server` for client sessions.

use crate::error::{QuorumError, QuorumResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

pub const DIGEST_LOGIN_MODULE: &str = "org.apache.zookeeper.server.auth.DigestLoginModule";
pub const SUPER_USER: &str = "super";
pub const SYNC_USER: &str = "sync";

/// Read-only snapshot of the credentials shared across the ensemble
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSet {
    pub sync_password: Option<String>,
    pub super_password: Option<String>,

    /// Password per client username (`relation-<id>`)
    pub client_passwords: BTreeMap<String, String>,
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("sync_password", &self.sync_password.as_ref().map(|_| "<redacted>"))
            .field("super_password", &self.super_password.as_ref().map(|_| "<redacted>"))
            .field("clients", &self.client_passwords.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialSet {
    pub fn sync_password(&self) -> QuorumResult<&str> {
        non_empty(self.sync_password.as_deref())
            .ok_or_else(|| QuorumError::missing_credential("sync-password"))
    }

    pub fn super_password(&self) -> QuorumResult<&str> {
        non_empty(self.super_password.as_deref())
            .ok_or_else(|| QuorumError::missing_credential("super-password"))
    }

    pub fn client_password(&self, username: &str) -> Option<&str> {
        non_empty(self.client_passwords.get(username).map(String::as_str))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// An active client registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRegistration {
    pub id: u64,
}

impl ClientRegistration {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn username(&self) -> String {
        format!("relation-{}", self.id)
    }
}

/// A client username with its resolved password
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Resolve a credential for each registration. Registrations whose password
/// has not been issued yet are skipped; a later reconciliation picks them up.
pub fn client_credentials(
    credentials: &CredentialSet,
    registrations: &[ClientRegistration],
) -> Vec<ClientCredential> {
    registrations
        .iter()
        .filter_map(|registration| {
            let username = registration.username();
            match credentials.client_password(&username) {
                Some(password) => Some(ClientCredential {
                    username,
                    password: password.to_string(),
                }),
                None => {
                    debug!("No password issued yet for {}, skipping", username);
                    None
                }
            }
        })
        .collect()
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render the JAAS file from already-resolved credentials
pub fn render_jaas(
    sync_password: &str,
    super_password: &str,
    clients: &[ClientCredential],
) -> String {
    let mut out = String::new();

    out.push_str("QuorumServer {\n");
    out.push_str(&format!("    {} required\n", DIGEST_LOGIN_MODULE));
    out.push_str(&format!("    user_{}={};\n", SYNC_USER, quoted(sync_password)));
    out.push_str("};\n");

    out.push_str("QuorumLearner {\n");
    out.push_str(&format!("    {} required\n", DIGEST_LOGIN_MODULE));
    out.push_str(&format!("    username={}\n", quoted(SYNC_USER)));
    out.push_str(&format!("    password={};\n", quoted(sync_password)));
    out.push_str("};\n");

    out.push_str("Server {\n");
    out.push_str(&format!("    {} required\n", DIGEST_LOGIN_MODULE));
    for client in clients {
        out.push_str(&format!("    user_{}={}\n", client.username, quoted(&client.password)));
    }
    out.push_str(&format!("    user_{}={};\n", SUPER_USER, quoted(super_password)));
    out.push_str("};\n");

    out
}

/// Build the JAAS file for the current credential snapshot.
///
/// Fails with `MissingCredential` when the sync or super password has not
/// been generated yet; the ensemble cannot authenticate without them.
pub fn generate_auth(
    credentials: &CredentialSet,
    registrations: &[ClientRegistration],
) -> QuorumResult<String> {
    let sync_password = credentials.sync_password()?;
    let super_password = credentials.super_password()?;
    let clients = client_credentials(credentials, registrations);
    Ok(render_jaas(sync_password, super_password, &clients))
}
