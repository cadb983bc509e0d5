//! Node identity (`myid`)

use crate::error::{QuorumError, QuorumResult};
use std::fmt;

/// Server id written to `data/myid`. Derived from the node's ordinal and
/// stable for the node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdentity(u64);

impl NodeIdentity {
    /// `None` when the ordinal is the largest `u64` and has no successor
    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        ordinal.checked_add(1).map(Self)
    }

    /// Parse a unit name of the form `<application>/<ordinal>`
    pub fn from_unit_name(name: &str) -> QuorumResult<Self> {
        let invalid = || QuorumError::InvalidNodeName {
            name: name.to_string(),
        };
        let (application, ordinal) = name.rsplit_once('/').ok_or_else(invalid)?;
        if application.is_empty() {
            return Err(invalid());
        }
        if ordinal.is_empty() || !ordinal.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let ordinal: u64 = ordinal.parse().map_err(|_| invalid())?;
        Self::from_ordinal(ordinal).ok_or_else(invalid)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    /// Contents of the `myid` file
    pub fn render(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
