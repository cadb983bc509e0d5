//! Static/dynamic property split
//!
//! Once `reconfigEnabled` is set the server moves the client ports into the
//! dynamic file and strips them from the static one, so the desired static
//! configuration must not carry them either.

use std::collections::BTreeSet;
use tracing::debug;

pub const CLIENT_PORT_KEY: &str = "clientPort";
pub const SECURE_CLIENT_PORT_KEY: &str = "secureClientPort";

/// Keys owned by the dynamic reconfiguration subsystem
pub const DYNAMIC_KEYS: [&str; 2] = [CLIENT_PORT_KEY, SECURE_CLIENT_PORT_KEY];

/// Key of a `key=value` line, `None` for lines that are not properties
pub fn property_key(line: &str) -> Option<&str> {
    line.split_once('=').map(|(key, _)| key.trim())
}

pub fn is_dynamic_property(line: &str) -> bool {
    property_key(line)
        .map(|key| DYNAMIC_KEYS.contains(&key))
        .unwrap_or(false)
}

/// Order-preserving filter removing dynamic-only properties
pub fn static_properties<S: AsRef<str>>(properties: &[S]) -> Vec<String> {
    properties
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !is_dynamic_property(line))
        .map(str::to_string)
        .collect()
}

/// Whether the deployed static file differs from the desired static list.
///
/// Blank lines are ignored and so is line order; the server itself reorders
/// nothing but may drop the dynamic keys at any time.
pub fn static_config_changed<S: AsRef<str>>(deployed: &str, desired: &[S]) -> bool {
    let deployed: BTreeSet<String> = deployed
        .lines()
        .filter(|line| !line.trim().is_empty() && !is_dynamic_property(line))
        .map(str::to_string)
        .collect();
    let desired: BTreeSet<String> = desired
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty() && !is_dynamic_property(line))
        .map(str::to_string)
        .collect();

    let changed = deployed != desired;
    if changed {
        for line in desired.difference(&deployed) {
            debug!("Static property added: {}", line);
        }
        for line in deployed.difference(&desired) {
            debug!("Static property removed: {}", line);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_only_dynamic_keys() {
        let props = vec![
            "clientPort=2181",
            "maxClientCnxns=60",
            "secureClientPort=2182",
            "ssl.client.enable=true",
            "dataDir=/data",
        ];
        assert_eq!(
            static_properties(&props),
            vec!["maxClientCnxns=60", "ssl.client.enable=true", "dataDir=/data"]
        );
    }

    #[test]
    fn test_non_property_lines_survive() {
        let props = vec!["", "# clientPort", "tickTime=2000"];
        assert_eq!(static_properties(&props), vec!["", "# clientPort", "tickTime=2000"]);
    }

    #[test]
    fn test_changed_ignores_order_and_dynamic_keys() {
        let deployed = "tickTime=2000\nclientPort=2181\ninitLimit=5\n\n";
        assert!(!static_config_changed(deployed, &["initLimit=5", "tickTime=2000"]));
        assert!(static_config_changed(deployed, &["initLimit=10", "tickTime=2000"]));
    }
}
