//! Dynamic configuration continuity
//!
//! With `reconfigEnabled` the server rewrites `dynamicConfigFile` to point at
//! a versioned file (`zookeeper-dynamic.properties.<revision>`) whenever
//! membership changes. Rewriting the static file must carry that line forward
//! verbatim, otherwise the reconfiguration history is lost.

use crate::paths::ConfigPaths;
use crate::store::ConfigStore;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

pub const DYNAMIC_CONFIG_KEY: &str = "dynamicConfigFile";

/// Why the default pointer was used instead of a deployed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// No static file yet
    FirstBoot,
    /// A static file exists but has no pointer line
    MissingKey,
    /// The static file could not be read
    Unreadable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Deployed,
    Default(DefaultReason),
}

/// The `dynamicConfigFile=<path>` property line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicConfigPointer {
    line: String,
    source: PointerSource,
}

impl DynamicConfigPointer {
    pub fn default_for(dynamic_file: &Path, reason: DefaultReason) -> Self {
        Self {
            line: format!("{}={}", DYNAMIC_CONFIG_KEY, dynamic_file.display()),
            source: PointerSource::Default(reason),
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn into_line(self) -> String {
        self.line
    }

    pub fn source(&self) -> PointerSource {
        self.source
    }

    /// Recovered through the fallback after a file existed but did not yield
    /// a pointer
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.source,
            PointerSource::Default(DefaultReason::MissingKey | DefaultReason::Unreadable)
        )
    }
}

impl fmt::Display for DynamicConfigPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

fn is_pointer_line(line: &str) -> bool {
    line.split_once('=')
        .map(|(key, _)| key.trim() == DYNAMIC_CONFIG_KEY)
        .unwrap_or(false)
}

/// Recover the pointer from the contents of the deployed static file.
///
/// `None` means there is no deployed file yet. The first matching line is
/// returned byte-for-byte, including whatever revision suffix the server
/// appended.
pub fn current_dynamic_pointer(
    existing: Option<&str>,
    dynamic_file: &Path,
) -> DynamicConfigPointer {
    let Some(contents) = existing else {
        debug!("Static properties not found, using default dynamic config path");
        return DynamicConfigPointer::default_for(dynamic_file, DefaultReason::FirstBoot);
    };

    if let Some(line) = contents.lines().find(|line| is_pointer_line(line)) {
        return DynamicConfigPointer {
            line: line.to_string(),
            source: PointerSource::Deployed,
        };
    }

    // The default path is only a guess once the server has managed the file.
    warn!(
        "{} missing from deployed static properties, falling back to {:?}",
        DYNAMIC_CONFIG_KEY, dynamic_file
    );
    DynamicConfigPointer::default_for(dynamic_file, DefaultReason::MissingKey)
}

/// The deployed static file together with the pointer recovered from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedStatic {
    /// `None` on first boot or when the file could not be read
    pub contents: Option<String>,
    pub pointer: DynamicConfigPointer,
}

/// Read the deployed static file through `store` once and recover the
/// pointer from it. Read failures degrade to the default pointer and are
/// never propagated.
pub async fn read_deployed_static(store: &dyn ConfigStore, paths: &ConfigPaths) -> DeployedStatic {
    match store.pull(&paths.properties).await {
        Ok(contents) => {
            let pointer = current_dynamic_pointer(contents.as_deref(), &paths.dynamic_properties);
            DeployedStatic { contents, pointer }
        }
        Err(e) => {
            warn!(
                "Failed to read {:?} ({}), using default dynamic config path",
                paths.properties, e
            );
            DeployedStatic {
                contents: None,
                pointer: DynamicConfigPointer::default_for(
                    &paths.dynamic_properties,
                    DefaultReason::Unreadable,
                ),
            }
        }
    }
}

/// Current pointer for the node whose files live under `paths`
pub async fn read_dynamic_pointer(
    store: &dyn ConfigStore,
    paths: &ConfigPaths,
) -> DynamicConfigPointer {
    read_deployed_static(store, paths).await.pointer
}
