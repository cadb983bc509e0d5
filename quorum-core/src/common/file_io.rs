//! Desired-state file loading
//!
//! The format is picked from the file extension, falling back to trying
//! JSON, TOML and YAML in turn.

use crate::error::{QuorumError, QuorumResult};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Read a text file, wrapping failures with the file's role and path
pub async fn read_text_file_with_context<P: AsRef<Path>>(
    path: P,
    context: &str,
) -> QuorumResult<String> {
    let path = path.as_ref();
    debug!("Reading {} from {:?}", context, path);

    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| QuorumError::Configuration {
            component: "file_io".to_string(),
            message: format!("Failed to read {}: {} (path: {:?})", context, e, path),
        })
}

/// Deserialize configuration text in the given format
pub fn parse_config<T: DeserializeOwned>(
    content: &str,
    format: &str,
    file_type: &str,
) -> QuorumResult<T> {
    debug!("Parsing {} as {:?}", file_type, format);
    match format {
        "json" => Ok(serde_json::from_str(content)?),
        "toml" => Ok(toml::from_str(content)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(content)?),
        _ => {
            if let Ok(parsed) = serde_json::from_str(content) {
                Ok(parsed)
            } else if let Ok(parsed) = toml::from_str(content) {
                Ok(parsed)
            } else if let Ok(parsed) = serde_yaml::from_str(content) {
                Ok(parsed)
            } else {
                Err(QuorumError::Configuration {
                    component: "format_detection".to_string(),
                    message: format!("Unable to parse {} - unknown format", file_type),
                })
            }
        }
    }
}

/// Read and deserialize a configuration file (JSON/TOML/YAML)
pub async fn read_config_file<T, P>(path: P, file_type: &str) -> QuorumResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content =
        read_text_file_with_context(path, &format!("{} configuration", file_type)).await?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    parse_config(&content, extension, file_type)
}
