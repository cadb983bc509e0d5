use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuorumError {
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Missing credential: {credential}")]
    MissingCredential { credential: String },

    #[error("Invalid node name '{name}': expected <application>/<ordinal>")]
    InvalidNodeName { name: String },

    #[error("Configuration error in {component}: {message}")]
    Configuration { component: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type QuorumResult<T> = std::result::Result<T, QuorumError>;

impl QuorumError {
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        QuorumError::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing_credential(credential: impl Into<String>) -> Self {
        QuorumError::MissingCredential {
            credential: credential.into(),
        }
    }
}
