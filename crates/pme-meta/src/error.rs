//! Error types for pme-meta

use thiserror::Error;

/// Result type alias for pme-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing or loading type metadata
#[derive(Debug, Error)]
pub enum Error {
    /// Type not present in the registry
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Manifest is structurally invalid (dangling ancestor, cycle, duplicate type)
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
