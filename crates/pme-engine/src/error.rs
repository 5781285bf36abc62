//! Error types for pme-engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conformance run.
///
/// Scenario-level failures never surface here; they are recorded as outcomes.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata lookup failed
    #[error("Metadata error: {0}")]
    Meta(#[from] pme_meta::Error),

    /// A scenario carries more than one pre-handle marker
    #[error("Pre-handle marker is defined more than once on {scenario}")]
    DuplicatePreHandleMarker {
        /// Qualified scenario name
        scenario: String,
    },

    /// An event has neither a raise hook nor an `On<Event>` trigger
    #[error("No raise hook or trigger method for event {event} on {target}")]
    MissingEventTrigger {
        /// Event name
        event: String,
        /// Target type
        target: String,
    },

    /// The target factory failed
    #[error("Target creation failed: {0}")]
    TargetCreation(String),

    /// Policy or manifest misconfiguration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
