//! Engine error types

use scf_model::ModelError;
use thiserror::Error;

/// Configurator engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Control id not present in the loaded catalog
    #[error("unknown control: {0}")]
    UnknownControl(String),

    /// Goal token resolved to nothing, or the goal has no window
    #[error("unknown timeline goal: {0}")]
    UnknownGoal(String),

    /// Overlap subject could not be parsed
    #[error("invalid subject: {0}")]
    InvalidSubject(String),

    /// Export payload could not be built
    #[error("export rejected: {0}")]
    Export(String),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(String),

    /// Priority file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Identity parsing failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
