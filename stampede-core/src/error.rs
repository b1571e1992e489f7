//! Core error types for Stampede

use thiserror::Error;

/// Result type for operations against the workflow engine
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised by a workflow engine implementation
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine session could not be established
    #[error("Failed to connect to workflow engine: {0}")]
    Connection(String),

    /// The engine answered with a non-success status
    #[error("Engine API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure talking to the engine
    #[error("Network error: {0}")]
    Network(String),

    /// A single execution in a listing could not be decoded
    #[error("Malformed execution record: {0}")]
    MalformedRecord(String),

    /// A workflow with the same id is already running
    #[error("Workflow already started: {0}")]
    AlreadyStarted(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Whether the error concerns one listed item only, so a scan can continue past it
    pub fn is_per_item(&self) -> bool {
        matches!(self, EngineError::MalformedRecord(_))
    }

    /// Whether the error means the engine could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, EngineError::Connection(_) | EngineError::Network(_))
    }
}

/// Search attribute extraction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributeError {
    #[error("Attribute {name} has unexpected type: expected {expected}, got {found}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: String,
    },
}
