//! Error types for the building analysis engine

use thiserror::Error;

/// Main error type for FEA operations
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("Node index {0} is out of range")]
    NodeNotFound(usize),

    #[error("Load case '{0}' not found")]
    LoadCaseNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for FEA operations
pub type FEAResult<T> = Result<T, FEAError>;
