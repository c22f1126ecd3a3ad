//! Error types for insight-core

use thiserror::Error;

/// Result type alias for insight-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by agents, tools and registries
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Component initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Processing failed
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    /// An agent descriptor was rejected at construction time
    #[error("Invalid agent descriptor: {0}")]
    InvalidDescriptor(String),

    /// A registry already holds an entry with this name
    #[error("Duplicate name in registry: {0}")]
    DuplicateName(String),

    /// Caller supplied input that does not satisfy the contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An operation did not finish within its time budget
    #[error("{operation} timed out after {seconds:.1}s")]
    Timeout { operation: String, seconds: f64 },
}

impl Error {
    /// Whether this error means "the thing asked for does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
