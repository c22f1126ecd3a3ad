//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Provider returned a server error
    #[error("Provider {0} is unavailable")]
    ProviderUnavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// The model answered without any text
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// Structured output could not be parsed or failed validation
    #[error("Malformed model output ({reason}): {excerpt}")]
    MalformedOutput { reason: String, excerpt: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Build a [`LLMError::MalformedOutput`] with a bounded excerpt of the raw text
    pub fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        const MAX_EXCERPT: usize = 160;
        let mut excerpt: String = raw.chars().take(MAX_EXCERPT).collect();
        if raw.chars().count() > MAX_EXCERPT {
            excerpt.push_str("...");
        }
        Self::MalformedOutput {
            reason: reason.into(),
            excerpt,
        }
    }
}
