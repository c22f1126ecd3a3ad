//! Inference collaborator for stock-insight
//!
//! This crate provides provider-agnostic abstractions for calling a language
//! model. It includes:
//!
//! - Message types with inline image support
//! - Completion request/response types
//! - The [`LLMProvider`] trait and a Gemini implementation
//! - [`ModelAgent`], which binds an agent descriptor to a provider
//! - Validation helpers for structured (JSON) model output

pub mod agent;
pub mod completion;
pub mod error;
pub mod image;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod structured;

// Re-export main types
pub use agent::{GenerationSettings, ModelAgent};
pub use completion::{
    CompletionRequest, CompletionResponse, ResponseFormat, StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, ImageSource, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use providers::GeminiProvider;
