//! Model-backed agents
//!
//! A [`ModelAgent`] is an [`AgentDescriptor`] bound to a provider. It owns no
//! conversation state: each call sends the descriptor's instructions plus the
//! messages given to it and returns the model's reply.

use crate::structured::parse_structured;
use crate::{CompletionRequest, LLMError, LLMProvider, Message, ResponseFormat, Result};
use insight_core::AgentDescriptor;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sampling settings applied to every call an agent makes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: usize,
    pub temperature: Option<f32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: Some(0.2),
        }
    }
}

/// An agent descriptor paired with the provider that serves it
#[derive(Clone)]
pub struct ModelAgent {
    descriptor: Arc<AgentDescriptor>,
    provider: Arc<dyn LLMProvider>,
    settings: GenerationSettings,
}

impl std::fmt::Debug for ModelAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAgent")
            .field("agent", &self.descriptor.name())
            .field("model", &self.descriptor.model_ref())
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl ModelAgent {
    pub fn new(descriptor: Arc<AgentDescriptor>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            descriptor,
            provider,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Build the completion request for a set of messages
    pub fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        let format = if self.descriptor.expects_json() {
            ResponseFormat::Json
        } else {
            ResponseFormat::Text
        };

        let mut builder = CompletionRequest::builder(self.descriptor.model_ref())
            .messages(messages)
            .system(self.descriptor.instructions())
            .max_tokens(self.settings.max_tokens)
            .response_format(format)
            .agent(self.descriptor.name());
        if let Some(temperature) = self.settings.temperature {
            builder = builder.temperature(temperature);
        }
        builder.build()
    }

    /// Send messages to the model and return the reply text
    #[instrument(skip(self, messages), fields(agent = %self.descriptor.name(), model = %self.descriptor.model_ref()))]
    pub async fn invoke(&self, messages: Vec<Message>) -> Result<String> {
        let response = self.provider.complete(self.request(messages)).await?;
        debug!(
            stop_reason = ?response.stop_reason,
            tokens = response.usage.total(),
            "agent call finished"
        );

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LLMError::EmptyResponse),
        }
    }

    /// Send messages and parse the reply as a JSON object of type `T`
    pub async fn invoke_json<T: DeserializeOwned>(&self, messages: Vec<Message>) -> Result<T> {
        let text = self.invoke(messages).await?;
        parse_structured(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletionResponse, MessageContent, Role, StopReason, TokenUsage};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;

    struct CannedProvider {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(CompletionResponse {
                message: Message {
                    role: Role::Assistant,
                    content: MessageContent::Text(self.reply.clone()),
                },
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            })
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn descriptor(json: bool) -> Arc<AgentDescriptor> {
        let mut builder = AgentDescriptor::builder("data_collector_agent")
            .model_ref("gemini-2.0-flash")
            .instructions("Extract the ticker.");
        if json {
            builder = builder.output_schema(json!({"type": "object"}));
        }
        Arc::new(builder.build().unwrap())
    }

    #[tokio::test]
    async fn test_invoke_sends_descriptor_fields() {
        let provider = Arc::new(CannedProvider::new("MSFT"));
        let agent = ModelAgent::new(descriptor(false), provider.clone());

        let reply = agent.invoke(vec![Message::user("Tell me about Microsoft")]).await.unwrap();
        assert_eq!(reply, "MSFT");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].model, "gemini-2.0-flash");
        assert_eq!(seen[0].system.as_deref(), Some("Extract the ticker."));
        assert_eq!(seen[0].agent.as_deref(), Some("data_collector_agent"));
        assert_eq!(seen[0].response_format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn test_invoke_json() {
        #[derive(Deserialize)]
        struct Reply {
            ticker: Option<String>,
        }

        let provider = Arc::new(CannedProvider::new("```json\n{\"ticker\": \"TSLA\"}\n```"));
        let agent = ModelAgent::new(descriptor(true), provider.clone());

        let reply: Reply = agent.invoke_json(vec![Message::user("EV maker")]).await.unwrap();
        assert_eq!(reply.ticker.as_deref(), Some("TSLA"));
        assert_eq!(provider.seen.lock().unwrap()[0].response_format, ResponseFormat::Json);
    }

    #[tokio::test]
    async fn test_blank_reply_is_error() {
        let agent = ModelAgent::new(descriptor(false), Arc::new(CannedProvider::new("  \n")));
        let err = agent.invoke(vec![Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LLMError::EmptyResponse));
    }
}
