//! Test doubles shared by the unit tests

use crate::agents::{self, build_agent_registry};
use crate::config::InsightConfig;
use crate::prompts::PromptLibrary;
use async_trait::async_trait;
use insight_core::AgentRegistry;
use insight_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, ModelAgent, StopReason,
    TokenUsage,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Provider answering each agent with a fixed reply
#[derive(Default)]
pub struct ScriptedProvider {
    replies: HashMap<String, String>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, agent: &str, text: impl Into<String>) -> Self {
        self.replies.insert(agent.to_string(), text.into());
        self
    }

    pub fn fail(mut self, agent: &str, reason: &str) -> Self {
        self.failures.insert(agent.to_string(), reason.to_string());
        self
    }

    /// Agent names of every call made, in order
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.agent.unwrap_or_default())
            .collect()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> insight_llm::Result<CompletionResponse> {
        let agent = request.agent.clone().unwrap_or_default();
        self.calls.lock().unwrap().push(request);

        if let Some(reason) = self.failures.get(&agent) {
            return Err(LLMError::ProviderUnavailable(reason.clone()));
        }
        let text = self
            .replies
            .get(&agent)
            .ok_or_else(|| LLMError::InvalidRequest(format!("no scripted reply for {agent}")))?;

        Ok(CompletionResponse {
            message: Message::assistant(text.clone()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn agent_registry() -> AgentRegistry {
    build_agent_registry(&InsightConfig::default(), &prompts()).unwrap()
}

pub fn prompts() -> Arc<PromptLibrary> {
    Arc::new(PromptLibrary::new().unwrap())
}

/// A model agent for `name` backed by `provider`
pub fn model_agent(name: &str, provider: &Arc<ScriptedProvider>) -> ModelAgent {
    let provider: Arc<dyn LLMProvider> = provider.clone();
    agents::model_agent(&agent_registry(), name, &provider, &InsightConfig::default()).unwrap()
}
