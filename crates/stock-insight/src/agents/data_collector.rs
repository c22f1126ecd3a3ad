//! Data Collector: ticker resolution and market data collection
//!
//! Resolution is deterministic wherever the text allows it. The model is
//! consulted only when extraction finds nothing (and always for images), and
//! its answer must itself be a valid symbol. Nothing here ever guesses.

use super::model_failure;
use crate::error::{InsightError, ResolutionError, Result};
use crate::extract;
use crate::input::{InputModality, UserInput};
use crate::market::StockSnapshot;
use crate::prompts::{PromptLibrary, user};
use crate::ticker::Ticker;
use crate::tools::{GetAllStockDataTool, invoke_declared_tool};
use insight_llm::image::encode_image;
use insight_llm::{Message, ModelAgent};
use insight_tools::ToolRegistry;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Longest document excerpt sent to the model for ticker resolution
const DOCUMENT_EXCERPT_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
struct TickerReply {
    ticker: Option<String>,
}

/// Resolves tickers and fetches the data snapshot for them
pub struct DataCollector {
    agent: ModelAgent,
    prompts: Arc<PromptLibrary>,
    tools: Arc<ToolRegistry>,
    tool_timeout: Duration,
    model_fallback: bool,
}

impl DataCollector {
    pub fn new(
        agent: ModelAgent,
        prompts: Arc<PromptLibrary>,
        tools: Arc<ToolRegistry>,
        tool_timeout: Duration,
    ) -> Self {
        Self {
            agent,
            prompts,
            tools,
            tool_timeout,
            model_fallback: true,
        }
    }

    /// Allow or forbid asking the model when extraction finds nothing
    pub fn with_model_fallback(mut self, enabled: bool) -> Self {
        self.model_fallback = enabled;
        self
    }

    /// Resolve the ticker of a whole request from its primary modality
    pub async fn resolve_input(&self, input: &UserInput) -> Result<Ticker> {
        let modality = input.primary_modality().ok_or(ResolutionError::EmptyInput)?;
        self.resolve(modality).await
    }

    /// Resolve a ticker from one input modality
    #[instrument(skip_all, fields(modality = modality.label()))]
    pub async fn resolve(&self, modality: InputModality<'_>) -> Result<Ticker> {
        let extracted = match modality {
            InputModality::Text(text) | InputModality::Transcript(text) => {
                extract::resolve_text(text)?
            }
            InputModality::Document(document) => extract::resolve_document(document),
            InputModality::Image(_) => None,
        };

        if let Some(ticker) = extracted {
            debug!(%ticker, "ticker extracted from input");
            return Ok(ticker);
        }

        let is_image = matches!(modality, InputModality::Image(_));
        if !self.model_fallback && !is_image {
            return Err(no_ticker(modality).into());
        }

        let ticker = self.ask_model(modality).await?;
        info!(%ticker, "ticker resolved by model");
        Ok(ticker)
    }

    async fn ask_model(&self, modality: InputModality<'_>) -> Result<Ticker> {
        let message = match modality {
            InputModality::Text(text) | InputModality::Transcript(text) => {
                Message::user(self.render_request(modality, Some(text))?)
            }
            InputModality::Document(document) => {
                let excerpt: String = document.text.chars().take(DOCUMENT_EXCERPT_CHARS).collect();
                let content = match &document.title {
                    Some(title) => format!("{title}\n\n{excerpt}"),
                    None => excerpt,
                };
                if content.trim().is_empty() {
                    return Err(no_ticker(modality).into());
                }
                Message::user(self.render_request(modality, Some(&content))?)
            }
            InputModality::Image(image) => {
                let Some(media_type) = image.media_type.filter(|_| !image.bytes.is_empty()) else {
                    return Err(no_ticker(modality).into());
                };
                let source = encode_image(&image.bytes, media_type)
                    .map_err(|_| InsightError::from(no_ticker(modality)))?;
                Message::user_with_image(self.render_request(modality, None)?, source)
            }
        };

        let reply: TickerReply = self
            .agent
            .invoke_json(vec![message])
            .await
            .map_err(|e| model_failure(&self.agent, e))?;

        match reply.ticker.as_deref().map(str::trim) {
            None | Some("") => Err(no_ticker(modality).into()),
            Some(raw) => Ok(Ticker::parse(raw)?),
        }
    }

    fn render_request(&self, modality: InputModality<'_>, content: Option<&str>) -> Result<String> {
        self.prompts.render(
            user::RESOLVE_TICKER,
            json!({ "modality": modality.label(), "content": content }),
        )
    }

    /// Fetch the full data snapshot for a resolved ticker
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn collect(&self, ticker: &Ticker) -> Result<StockSnapshot> {
        let value = invoke_declared_tool(
            self.agent.descriptor(),
            &self.tools,
            GetAllStockDataTool::NAME,
            json!({ "ticker": ticker }),
            self.tool_timeout,
        )
        .await?;

        serde_json::from_value(value)
            .map_err(|e| InsightError::downstream(GetAllStockDataTool::NAME, e))
    }
}

fn no_ticker(modality: InputModality<'_>) -> ResolutionError {
    ResolutionError::NoTicker {
        modality: modality.label().to_string(),
    }
}
