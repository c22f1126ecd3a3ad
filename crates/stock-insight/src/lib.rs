//! Stock insight: multi-agent stock analysis
//!
//! A request (typed text, a voice transcript, a chart image or a document)
//! enters through the [`RootRouter`], which classifies it and dispatches it:
//!
//! - price questions go straight to the `get_stock_price` tool
//! - report requests go to the [`Planner`], which resolves the ticker with the
//!   Data Collector, collects a market data snapshot, runs the fundamental,
//!   valuation and risk analyzers concurrently and aggregates their findings
//! - chart images go to the Chart Reader, documents to the Document Analyzer;
//!   both end by offering a full report for the detected ticker
//! - anything else gets a clarification question
//!
//! Every agent is an immutable [`insight_core::AgentDescriptor`] bound to an
//! [`insight_llm::LLMProvider`]. Model output is validated before it is used,
//! and nothing is substituted for missing data.
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_llm::GeminiProvider;
//! use stock_insight::{InsightConfig, InsightEngine, UserInput, YahooMarketData};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InsightConfig::from_env()?;
//!     let provider = Arc::new(GeminiProvider::from_env()?);
//!     let market = Arc::new(YahooMarketData::new(config.currency.clone()));
//!
//!     let engine = InsightEngine::new(config, provider, market)?;
//!     let response = engine.handle(&UserInput::text("Give me a full analysis of TSLA")).await?;
//!     println!("{response:?}");
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod format;
pub mod input;
pub mod market;
pub mod planner;
pub mod prompts;
pub mod report;
pub mod router;
pub mod ticker;
pub mod tools;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use agents::{ChartReading, DocumentAnalysis};
pub use config::InsightConfig;
pub use engine::InsightEngine;
pub use error::{InsightError, ResolutionError, Result};
pub use format::{Formatter, JsonFormatter, TextFormatter};
pub use input::{DocumentAttachment, ImageAttachment, UserInput};
pub use market::{AlphaVantageFundamentals, MarketDataSource, YahooMarketData};
pub use planner::Planner;
pub use report::{AnalysisKind, AnalysisReport, Finding, Section};
pub use router::{Intent, RootRouter, RouterResponse, classify};
pub use ticker::Ticker;
