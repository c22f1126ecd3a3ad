//! Stock insight sub-agents
//!
//! Each sub-agent is a typed wrapper around a [`ModelAgent`]: it renders its
//! request, calls the model, and validates whatever comes back before anything
//! downstream sees it. None of them knows about the others; the planner and
//! the router compose them.

pub mod aggregator;
pub mod analyzers;
pub mod chart_reader;
pub mod data_collector;
pub mod descriptors;
pub mod document;

pub use aggregator::{BranchOutcome, combine};
pub use analyzers::{Analyzer, ModelAnalyzer};
pub use chart_reader::{ChartObservation, ChartReader, ChartReading, PriceRange, Trend, VolumeTrend};
pub use data_collector::DataCollector;
pub use descriptors::build_agent_registry;
pub use document::{DocumentAnalysis, DocumentAnalyzer, Fact, FinancialFacts, InvestmentSummary};

use crate::config::InsightConfig;
use crate::error::{InsightError, Result};
use insight_core::AgentRegistry;
use insight_llm::{GenerationSettings, LLMError, LLMProvider, ModelAgent};
use std::sync::Arc;

/// Agent names, unique within the agent registry
pub mod names {
    pub const ROUTER: &str = "stock_insight_core";
    pub const DATA_COLLECTOR: &str = "data_collector_agent";
    pub const FUNDAMENTAL: &str = "fundamental_analysis_agent";
    pub const VALUATION: &str = "valuation_analysis_agent";
    pub const RISK: &str = "risk_analysis_agent";
    pub const CHART_READER: &str = "chart_analyzer_agent";
    pub const DOCUMENT: &str = "document_analysis_agent";
}

/// Bind a registered descriptor to the inference provider
pub fn model_agent(
    registry: &AgentRegistry,
    name: &str,
    provider: &Arc<dyn LLMProvider>,
    config: &InsightConfig,
) -> Result<ModelAgent> {
    let descriptor = registry.require(name)?;
    Ok(ModelAgent::new(descriptor, Arc::clone(provider)).with_settings(GenerationSettings {
        max_tokens: config.max_tokens,
        temperature: Some(config.temperature),
    }))
}

/// Model failures surface as downstream errors naming the agent
pub(crate) fn model_failure(agent: &ModelAgent, err: LLMError) -> InsightError {
    InsightError::downstream(agent.name(), err)
}
