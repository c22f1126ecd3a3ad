//! Insight engine: wires registries, agents and the router together

use crate::agents::{
    self, Analyzer, ChartReader, DataCollector, DocumentAnalyzer, ModelAnalyzer,
    build_agent_registry, names,
};
use crate::config::InsightConfig;
use crate::error::Result;
use crate::input::UserInput;
use crate::market::MarketDataSource;
use crate::planner::Planner;
use crate::prompts::PromptLibrary;
use crate::report::AnalysisKind;
use crate::router::{RootRouter, RouterResponse};
use crate::ticker::Ticker;
use crate::tools::build_registry;
use insight_core::{AgentRegistry, RequestContext};
use insight_llm::LLMProvider;
use insight_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{Instrument, info};

/// Stock insight engine
///
/// Everything built here is immutable and shared read-only between requests;
/// each request gets its own [`RequestContext`].
pub struct InsightEngine {
    agents: Arc<AgentRegistry>,
    tools: Arc<ToolRegistry>,
    router: RootRouter,
}

impl InsightEngine {
    pub fn new(
        config: InsightConfig,
        provider: Arc<dyn LLMProvider>,
        market: Arc<dyn MarketDataSource>,
    ) -> Result<Self> {
        config.validate()?;

        let prompts = Arc::new(PromptLibrary::new()?);
        let tools = Arc::new(build_registry(market, config.history_days)?);
        let registry = Arc::new(build_agent_registry(&config, &prompts)?);
        registry.validate_tools(|tool| tools.contains(tool))?;

        let agent = |name: &str| agents::model_agent(&registry, name, &provider, &config);

        let collector = Arc::new(
            DataCollector::new(
                agent(names::DATA_COLLECTOR)?,
                prompts.clone(),
                tools.clone(),
                config.tool_timeout,
            )
            .with_model_fallback(config.model_ticker_fallback),
        );

        let analyzer = |kind: AnalysisKind| -> Result<Arc<dyn Analyzer>> {
            Ok(Arc::new(ModelAnalyzer::new(
                kind,
                agent(kind.agent_name())?,
                prompts.clone(),
            )))
        };
        let planner = Arc::new(Planner::new(
            collector.clone(),
            analyzer(AnalysisKind::Fundamental)?,
            analyzer(AnalysisKind::Valuation)?,
            analyzer(AnalysisKind::Risk)?,
            config.analyzer_timeout,
        ));

        let router = RootRouter::new(
            registry.require(names::ROUTER)?,
            tools.clone(),
            config.tool_timeout,
            collector,
            planner,
            ChartReader::new(agent(names::CHART_READER)?, prompts.clone(), config.min_chart_size),
            DocumentAnalyzer::new(agent(names::DOCUMENT)?, prompts),
        );

        info!(
            agents = registry.len(),
            tools = tools.len(),
            provider = provider.name(),
            "insight engine ready"
        );

        Ok(Self {
            agents: registry,
            tools,
            router,
        })
    }

    /// Handle one incoming request
    pub async fn handle(&self, input: &UserInput) -> Result<RouterResponse> {
        let ctx = RequestContext::new();
        let span = ctx.span();
        self.router.dispatch(input, &ctx).instrument(span).await
    }

    /// Run the full report the user accepted as a follow-up
    pub async fn follow_up(&self, ticker: Ticker) -> Result<RouterResponse> {
        let ctx = RequestContext::new();
        let span = ctx.span();
        self.router.follow_up(ticker, &ctx).instrument(span).await
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}
