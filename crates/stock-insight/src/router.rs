//! Root router: classifies a request and dispatches it
//!
//! Classification is plain keyword and attachment inspection, so the same
//! input always lands in the same category. Only the dispatch targets talk
//! to tools or models.

use crate::agents::{ChartReader, ChartReading, DataCollector, DocumentAnalysis, DocumentAnalyzer};
use crate::error::{InsightError, Result};
use crate::extract;
use crate::input::{InputModality, UserInput};
use crate::market::PriceQuote;
use crate::planner::Planner;
use crate::report::AnalysisReport;
use crate::ticker::Ticker;
use crate::tools::{GetStockPriceTool, invoke_declared_tool};
use insight_core::{AgentDescriptor, RequestContext};
use insight_tools::ToolRegistry;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Component name reported when the planner fails unexpectedly
const PLANNER: &str = "stock_analysis_planner";

/// Question asked when the intent cannot be determined
pub const CLARIFICATION: &str = "Are you looking for just the current price or a full analysis report?";

/// What the user wants done with their request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Current price of one stock
    PriceLookup,
    /// Full fundamental, valuation and risk report
    FullAnalysis,
    /// Facts and summary of an attached document
    DocumentAnalysis,
    /// Reading of an attached chart image
    ChartAnalysis,
    /// Not enough to go on; ask the user
    Ambiguous,
}

/// Keywords for intent classification
mod keywords {
    pub const COMPREHENSIVE: &[&str] = &[
        "full analysis",
        "full report",
        "report",
        "deep dive",
        "deep-dive",
        "complete overview",
        "comprehensive",
        "in-depth",
        "in depth",
        "thorough",
    ];

    pub const PRICE: &[&str] = &[
        "price",
        "quote",
        "cost",
        "trading at",
        "how much",
        "worth",
        "value of",
    ];

    pub const ANALYSIS: &[&str] = &[
        "analy",
        "evaluate",
        "assess",
        "outlook",
        "fundamentals",
        "valuation",
        "risk",
        "should i buy",
        "should i sell",
        "invest in",
    ];
}

fn matches_any(query: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| query.contains(kw))
}

/// Classify a request
///
/// Attachments decide first: a document means document analysis and an image
/// means chart analysis. Otherwise the typed text (or voice transcript) is
/// matched against keyword lists; a price lookup additionally needs exactly
/// one ticker in the text.
pub fn classify(input: &UserInput) -> Intent {
    if input.document.is_some() {
        return Intent::DocumentAnalysis;
    }
    if input.image.is_some() {
        return Intent::ChartAnalysis;
    }
    let Some(utterance) = input.utterance() else {
        return Intent::Ambiguous;
    };

    let query = utterance.to_lowercase();
    if matches_any(&query, keywords::COMPREHENSIVE) {
        return Intent::FullAnalysis;
    }

    let single_ticker = extract::strongest_in_utterance(utterance).len() == 1;
    if single_ticker && matches_any(&query, keywords::PRICE) {
        return Intent::PriceLookup;
    }
    if single_ticker && matches_any(&query, keywords::ANALYSIS) {
        return Intent::FullAnalysis;
    }
    Intent::Ambiguous
}

/// Clarification question tailored to what the text mentions
fn clarification(input: &UserInput) -> String {
    let tickers = input.utterance().map(extract::strongest_in_utterance).unwrap_or_default();
    if tickers.len() > 1 {
        let listed: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
        return format!(
            "Your request mentions several stocks ({}). Which one should I look at, and are you \
             looking for just the current price or a full analysis report?",
            listed.join(", ")
        );
    }
    CLARIFICATION.to_string()
}

/// Outcome of one routed request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouterResponse {
    Price {
        quote: PriceQuote,
    },
    Report {
        report: Box<AnalysisReport>,
    },
    Document {
        analysis: Box<DocumentAnalysis>,
    },
    Chart {
        reading: ChartReading,
        /// Offer of a full report, only for a successful reading
        follow_up: Option<String>,
    },
    Clarification {
        message: String,
    },
}

impl RouterResponse {
    /// Ticker the user has been offered a full report for, if any
    pub fn follow_up_ticker(&self) -> Option<&Ticker> {
        match self {
            Self::Document { analysis } if analysis.follow_up.is_some() => analysis.ticker.as_ref(),
            Self::Chart {
                reading,
                follow_up: Some(_),
            } => reading.ticker(),
            _ => None,
        }
    }
}

/// Entry point for every request
pub struct RootRouter {
    descriptor: Arc<AgentDescriptor>,
    tools: Arc<ToolRegistry>,
    tool_timeout: Duration,
    collector: Arc<DataCollector>,
    planner: Arc<Planner>,
    chart_reader: ChartReader,
    document_analyzer: DocumentAnalyzer,
}

impl RootRouter {
    pub fn new(
        descriptor: Arc<AgentDescriptor>,
        tools: Arc<ToolRegistry>,
        tool_timeout: Duration,
        collector: Arc<DataCollector>,
        planner: Arc<Planner>,
        chart_reader: ChartReader,
        document_analyzer: DocumentAnalyzer,
    ) -> Self {
        Self {
            descriptor,
            tools,
            tool_timeout,
            collector,
            planner,
            chart_reader,
            document_analyzer,
        }
    }

    /// Classify and handle one request
    #[instrument(skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn dispatch(&self, input: &UserInput, ctx: &RequestContext) -> Result<RouterResponse> {
        let intent = classify(input);
        info!(?intent, "request classified");

        match intent {
            Intent::PriceLookup => self.price(input).await,
            Intent::FullAnalysis => {
                let report = self.planner.run(input, ctx).await.map_err(planner_failure)?;
                Ok(RouterResponse::Report {
                    report: Box::new(report),
                })
            }
            Intent::DocumentAnalysis => self.document(input).await,
            Intent::ChartAnalysis => self.chart(input).await,
            Intent::Ambiguous => Ok(RouterResponse::Clarification {
                message: clarification(input),
            }),
        }
    }

    /// Run the full report the user accepted after a chart or document
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), ticker = %ticker))]
    pub async fn follow_up(&self, ticker: Ticker, ctx: &RequestContext) -> Result<RouterResponse> {
        let report = self
            .planner
            .run_for_ticker(ticker, ctx)
            .await
            .map_err(planner_failure)?;
        Ok(RouterResponse::Report {
            report: Box::new(report),
        })
    }

    async fn price(&self, input: &UserInput) -> Result<RouterResponse> {
        let tickers = input.utterance().map(extract::strongest_in_utterance).unwrap_or_default();
        let [ticker] = tickers.as_slice() else {
            return Ok(RouterResponse::Clarification {
                message: clarification(input),
            });
        };

        let value = invoke_declared_tool(
            &self.descriptor,
            &self.tools,
            GetStockPriceTool::NAME,
            json!({ "ticker": ticker }),
            self.tool_timeout,
        )
        .await?;
        let quote: PriceQuote = serde_json::from_value(value)
            .map_err(|e| InsightError::downstream(GetStockPriceTool::NAME, e))?;

        Ok(RouterResponse::Price { quote })
    }

    async fn document(&self, input: &UserInput) -> Result<RouterResponse> {
        let Some(document) = &input.document else {
            return Err(InsightError::InvalidInput("no document attached".to_string()));
        };

        let ticker = match self.collector.resolve(InputModality::Document(document)).await {
            Ok(ticker) => Some(ticker),
            Err(InsightError::Resolution(e)) => {
                debug!(error = %e, "document does not identify a ticker");
                None
            }
            Err(e) => return Err(e),
        };

        let analysis = self.document_analyzer.analyze(document, ticker).await?;
        Ok(RouterResponse::Document {
            analysis: Box::new(analysis),
        })
    }

    async fn chart(&self, input: &UserInput) -> Result<RouterResponse> {
        let Some(image) = &input.image else {
            return Err(InsightError::InvalidInput("no image attached".to_string()));
        };

        let mut reading = self.chart_reader.read(image, input.utterance()).await?;
        let follow_up = match &mut reading {
            ChartReading::Reading(observation) => {
                observation.follow_up_offered = true;
                Some(format!(
                    "Would you like a full fundamental analysis report for {}?",
                    observation.ticker
                ))
            }
            ChartReading::Unreadable { .. } => None,
        };

        Ok(RouterResponse::Chart { reading, follow_up })
    }
}

/// Keep the planner's own error kinds, wrap anything else as downstream
fn planner_failure(err: InsightError) -> InsightError {
    match err {
        InsightError::Resolution(_)
        | InsightError::AggregateFailure { .. }
        | InsightError::Downstream { .. } => err,
        other => InsightError::downstream(PLANNER, other),
    }
}
