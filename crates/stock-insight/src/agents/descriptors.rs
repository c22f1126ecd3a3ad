//! Agent descriptors for every stock insight agent

use super::names;
use crate::config::InsightConfig;
use crate::error::Result;
use crate::prompts::{PromptLibrary, system};
use crate::report::AnalysisKind;
use crate::tools::{GetAllStockDataTool, GetStockPriceTool};
use insight_core::{AgentDescriptor, AgentRegistry};
use insight_tools::schema;
use serde_json::{Value, json};

/// Build the registry of all agents, rendering their instructions
pub fn build_agent_registry(config: &InsightConfig, prompts: &PromptLibrary) -> Result<AgentRegistry> {
    let model = |name: &str| config.model_for(name).to_string();

    let router = AgentDescriptor::builder(names::ROUTER)
        .model_ref(model(names::ROUTER))
        .description(
            "Core agent of Stock Insight: routes financial queries to a fast price lookup \
             or to the planner that orchestrates a full stock analysis report",
        )
        .instructions(prompts.render(system::ROUTER, json!({}))?)
        .tool(GetStockPriceTool::NAME)
        .build()?;

    let collector = AgentDescriptor::builder(names::DATA_COLLECTOR)
        .model_ref(model(names::DATA_COLLECTOR))
        .description("Resolves the ticker from any input modality and collects market data")
        .instructions(prompts.render(system::DATA_COLLECTOR, json!({}))?)
        .tool(GetAllStockDataTool::NAME)
        .output_schema(ticker_schema())
        .build()?;

    let chart = AgentDescriptor::builder(names::CHART_READER)
        .model_ref(model(names::CHART_READER))
        .description("Reads price charts from images")
        .instructions(prompts.render(system::CHART_READER, json!({}))?)
        .output_schema(chart_schema())
        .build()?;

    let document = AgentDescriptor::builder(names::DOCUMENT)
        .model_ref(model(names::DOCUMENT))
        .description("Extracts stated facts from financial documents and summarises them")
        .instructions(prompts.render(system::DOCUMENT_ANALYST, json!({}))?)
        .output_schema(document_schema())
        .build()?;

    let mut builder = AgentRegistry::builder()
        .register(router)
        .register(collector)
        .register(chart)
        .register(document);

    for kind in AnalysisKind::ALL {
        let (focus, guidance) = analyst_focus(kind);
        let instructions = prompts.render(
            system::ANALYST,
            json!({ "focus": focus, "signals": kind.signals(), "guidance": guidance }),
        )?;
        builder = builder.register(
            AgentDescriptor::builder(kind.agent_name())
                .model_ref(model(kind.agent_name()))
                .description(kind.label())
                .instructions(instructions)
                .output_schema(finding_schema(kind))
                .build()?,
        );
    }

    Ok(builder.build()?)
}

fn analyst_focus(kind: AnalysisKind) -> (&'static str, &'static str) {
    match kind {
        AnalysisKind::Fundamental => (
            "fundamental analysis",
            "Assess business quality: growth, profitability, margins and returns on equity.",
        ),
        AnalysisKind::Valuation => (
            "valuation analysis",
            "Judge whether the price is justified: earnings multiples, price to book, \
             position within the 52-week range and against long moving averages.",
        ),
        AnalysisKind::Risk => (
            "risk analysis",
            "Assess downside risk: volatility, beta, drawdowns and recent price behaviour.",
        ),
    }
}

fn ticker_schema() -> Value {
    schema::object(
        json!({ "ticker": schema::nullable(schema::string("Ticker symbol, or null when none is identifiable")) }),
        &["ticker"],
    )
}

fn finding_schema(kind: AnalysisKind) -> Value {
    schema::object(
        json!({
            "summary": schema::string("Two or three sentence summary"),
            "key_points": schema::array("Specific observations", schema::string("Observation")),
            "signal": schema::string_enum("Overall assessment", kind.signals()),
        }),
        &["summary", "key_points", "signal"],
    )
}

fn chart_schema() -> Value {
    let price = || schema::nullable(schema::number("Price read from the chart"));
    json!({
        "oneOf": [
            schema::object(json!({ "error": schema::string("Why the chart cannot be read") }), &["error"]),
            schema::object(
                json!({
                    "ticker": schema::nullable(schema::string("Symbol printed on the chart")),
                    "timeframe": schema::nullable(schema::string("Chart timeframe")),
                    "price_level": price(),
                    "price_axis": schema::object(json!({ "low": price(), "high": price() }), &["low", "high"]),
                    "trend": schema::string_enum("Trend direction", &["up", "down", "sideways", "unclear"]),
                    "support_levels": schema::array("Support prices", schema::number("Price")),
                    "resistance_levels": schema::array("Resistance prices", schema::number("Price")),
                    "volume_trend": schema::string_enum(
                        "Volume trend",
                        &["increasing", "decreasing", "flat", "not_visible"],
                    ),
                    "summary": schema::string("Description of the chart"),
                }),
                &["ticker", "price_axis", "support_levels", "resistance_levels", "summary"],
            ),
        ]
    })
}

fn document_schema() -> Value {
    let stated = |what: &str| schema::nullable(schema::string(what));
    schema::object(
        json!({
            "company": stated("Company name"),
            "sector": stated("Industry sector"),
            "period": stated("Reporting period"),
            "facts": schema::object(
                json!({
                    "revenue": stated("Revenue exactly as written"),
                    "ebit": stated("EBIT exactly as written"),
                    "net_income": stated("Net income exactly as written"),
                    "gross_margin": stated("Gross margin exactly as written"),
                    "operating_margin": stated("Operating margin exactly as written"),
                    "net_margin": stated("Net margin exactly as written"),
                    "cash_flow": stated("Cash flow exactly as written"),
                }),
                &[],
            ),
            "key_points": schema::array("Facts or quotes from the document", schema::string("Point")),
            "risk_factors": schema::array("Risks named by the document", schema::string("Risk")),
            "guidance": stated("Management outlook"),
            "summary": schema::object(
                json!({
                    "thesis": schema::string("Investment thesis"),
                    "strengths": schema::array("Strengths and opportunities", schema::string("Strength")),
                    "risks": schema::array("Risks and headwinds", schema::string("Risk")),
                    "outlook": schema::string("Forward-looking assessment"),
                }),
                &["thesis", "outlook"],
            ),
        }),
        &["facts", "summary"],
    )
}
