//! Market data tools exposed through the tool registry

pub mod price;
pub mod stock_data;

pub use price::GetStockPriceTool;
pub use stock_data::GetAllStockDataTool;

use crate::error::{InsightError, Result};
use crate::market::MarketDataSource;
use crate::ticker::Ticker;
use insight_core::AgentDescriptor;
use insight_tools::ToolRegistry;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TickerParams {
    ticker: String,
}

impl TickerParams {
    /// Extract and validate the `ticker` parameter
    fn parse(params: Value) -> insight_core::Result<Ticker> {
        let params: TickerParams = serde_json::from_value(params).map_err(|e| {
            insight_core::Error::InvalidInput(format!("Invalid parameters: {e}"))
        })?;
        Ticker::parse(&params.ticker).map_err(|e| insight_core::Error::InvalidInput(e.to_string()))
    }
}

fn to_core_error(err: InsightError) -> insight_core::Error {
    err.into()
}

/// Register both market data tools over one source
pub fn build_registry(source: Arc<dyn MarketDataSource>, history_days: u32) -> Result<ToolRegistry> {
    let registry = ToolRegistry::builder()
        .register(Arc::new(GetStockPriceTool::new(source.clone())))
        .register(Arc::new(GetAllStockDataTool::new(source, history_days)))
        .build()?;
    Ok(registry)
}

/// Invoke a tool on behalf of an agent, bounded by `timeout`
///
/// Agents may only reach the tools their descriptor declares. Any tool
/// failure, including expiry, is reported as a downstream error naming the tool.
pub async fn invoke_declared_tool(
    descriptor: &AgentDescriptor,
    tools: &ToolRegistry,
    tool: &str,
    params: Value,
    timeout: Duration,
) -> Result<Value> {
    if !descriptor.uses_tool(tool) {
        return Err(InsightError::Config(format!(
            "agent {} does not declare tool {tool}",
            descriptor.name()
        )));
    }

    tools
        .invoke_with_timeout(tool, params, timeout)
        .await
        .map_err(|e| InsightError::downstream(tool, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketDataSource;

    #[test]
    fn test_registry_contains_both_tools() {
        let registry = build_registry(Arc::new(MockMarketDataSource::new()), 365).unwrap();
        assert_eq!(registry.names(), vec!["get_all_stock_data", "get_stock_price"]);

        let tool = registry.get(GetStockPriceTool::NAME).unwrap();
        assert_eq!(tool.input_schema()["required"][0], "ticker");
    }

    #[tokio::test]
    async fn test_undeclared_tool_is_refused() {
        let mut source = MockMarketDataSource::new();
        source.expect_quote().never();
        let registry = build_registry(Arc::new(source), 365).unwrap();
        let descriptor = AgentDescriptor::builder("risk_analysis_agent")
            .model_ref("gemini-2.0-flash")
            .instructions("Assess risk.")
            .build()
            .unwrap();

        let err = invoke_declared_tool(
            &descriptor,
            &registry,
            GetStockPriceTool::NAME,
            serde_json::json!({ "ticker": "AAPL" }),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, InsightError::Config(_)));
    }

    #[tokio::test]
    async fn test_tool_failure_is_downstream() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_quote()
            .returning(|t| Err(InsightError::NotFound(t.to_string())));
        let registry = build_registry(Arc::new(source), 365).unwrap();
        let descriptor = AgentDescriptor::builder("stock_insight_core")
            .model_ref("gemini-2.0-flash")
            .instructions("Route.")
            .tool(GetStockPriceTool::NAME)
            .build()
            .unwrap();

        let err = invoke_declared_tool(
            &descriptor,
            &registry,
            GetStockPriceTool::NAME,
            serde_json::json!({ "ticker": "ZZZZ" }),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, InsightError::Downstream { ref component, .. } if component == "get_stock_price"));
    }
}
