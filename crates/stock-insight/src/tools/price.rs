//! Tool for the latest price of a ticker

use async_trait::async_trait;
use insight_core::Result as CoreResult;
use insight_tools::{Tool, schema};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::instrument;

use super::{TickerParams, to_core_error};
use crate::market::MarketDataSource;

/// `get_stock_price {ticker} -> {ticker, price, currency, as_of}`
pub struct GetStockPriceTool {
    source: Arc<dyn MarketDataSource>,
}

impl GetStockPriceTool {
    pub const NAME: &'static str = "get_stock_price";

    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetStockPriceTool {
    #[instrument(skip(self, params), name = "get_stock_price")]
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let ticker = TickerParams::parse(params)?;
        let quote = self.source.quote(&ticker).await.map_err(to_core_error)?;
        serde_json::to_value(quote).map_err(|e| insight_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get the latest traded price for a stock ticker. \
         Returns the price, its currency and the time of the quote."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "ticker": schema::string("Stock ticker symbol (e.g., 'AAPL', 'BRK-B')") }),
            &["ticker"],
        )
    }

    fn output_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Normalised ticker symbol"),
                "price": schema::number("Last traded price"),
                "currency": schema::string("ISO 4217 currency code"),
                "as_of": schema::string("RFC 3339 timestamp of the quote"),
            }),
            &["ticker", "price", "currency", "as_of"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightError;
    use crate::market::{MockMarketDataSource, fixtures};
    use mockall::predicate::function;

    #[tokio::test]
    async fn test_returns_quote() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_quote()
            .with(function(|t: &crate::ticker::Ticker| t.as_str() == "AAPL"))
            .times(1)
            .returning(|t| Ok(fixtures::quote(t, 227.52)));

        let tool = GetStockPriceTool::new(Arc::new(source));
        let output = tool.execute(json!({ "ticker": "aapl" })).await.unwrap();

        assert_eq!(output["ticker"], "AAPL");
        assert_eq!(output["price"], 227.52);
        assert_eq!(output["currency"], "USD");
        assert!(output["as_of"].as_str().unwrap().starts_with("2025-01-31"));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_quote()
            .returning(|t| Err(InsightError::NotFound(t.to_string())));

        let tool = GetStockPriceTool::new(Arc::new(source));
        let err = tool.execute(json!({ "ticker": "ZZZZ" })).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_ticker_never_reaches_source() {
        let mut source = MockMarketDataSource::new();
        source.expect_quote().never();

        let tool = GetStockPriceTool::new(Arc::new(source));
        let err = tool.execute(json!({ "ticker": "not a symbol" })).await.unwrap_err();
        assert!(matches!(err, insight_core::Error::InvalidInput(_)));

        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, insight_core::Error::InvalidInput(_)));
    }
}
