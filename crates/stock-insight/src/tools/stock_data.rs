//! Tool for the full data snapshot of a ticker

use async_trait::async_trait;
use insight_core::Result as CoreResult;
use insight_tools::{Tool, schema};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{instrument, warn};

use super::{TickerParams, to_core_error};
use crate::error::Result;
use crate::market::{MarketDataSource, StockSnapshot, compute_technicals};
use crate::ticker::Ticker;

/// `get_all_stock_data {ticker} -> StockSnapshot`
///
/// The quote is mandatory. History and fundamentals are fetched concurrently
/// with it; when either fails the snapshot carries it as empty rather than
/// failing the whole collection.
pub struct GetAllStockDataTool {
    source: Arc<dyn MarketDataSource>,
    history_days: u32,
}

impl GetAllStockDataTool {
    pub const NAME: &'static str = "get_all_stock_data";

    pub fn new(source: Arc<dyn MarketDataSource>, history_days: u32) -> Self {
        Self {
            source,
            history_days,
        }
    }

    async fn snapshot(&self, ticker: Ticker) -> Result<StockSnapshot> {
        let (quote, history, fundamentals) = futures::join!(
            self.source.quote(&ticker),
            self.source.history(&ticker, self.history_days),
            self.source.fundamentals(&ticker),
        );

        let quote = quote?;
        let history = history.unwrap_or_else(|e| {
            warn!(ticker = %ticker, error = %e, "price history unavailable");
            Vec::new()
        });
        let fundamentals = fundamentals.unwrap_or_else(|e| {
            warn!(ticker = %ticker, error = %e, "fundamentals unavailable");
            None
        });

        Ok(StockSnapshot {
            technicals: compute_technicals(&history),
            ticker,
            quote,
            fundamentals,
            history,
            collected_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Tool for GetAllStockDataTool {
    #[instrument(skip(self, params), name = "get_all_stock_data")]
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let ticker = TickerParams::parse(params)?;
        let snapshot = self.snapshot(ticker).await.map_err(to_core_error)?;
        serde_json::to_value(snapshot).map_err(|e| insight_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Collect everything known about a stock: latest quote, company fundamentals, \
         daily price history and technical indicators computed from it."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "ticker": schema::string("Stock ticker symbol (e.g., 'TSLA')") }),
            &["ticker"],
        )
    }

    fn output_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Normalised ticker symbol"),
                "quote": schema::object(
                    json!({
                        "price": schema::number("Last traded price"),
                        "currency": schema::string("ISO 4217 currency code"),
                        "as_of": schema::string("RFC 3339 timestamp of the quote"),
                    }),
                    &["price", "currency", "as_of"],
                ),
                "fundamentals": schema::nullable(json!({ "type": "object" })),
                "history": schema::array("Daily OHLCV bars, oldest first", json!({ "type": "object" })),
                "technicals": json!({ "type": "object" }),
                "collected_at": schema::string("RFC 3339 timestamp of collection"),
            }),
            &["ticker", "quote", "history", "technicals", "collected_at"],
        )
    }
}
