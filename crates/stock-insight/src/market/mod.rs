//! Market data types and sources
//!
//! Everything the tools hand to the analyzers is expressed in these types;
//! the concrete providers live in the submodules.

pub mod alpha_vantage;
pub mod indicators;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageFundamentals;
pub use indicators::compute_technicals;
pub use yahoo::YahooMarketData;

use crate::error::Result;
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest traded price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub ticker: Ticker,
    pub price: f64,
    pub currency: String,
    pub as_of: DateTime<Utc>,
}

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Company fundamentals; any field the provider does not report is `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub profit_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub revenue_ttm: Option<f64>,
    pub beta: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
}

/// Indicators computed from the price history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    /// Annualised standard deviation of daily log returns
    pub annualized_volatility: Option<f64>,
    /// Largest peak-to-trough decline, as a positive fraction
    pub max_drawdown: Option<f64>,
    /// Return over the whole history window, as a fraction
    pub period_return: Option<f64>,
    pub observations: usize,
}

/// Everything collected about one ticker for a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub ticker: Ticker,
    pub quote: PriceQuote,
    pub fundamentals: Option<Fundamentals>,
    pub history: Vec<PriceBar>,
    pub technicals: TechnicalSummary,
    pub collected_at: DateTime<Utc>,
}

/// A provider of quotes, history and fundamentals
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest price; `InsightError::NotFound` for unknown symbols
    async fn quote(&self, ticker: &Ticker) -> Result<PriceQuote>;

    /// Daily bars covering the last `days` calendar days, oldest first
    async fn history(&self, ticker: &Ticker, days: u32) -> Result<Vec<PriceBar>>;

    /// Company fundamentals, or `None` when this source has none
    async fn fundamentals(&self, ticker: &Ticker) -> Result<Option<Fundamentals>>;
}
