//! Yahoo Finance backed market data

use super::{AlphaVantageFundamentals, Fundamentals, MarketDataSource, PriceBar, PriceQuote};
use crate::error::{InsightError, Result};
use crate::ticker::Ticker;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Quotes and history from Yahoo Finance, fundamentals from Alpha Vantage when configured
#[derive(Debug, Clone)]
pub struct YahooMarketData {
    currency: String,
    fundamentals: Option<AlphaVantageFundamentals>,
}

impl YahooMarketData {
    /// Create a source reporting quotes in `currency`
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            fundamentals: None,
        }
    }

    /// Attach an Alpha Vantage client for company fundamentals
    pub fn with_fundamentals(mut self, client: AlphaVantageFundamentals) -> Self {
        self.fundamentals = Some(client);
        self
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| InsightError::MarketData(e.to_string()))
    }
}

/// Yahoo reports unknown symbols through several error shapes
fn map_yahoo_error(ticker: &Ticker, err: impl std::fmt::Display) -> InsightError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("404") || lowered.contains("not found") || lowered.contains("no data") {
        InsightError::NotFound(ticker.to_string())
    } else {
        InsightError::MarketData(message)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

#[async_trait]
impl MarketDataSource for YahooMarketData {
    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn quote(&self, ticker: &Ticker) -> Result<PriceQuote> {
        let response = Self::connector()?
            .get_latest_quotes(ticker.as_str(), "1d")
            .await
            .map_err(|e| map_yahoo_error(ticker, e))?;

        let quote = response.last_quote().map_err(|e| map_yahoo_error(ticker, e))?;
        if !quote.close.is_finite() || quote.close <= 0.0 {
            return Err(InsightError::NotFound(ticker.to_string()));
        }

        debug!(price = quote.close, "received quote");
        Ok(PriceQuote {
            ticker: ticker.clone(),
            price: quote.close,
            currency: self.currency.clone(),
            as_of: timestamp(quote.timestamp as i64),
        })
    }

    #[instrument(skip(self), fields(ticker = %ticker))]
    async fn history(&self, ticker: &Ticker, days: u32) -> Result<Vec<PriceBar>> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(days));

        let start = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| InsightError::MarketData(format!("Invalid start timestamp: {e}")))?;
        let end = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| InsightError::MarketData(format!("Invalid end timestamp: {e}")))?;

        let response = Self::connector()?
            .get_quote_history(ticker.as_str(), start, end)
            .await
            .map_err(|e| map_yahoo_error(ticker, e))?;
        let quotes = response.quotes().map_err(|e| map_yahoo_error(ticker, e))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .map(|q| PriceBar {
                timestamp: timestamp(q.timestamp as i64),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect();
        bars.sort_by_key(|bar| bar.timestamp);

        debug!(bars = bars.len(), "received history");
        Ok(bars)
    }

    async fn fundamentals(&self, ticker: &Ticker) -> Result<Option<Fundamentals>> {
        match &self.fundamentals {
            Some(client) => client.overview(ticker).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let ticker = Ticker::parse("ZZZZ").unwrap();
        assert!(matches!(
            map_yahoo_error(&ticker, "fetching the data from yahoo! finance failed: 404 Not Found"),
            InsightError::NotFound(t) if t == "ZZZZ"
        ));
        assert!(matches!(
            map_yahoo_error(&ticker, "connection reset by peer"),
            InsightError::MarketData(_)
        ));
    }

    #[tokio::test]
    async fn test_fundamentals_absent_without_client() {
        let source = YahooMarketData::new("USD");
        let ticker = Ticker::parse("AAPL").unwrap();
        assert_eq!(source.fundamentals(&ticker).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_quote() {
        let source = YahooMarketData::new("USD");
        let quote = source.quote(&Ticker::parse("AAPL").unwrap()).await.unwrap();
        assert_eq!(quote.ticker.as_str(), "AAPL");
        assert!(quote.price > 0.0);
    }
}
