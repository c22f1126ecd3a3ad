//! Alpha Vantage company overview client

use super::Fundamentals;
use crate::error::{InsightError, Result};
use crate::ticker::Ticker;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://www.alphavantage.co";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Fundamentals from the Alpha Vantage `OVERVIEW` endpoint
#[derive(Debug, Clone)]
pub struct AlphaVantageFundamentals {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

/// Raw overview payload; Alpha Vantage sends every number as a string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CompanyOverview {
    symbol: Option<String>,
    name: Option<String>,
    exchange: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "ForwardPE")]
    forward_pe: Option<String>,
    #[serde(rename = "PEGRatio")]
    peg_ratio: Option<String>,
    price_to_book_ratio: Option<String>,
    #[serde(rename = "EPS")]
    eps: Option<String>,
    dividend_yield: Option<String>,
    profit_margin: Option<String>,
    #[serde(rename = "OperatingMarginTTM")]
    operating_margin: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    return_on_equity: Option<String>,
    #[serde(rename = "RevenueTTM")]
    revenue_ttm: Option<String>,
    beta: Option<String>,
    #[serde(rename = "52WeekHigh")]
    week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    week_52_low: Option<String>,
}

/// Alpha Vantage uses "None" and "-" for missing values
fn number(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None" && *s != "-")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "None" && s != "-")
}

impl From<CompanyOverview> for Fundamentals {
    fn from(o: CompanyOverview) -> Self {
        Fundamentals {
            market_cap: number(&o.market_capitalization),
            pe_ratio: number(&o.pe_ratio),
            forward_pe: number(&o.forward_pe),
            peg_ratio: number(&o.peg_ratio),
            price_to_book: number(&o.price_to_book_ratio),
            eps: number(&o.eps),
            dividend_yield: number(&o.dividend_yield),
            profit_margin: number(&o.profit_margin),
            operating_margin: number(&o.operating_margin),
            return_on_equity: number(&o.return_on_equity),
            revenue_ttm: number(&o.revenue_ttm),
            beta: number(&o.beta),
            week_52_high: number(&o.week_52_high),
            week_52_low: number(&o.week_52_low),
            name: text(o.name),
            exchange: text(o.exchange),
            sector: text(o.sector),
            industry: text(o.industry),
        }
    }
}

impl AlphaVantageFundamentals {
    /// Create a client allowing `rate_limit` requests per minute
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the company overview for a ticker
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn overview(&self, ticker: &Ticker) -> Result<Fundamentals> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", ticker.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InsightError::MarketData(format!(
                "Alpha Vantage HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(InsightError::MarketData(error.to_string()));
        }
        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(InsightError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string(),
            });
        }

        let overview: CompanyOverview = serde_json::from_value(data)?;
        if overview.symbol.is_none() {
            // empty object for unknown symbols
            return Err(InsightError::NotFound(ticker.to_string()));
        }

        debug!("received company overview");
        Ok(overview.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AlphaVantageFundamentals {
        AlphaVantageFundamentals::new("demo", 600).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_overview_parses_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "OVERVIEW"))
            .and(query_param("symbol", "MSFT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Symbol": "MSFT",
                "Name": "Microsoft Corporation",
                "Sector": "TECHNOLOGY",
                "MarketCapitalization": "3100000000000",
                "PERatio": "35.2",
                "PEGRatio": "None",
                "DividendYield": "0.0072",
                "Beta": "-",
                "52WeekHigh": "468.35"
            })))
            .mount(&server)
            .await;

        let ticker = Ticker::parse("MSFT").unwrap();
        let fundamentals = client(&server).overview(&ticker).await.unwrap();
        assert_eq!(fundamentals.name.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(fundamentals.market_cap, Some(3.1e12));
        assert_eq!(fundamentals.pe_ratio, Some(35.2));
        assert_eq!(fundamentals.peg_ratio, None);
        assert_eq!(fundamentals.beta, None);
        assert_eq!(fundamentals.week_52_high, Some(468.35));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let ticker = Ticker::parse("ZZZZ").unwrap();
        let err = client(&server).overview(&ticker).await.unwrap_err();
        assert!(matches!(err, InsightError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_note() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
            })))
            .mount(&server)
            .await;

        let ticker = Ticker::parse("IBM").unwrap();
        let err = client(&server).overview(&ticker).await.unwrap_err();
        assert!(matches!(err, InsightError::RateLimitExceeded { .. }));
    }
}
