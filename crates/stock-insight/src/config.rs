//! Configuration for stock insight operations

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Model used by every agent unless overridden
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the insight engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Default model reference for all agents
    pub default_model: String,

    /// Per-agent model references, keyed by agent name
    pub model_overrides: BTreeMap<String, String>,

    /// Maximum tokens per model call
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Time budget for each analytical branch
    pub analyzer_timeout: Duration,

    /// Time budget for each tool invocation
    pub tool_timeout: Duration,

    /// Number of calendar days of price history to collect
    pub history_days: u32,

    /// Currency reported with quotes
    pub currency: String,

    /// Ask the model for a ticker when deterministic extraction finds none
    pub model_ticker_fallback: bool,

    /// Smallest chart image (width, height) worth sending to the model
    pub min_chart_size: (u32, u32),

    /// Alpha Vantage API key for fundamentals (optional)
    #[serde(skip_serializing)]
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            model_overrides: BTreeMap::new(),
            max_tokens: 2048,
            temperature: 0.2,
            analyzer_timeout: Duration::from_secs(45),
            tool_timeout: Duration::from_secs(15),
            history_days: 365,
            currency: "USD".to_string(),
            model_ticker_fallback: true,
            min_chart_size: (200, 120),
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: 5, // free tier
        }
    }
}

impl InsightConfig {
    /// Create a new configuration builder
    pub fn builder() -> InsightConfigBuilder {
        InsightConfigBuilder::default()
    }

    /// Build a configuration from environment variables on top of the defaults
    ///
    /// Recognised variables: `INSIGHT_MODEL`, `INSIGHT_FUNDAMENTAL_MODEL`,
    /// `INSIGHT_MAX_TOKENS`, `INSIGHT_TEMPERATURE`,
    /// `INSIGHT_ANALYZER_TIMEOUT_SECS`, `INSIGHT_TOOL_TIMEOUT_SECS`,
    /// `INSIGHT_HISTORY_DAYS`, `INSIGHT_CURRENCY`, `ALPHA_VANTAGE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Model reference for the named agent
    pub fn model_for(&self, agent: &str) -> &str {
        self.model_overrides
            .get(agent)
            .map_or(self.default_model.as_str(), String::as_str)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_model.trim().is_empty() {
            return Err(InsightError::Config("default_model must not be empty".to_string()));
        }
        if let Some((agent, _)) = self.model_overrides.iter().find(|(_, m)| m.trim().is_empty()) {
            return Err(InsightError::Config(format!("model override for {agent} is empty")));
        }
        if self.max_tokens == 0 {
            return Err(InsightError::Config("max_tokens must be greater than 0".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(InsightError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.analyzer_timeout.is_zero() || self.tool_timeout.is_zero() {
            return Err(InsightError::Config("timeouts must be greater than 0".to_string()));
        }
        if self.history_days == 0 {
            return Err(InsightError::Config("history_days must be greater than 0".to_string()));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(InsightError::Config(format!(
                "currency must be a three-letter ISO code, got '{}'",
                self.currency
            )));
        }
        if self.alpha_vantage_rate_limit == 0 {
            return Err(InsightError::Config(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for InsightConfig
#[derive(Debug, Default)]
pub struct InsightConfigBuilder {
    default_model: Option<String>,
    model_overrides: BTreeMap<String, String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    analyzer_timeout: Option<Duration>,
    tool_timeout: Option<Duration>,
    history_days: Option<u32>,
    currency: Option<String>,
    model_ticker_fallback: Option<bool>,
    min_chart_size: Option<(u32, u32)>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
}

impl InsightConfigBuilder {
    /// Set the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Serve one agent from a different model (e.g. a tuned endpoint)
    pub fn model_for(mut self, agent: impl Into<String>, model: impl Into<String>) -> Self {
        self.model_overrides.insert(agent.into(), model.into());
        self
    }

    /// Set maximum tokens per call
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-analyzer timeout
    pub fn analyzer_timeout(mut self, timeout: Duration) -> Self {
        self.analyzer_timeout = Some(timeout);
        self
    }

    /// Set the per-tool timeout
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Set how many days of history to collect
    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the quote currency
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Enable or disable model-assisted ticker resolution
    pub fn model_ticker_fallback(mut self, enabled: bool) -> Self {
        self.model_ticker_fallback = Some(enabled);
        self
    }

    /// Set the minimum chart image size
    pub fn min_chart_size(mut self, width: u32, height: u32) -> Self {
        self.min_chart_size = Some((width, height));
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Apply environment variables that are set
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(model) = env_var("INSIGHT_MODEL") {
            self.default_model = Some(model);
        }
        if let Some(model) = env_var("INSIGHT_FUNDAMENTAL_MODEL") {
            self.model_overrides
                .insert(crate::agents::names::FUNDAMENTAL.to_string(), model);
        }
        if let Some(value) = env_var("INSIGHT_MAX_TOKENS") {
            self.max_tokens = Some(parse_env("INSIGHT_MAX_TOKENS", &value)?);
        }
        if let Some(value) = env_var("INSIGHT_TEMPERATURE") {
            self.temperature = Some(parse_env("INSIGHT_TEMPERATURE", &value)?);
        }
        if let Some(value) = env_var("INSIGHT_ANALYZER_TIMEOUT_SECS") {
            let secs: u64 = parse_env("INSIGHT_ANALYZER_TIMEOUT_SECS", &value)?;
            self.analyzer_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(value) = env_var("INSIGHT_TOOL_TIMEOUT_SECS") {
            let secs: u64 = parse_env("INSIGHT_TOOL_TIMEOUT_SECS", &value)?;
            self.tool_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(value) = env_var("INSIGHT_HISTORY_DAYS") {
            self.history_days = Some(parse_env("INSIGHT_HISTORY_DAYS", &value)?);
        }
        if let Some(currency) = env_var("INSIGHT_CURRENCY") {
            self.currency = Some(currency.to_ascii_uppercase());
        }
        if let Some(key) = env_var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<InsightConfig> {
        let defaults = InsightConfig::default();

        let config = InsightConfig {
            default_model: self.default_model.unwrap_or(defaults.default_model),
            model_overrides: self.model_overrides,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            analyzer_timeout: self.analyzer_timeout.unwrap_or(defaults.analyzer_timeout),
            tool_timeout: self.tool_timeout.unwrap_or(defaults.tool_timeout),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            currency: self.currency.unwrap_or(defaults.currency),
            model_ticker_fallback: self
                .model_ticker_fallback
                .unwrap_or(defaults.model_ticker_fallback),
            min_chart_size: self.min_chart_size.unwrap_or(defaults.min_chart_size),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| InsightError::Config(format!("{name} has an invalid value '{value}'")))
}
