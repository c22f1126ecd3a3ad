//! Error types for stock insight operations

use crate::report::AnalysisKind;
use serde::Serialize;
use thiserror::Error;

/// No usable ticker could be derived from the input
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ResolutionError {
    /// Nothing in the input identifies a security
    #[error("no ticker symbol could be identified in the {modality}")]
    NoTicker { modality: String },

    /// A candidate was found but it is not a well-formed symbol
    #[error("'{0}' is not a valid ticker symbol")]
    InvalidTicker(String),

    /// More than one security is mentioned and none is preferred
    #[error("several tickers were mentioned ({})", .candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },

    /// The input carries no content at all
    #[error("the request is empty")]
    EmptyInput,
}

/// One analytical branch that did not produce a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchFailure {
    pub analyzer: AnalysisKind,
    pub reason: String,
}

/// Stock insight specific errors
#[derive(Debug, Error)]
pub enum InsightError {
    /// Ticker resolution failed; nothing downstream can run
    #[error("Ticker resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// A tool or agent invocation failed
    #[error("{component} failed: {cause}")]
    Downstream { component: String, cause: String },

    /// Every analytical branch failed
    #[error("All analyzers failed: {}", describe_failures(.failures))]
    AggregateFailure { failures: Vec<BranchFailure> },

    /// The requested symbol has no market data
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied input that cannot be processed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Market data provider error
    #[error("Market data error: {0}")]
    MarketData(String),

    /// Rate limit exceeded for a data provider
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template error
    #[error("Prompt template error: {0}")]
    Prompt(#[from] minijinja::Error),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the core registries
    #[error(transparent)]
    Core(#[from] insight_core::Error),
}

fn describe_failures(failures: &[BranchFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.analyzer.label(), f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for stock insight operations
pub type Result<T> = std::result::Result<T, InsightError>;

impl InsightError {
    /// Wrap the failure of a named tool or agent
    pub fn downstream(component: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Downstream {
            component: component.into(),
            cause: cause.to_string(),
        }
    }

    /// Explanation suitable for showing to the person who asked
    ///
    /// Internal details stay in the logs; the message says what failed and
    /// that nothing was substituted for the missing data.
    pub fn user_message(&self) -> String {
        match self {
            Self::Resolution(ResolutionError::NoTicker { modality }) => format!(
                "I couldn't identify a stock in your {modality}. Please mention the company \
                 or its ticker symbol, for example AAPL."
            ),
            Self::Resolution(ResolutionError::InvalidTicker(raw)) => format!(
                "'{raw}' doesn't look like a valid ticker symbol. Please check the symbol and try again."
            ),
            Self::Resolution(ResolutionError::Ambiguous { candidates }) => format!(
                "Your request mentions several stocks ({}). Which one should I look at?",
                candidates.join(", ")
            ),
            Self::Resolution(ResolutionError::EmptyInput) => {
                "Your request was empty. Ask about a stock, or attach a chart or a document."
                    .to_string()
            }
            Self::Downstream { component, cause } => format!(
                "The {component} step could not be completed ({cause}). No data was substituted; \
                 please try again later."
            ),
            Self::AggregateFailure { failures } => format!(
                "None of the fundamental, valuation or risk analyses could be completed, so no \
                 report was produced. Details: {}.",
                describe_failures(failures)
            ),
            Self::NotFound(what) => format!("No market data was found for {what}."),
            Self::InvalidInput(reason) => format!("I can't process this request: {reason}."),
            Self::RateLimitExceeded { provider } => {
                format!("The {provider} data service is rate limiting requests. Please retry shortly.")
            }
            other => format!("Something went wrong while handling your request: {other}."),
        }
    }
}

impl From<InsightError> for insight_core::Error {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::NotFound(what) => insight_core::Error::NotFound(what),
            InsightError::InvalidInput(reason) => insight_core::Error::InvalidInput(reason),
            InsightError::Resolution(e) => insight_core::Error::InvalidInput(e.to_string()),
            InsightError::Core(e) => e,
            other => insight_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InsightError::downstream("get_stock_price", "connection reset");
        assert_eq!(err.to_string(), "get_stock_price failed: connection reset");

        let err = InsightError::from(ResolutionError::Ambiguous {
            candidates: vec!["AAPL".to_string(), "MSFT".to_string()],
        });
        assert_eq!(
            err.to_string(),
            "Ticker resolution failed: several tickers were mentioned (AAPL, MSFT)"
        );
    }

    #[test]
    fn test_aggregate_failure_lists_branches() {
        let err = InsightError::AggregateFailure {
            failures: vec![
                BranchFailure {
                    analyzer: AnalysisKind::Fundamental,
                    reason: "timed out".to_string(),
                },
                BranchFailure {
                    analyzer: AnalysisKind::Risk,
                    reason: "malformed output".to_string(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("Fundamental analysis (timed out)"));
        assert!(text.contains("Risk analysis (malformed output)"));
        assert!(err.user_message().contains("no report was produced"));
    }

    #[test]
    fn test_user_messages_are_readable() {
        let err = InsightError::from(ResolutionError::NoTicker {
            modality: "voice transcript".to_string(),
        });
        assert!(err.user_message().starts_with("I couldn't identify a stock in your voice transcript"));

        let err = InsightError::Json(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(err.user_message().starts_with("Something went wrong"));
    }

    #[test]
    fn test_error_conversion() {
        let core: insight_core::Error = InsightError::NotFound("ZZZZ".to_string()).into();
        assert!(core.is_not_found());

        let core: insight_core::Error = InsightError::MarketData("boom".to_string()).into();
        match core {
            insight_core::Error::ProcessingFailed(msg) => assert!(msg.contains("Market data error")),
            other => panic!("Expected ProcessingFailed variant, got {other:?}"),
        }
    }
}
