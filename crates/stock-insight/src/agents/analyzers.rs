//! Fundamental, valuation and risk analyzers

use super::model_failure;
use crate::error::{InsightError, Result};
use crate::market::StockSnapshot;
use crate::prompts::{PromptLibrary, user};
use crate::report::{AnalysisKind, Finding};
use crate::ticker::Ticker;
use async_trait::async_trait;
use insight_llm::{Message, ModelAgent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

const MAX_KEY_POINTS: usize = 8;

/// One analytical branch of the planner
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalysisKind;

    /// Analyse a collected snapshot
    async fn analyze(&self, ticker: &Ticker, snapshot: &StockSnapshot) -> Result<Finding>;
}

/// Reply contract shared by all three analyst agents
#[derive(Debug, Deserialize)]
struct AnalystReply {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default)]
    signal: Option<String>,
}

#[derive(Serialize)]
struct Metric<'a> {
    name: &'a str,
    value: f64,
}

/// Analyzer backed by one analyst agent
pub struct ModelAnalyzer {
    kind: AnalysisKind,
    agent: ModelAgent,
    prompts: Arc<PromptLibrary>,
}

impl ModelAnalyzer {
    pub fn new(kind: AnalysisKind, agent: ModelAgent, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            kind,
            agent,
            prompts,
        }
    }
}

#[async_trait]
impl Analyzer for ModelAnalyzer {
    fn kind(&self) -> AnalysisKind {
        self.kind
    }

    #[instrument(skip(self, snapshot), fields(kind = ?self.kind, ticker = %ticker))]
    async fn analyze(&self, ticker: &Ticker, snapshot: &StockSnapshot) -> Result<Finding> {
        let (metrics, missing) = grounding_metrics(self.kind, snapshot);
        if metrics.is_empty() {
            return Err(InsightError::downstream(
                self.agent.name(),
                format!("no {} data available", self.kind.label().to_lowercase()),
            ));
        }

        let listed: Vec<Metric<'_>> = metrics
            .iter()
            .map(|(name, value)| Metric { name, value: *value })
            .collect();
        let prompt = self.prompts.render(
            user::ANALYZE,
            json!({
                "kind": self.kind.label(),
                "ticker": ticker,
                "price": snapshot.quote.price,
                "currency": snapshot.quote.currency,
                "as_of": snapshot.quote.as_of.to_rfc3339(),
                "company": snapshot.fundamentals.as_ref().and_then(|f| f.name.as_deref()),
                "metrics": listed,
                "missing": missing,
            }),
        )?;

        let reply: AnalystReply = self
            .agent
            .invoke_json(vec![Message::user(prompt)])
            .await
            .map_err(|e| model_failure(&self.agent, e))?;

        let summary = reply.summary.trim().to_string();
        if summary.is_empty() {
            return Err(InsightError::downstream(self.agent.name(), "reply has an empty summary"));
        }

        let signal = reply
            .signal
            .as_deref()
            .and_then(|raw| self.kind.normalize_signal(raw));
        if signal.is_none() {
            debug!(raw = ?reply.signal, "dropping unrecognised signal");
        }

        Ok(Finding {
            kind: self.kind,
            summary,
            key_points: reply
                .key_points
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .take(MAX_KEY_POINTS)
                .collect(),
            signal,
            metrics,
        })
    }
}

/// Metrics computed in code that ground one kind of analysis
///
/// Returns the available metrics and the names of those the snapshot lacks.
pub fn grounding_metrics(
    kind: AnalysisKind,
    snapshot: &StockSnapshot,
) -> (BTreeMap<String, f64>, Vec<&'static str>) {
    let f = snapshot.fundamentals.clone().unwrap_or_default();
    let t = &snapshot.technicals;
    let price = snapshot.quote.price;

    let candidates: Vec<(&'static str, Option<f64>)> = match kind {
        AnalysisKind::Fundamental => vec![
            ("revenue_ttm", f.revenue_ttm),
            ("profit_margin", f.profit_margin),
            ("operating_margin", f.operating_margin),
            ("return_on_equity", f.return_on_equity),
            ("eps", f.eps),
            ("market_cap", f.market_cap),
        ],
        AnalysisKind::Valuation => vec![
            ("price", Some(price)),
            ("pe_ratio", f.pe_ratio),
            ("forward_pe", f.forward_pe),
            ("peg_ratio", f.peg_ratio),
            ("price_to_book", f.price_to_book),
            ("dividend_yield", f.dividend_yield),
            ("price_vs_52w_high", f.week_52_high.map(|high| price / high - 1.0)),
            ("price_vs_sma_200", t.sma_200.map(|sma| price / sma - 1.0)),
        ],
        AnalysisKind::Risk => vec![
            ("beta", f.beta),
            ("annualized_volatility", t.annualized_volatility),
            ("max_drawdown", t.max_drawdown),
            ("period_return", t.period_return),
        ],
    };

    let mut metrics = BTreeMap::new();
    let mut missing = Vec::new();
    for (name, value) in candidates {
        match value.filter(|v| v.is_finite()) {
            Some(value) => {
                metrics.insert(name.to_string(), value);
            }
            None => missing.push(name),
        }
    }
    (metrics, missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::names;
    use crate::market::fixtures;
    use crate::testing::{ScriptedProvider, model_agent, prompts};

    fn analyzer(kind: AnalysisKind, provider: &Arc<ScriptedProvider>) -> ModelAnalyzer {
        ModelAnalyzer::new(kind, model_agent(kind.agent_name(), provider), prompts())
    }

    #[tokio::test]
    async fn test_valid_reply() {
        let provider = Arc::new(ScriptedProvider::new().reply(
            names::RISK,
            r#"```json
{"summary": "Volatile stock with a high beta.", "key_points": ["Beta of 2.3", "  ", "Drawdown of 7%"], "signal": "High"}
```"#,
        ));
        let snapshot = fixtures::snapshot("TSLA");

        let finding = analyzer(AnalysisKind::Risk, &provider)
            .analyze(&snapshot.ticker, &snapshot)
            .await
            .unwrap();

        assert_eq!(finding.kind, AnalysisKind::Risk);
        assert_eq!(finding.signal.as_deref(), Some("high"));
        assert_eq!(finding.key_points, vec!["Beta of 2.3", "Drawdown of 7%"]);
        assert_eq!(finding.metrics.get("beta"), Some(&2.3));
        assert!(finding.metrics.contains_key("annualized_volatility"));

        let prompt = provider.requests()[0].messages[0].text().unwrap();
        assert!(prompt.contains("- beta: 2.3"));
    }

    #[tokio::test]
    async fn test_unknown_signal_is_dropped() {
        let provider = Arc::new(ScriptedProvider::new().reply(
            names::VALUATION,
            r#"{"summary": "Priced for perfection.", "key_points": [], "signal": "buy now"}"#,
        ));
        let snapshot = fixtures::snapshot("TSLA");

        let finding = analyzer(AnalysisKind::Valuation, &provider)
            .analyze(&snapshot.ticker, &snapshot)
            .await
            .unwrap();
        assert_eq!(finding.signal, None);
    }

    #[tokio::test]
    async fn test_empty_summary_is_downstream() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply(names::FUNDAMENTAL, r#"{"summary": " ", "key_points": ["x"]}"#),
        );
        let snapshot = fixtures::snapshot("TSLA");

        let err = analyzer(AnalysisKind::Fundamental, &provider)
            .analyze(&snapshot.ticker, &snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Downstream { ref component, .. } if component == names::FUNDAMENTAL));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_downstream() {
        let provider =
            Arc::new(ScriptedProvider::new().reply(names::RISK, "I think it is risky."));
        let snapshot = fixtures::snapshot("TSLA");

        let err = analyzer(AnalysisKind::Risk, &provider)
            .analyze(&snapshot.ticker, &snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Downstream { .. }));
    }

    #[tokio::test]
    async fn test_no_fundamentals_skips_model() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut snapshot = fixtures::snapshot("TSLA");
        snapshot.fundamentals = None;

        let err = analyzer(AnalysisKind::Fundamental, &provider)
            .analyze(&snapshot.ticker, &snapshot)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no fundamental analysis data available"));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_grounding_metrics() {
        let mut snapshot = fixtures::snapshot("TSLA");
        snapshot.fundamentals = None;

        let (metrics, missing) = grounding_metrics(AnalysisKind::Valuation, &snapshot);
        assert_eq!(metrics.get("price"), Some(&345.6));
        assert!(metrics.contains_key("price_vs_sma_200"));
        assert!(missing.contains(&"pe_ratio"));

        let (metrics, _) = grounding_metrics(AnalysisKind::Fundamental, &snapshot);
        assert!(metrics.is_empty());
    }
}
