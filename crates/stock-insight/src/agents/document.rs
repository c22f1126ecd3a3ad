//! Document analysis: stated facts plus an interpretive summary

use super::model_failure;
use crate::error::{InsightError, Result};
use crate::input::DocumentAttachment;
use crate::prompts::{PromptLibrary, user};
use crate::ticker::Ticker;
use insight_llm::{Message, ModelAgent};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Marker used for every metric the document does not state
pub const NOT_STATED: &str = "Not stated in document";

/// A financial figure as the document states it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fact {
    Stated(String),
    #[default]
    NotStated,
}

impl Fact {
    pub fn as_stated(&self) -> Option<&str> {
        match self {
            Self::Stated(value) => Some(value),
            Self::NotStated => None,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_stated().unwrap_or(NOT_STATED))
    }
}

impl Serialize for Fact {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_stated().unwrap_or(NOT_STATED))
    }
}

/// Headline financials, each either quoted from the document or marked absent
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FinancialFacts {
    pub revenue: Fact,
    pub ebit: Fact,
    pub net_income: Fact,
    pub gross_margin: Fact,
    pub operating_margin: Fact,
    pub net_margin: Fact,
    pub cash_flow: Fact,
}

impl FinancialFacts {
    /// Label and value of every metric, in presentation order
    pub fn entries(&self) -> [(&'static str, &Fact); 7] {
        [
            ("Revenue", &self.revenue),
            ("EBIT", &self.ebit),
            ("Net income", &self.net_income),
            ("Gross margin", &self.gross_margin),
            ("Operating margin", &self.operating_margin),
            ("Net margin", &self.net_margin),
            ("Cash flow", &self.cash_flow),
        ]
    }
}

/// The interpretive half of a document analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentSummary {
    pub thesis: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub outlook: String,
}

/// Result of analysing one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAnalysis {
    pub ticker: Option<Ticker>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub sector: Option<String>,
    pub period: Option<String>,
    /// Raw data extraction
    pub facts: FinancialFacts,
    pub key_points: Vec<String>,
    pub risk_factors: Vec<String>,
    pub guidance: Option<String>,
    /// Investment summary, interpretive
    pub summary: InvestmentSummary,
    pub follow_up: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFacts {
    revenue: Option<Value>,
    ebit: Option<Value>,
    net_income: Option<Value>,
    gross_margin: Option<Value>,
    operating_margin: Option<Value>,
    net_margin: Option<Value>,
    cash_flow: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    company: Option<String>,
    sector: Option<String>,
    period: Option<String>,
    facts: RawFacts,
    key_points: Vec<String>,
    risk_factors: Vec<String>,
    guidance: Option<String>,
    summary: InvestmentSummary,
}

/// Analyses documents through the document analysis agent
pub struct DocumentAnalyzer {
    agent: ModelAgent,
    prompts: Arc<PromptLibrary>,
}

impl DocumentAnalyzer {
    pub fn new(agent: ModelAgent, prompts: Arc<PromptLibrary>) -> Self {
        Self { agent, prompts }
    }

    #[instrument(skip_all, fields(title = ?document.title, ticker = ?ticker))]
    pub async fn analyze(
        &self,
        document: &DocumentAttachment,
        ticker: Option<Ticker>,
    ) -> Result<DocumentAnalysis> {
        if document.is_empty() {
            return Err(InsightError::InvalidInput("the document has no text".to_string()));
        }

        let prompt = self.prompts.render(
            user::ANALYZE_DOCUMENT,
            json!({ "title": document.title, "ticker": ticker, "text": document.text }),
        )?;
        let raw: RawAnalysis = self
            .agent
            .invoke_json(vec![Message::user(prompt)])
            .await
            .map_err(|e| model_failure(&self.agent, e))?;

        if raw.summary.thesis.trim().is_empty() {
            return Err(InsightError::downstream(
                self.agent.name(),
                "reply has no investment thesis",
            ));
        }

        let source = normalize(&document.text);
        let stated = |value: Option<Value>, field: &str| {
            let fact = verify(value.as_ref(), &source);
            if fact == Fact::NotStated && value.is_some_and(|v| !v.is_null()) {
                debug!(field, "discarding figure not found in the document");
            }
            fact
        };
        let facts = FinancialFacts {
            revenue: stated(raw.facts.revenue, "revenue"),
            ebit: stated(raw.facts.ebit, "ebit"),
            net_income: stated(raw.facts.net_income, "net_income"),
            gross_margin: stated(raw.facts.gross_margin, "gross_margin"),
            operating_margin: stated(raw.facts.operating_margin, "operating_margin"),
            net_margin: stated(raw.facts.net_margin, "net_margin"),
            cash_flow: stated(raw.facts.cash_flow, "cash_flow"),
        };

        let follow_up = ticker.as_ref().map(|t| {
            format!("Would you like a full real-time analysis report for {t} using current market data?")
        });

        Ok(DocumentAnalysis {
            ticker,
            title: document.title.clone(),
            company: non_blank(raw.company),
            sector: non_blank(raw.sector),
            period: non_blank(raw.period),
            facts,
            key_points: clean(raw.key_points),
            risk_factors: clean(raw.risk_factors),
            guidance: non_blank(raw.guidance),
            summary: InvestmentSummary {
                thesis: raw.summary.thesis.trim().to_string(),
                strengths: clean(raw.summary.strengths),
                risks: clean(raw.summary.risks),
                outlook: raw.summary.outlook.trim().to_string(),
            },
            follow_up,
        })
    }
}

/// Keep a figure only when it appears in the document text
fn verify(value: Option<&Value>, source: &str) -> Fact {
    let text = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Fact::NotStated,
    };
    let needle = normalize(&text);
    if needle.is_empty() || !appears_as_token(&needle, source) {
        return Fact::NotStated;
    }
    Fact::Stated(text.trim().to_string())
}

/// Whether `needle` occurs in `source` without being part of a longer
/// number or word: `12` does not match inside `$124.3`, nor `3` after `124.`
fn appears_as_token(needle: &str, source: &str) -> bool {
    let starts_alnum = needle.chars().next().is_some_and(char::is_alphanumeric);
    let ends_alnum = needle.chars().last().is_some_and(char::is_alphanumeric);

    let mut pattern = String::new();
    if starts_alnum {
        pattern.push_str(r"(?:^|[^\p{Alphabetic}\p{Nd}.,])");
    }
    pattern.push_str(&regex::escape(needle));
    if ends_alnum {
        pattern.push_str(r"(?:$|[^\p{Alphabetic}\p{Nd}.,]|[.,](?:[^\p{Nd}]|$))");
    }
    Regex::new(&pattern).is_ok_and(|re| re.is_match(source))
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::names;
    use crate::testing::{ScriptedProvider, model_agent, prompts};

    const RELEASE: &str = "# Apple Q1 FY25 Results\n\nApple reported quarterly revenue of \
        $124.3 billion,\nup 4 percent year over year. Net income was $36.33 billion. \
        Gross margin was 46.9%.";

    fn analyzer(provider: &Arc<ScriptedProvider>) -> DocumentAnalyzer {
        DocumentAnalyzer::new(model_agent(names::DOCUMENT, provider), prompts())
    }

    fn document() -> DocumentAttachment {
        DocumentAttachment::new(Some("Apple Q1 FY25 Results".to_string()), RELEASE)
    }

    #[tokio::test]
    async fn test_only_stated_figures_survive() {
        let provider = Arc::new(ScriptedProvider::new().reply(
            names::DOCUMENT,
            r#"{
                "company": "Apple Inc.",
                "sector": " ",
                "period": "Q1 FY25",
                "facts": {
                    "revenue": "$124.3   Billion",
                    "ebit": "$42.8 billion",
                    "net_income": "$36.33 billion",
                    "gross_margin": 46.9,
                    "operating_margin": null,
                    "cash_flow": "Not stated in document"
                },
                "key_points": ["Revenue up 4 percent", ""],
                "risk_factors": [],
                "guidance": null,
                "summary": {"thesis": "Steady growth.", "strengths": ["Services"], "risks": [], "outlook": "Stable."}
            }"#,
        ));
        let ticker = Ticker::parse("AAPL").unwrap();

        let analysis = analyzer(&provider).analyze(&document(), Some(ticker)).await.unwrap();

        assert_eq!(analysis.facts.revenue, Fact::Stated("$124.3   Billion".to_string()));
        assert_eq!(analysis.facts.ebit, Fact::NotStated);
        assert_eq!(analysis.facts.net_income.as_stated(), Some("$36.33 billion"));
        assert_eq!(analysis.facts.gross_margin.as_stated(), Some("46.9"));
        assert_eq!(analysis.facts.operating_margin, Fact::NotStated);
        assert_eq!(analysis.facts.net_margin, Fact::NotStated);
        assert_eq!(analysis.facts.cash_flow, Fact::NotStated);
        assert_eq!(analysis.sector, None);
        assert_eq!(analysis.key_points, vec!["Revenue up 4 percent"]);
        assert_eq!(
            analysis.follow_up.as_deref(),
            Some("Would you like a full real-time analysis report for AAPL using current market data?")
        );
    }

    #[tokio::test]
    async fn test_missing_metrics_serialize_as_marker() {
        let provider = Arc::new(ScriptedProvider::new().reply(
            names::DOCUMENT,
            r#"{"facts": {}, "summary": {"thesis": "Too early to say.", "outlook": "Unclear."}}"#,
        ));

        let analysis = analyzer(&provider).analyze(&document(), None).await.unwrap();
        assert_eq!(analysis.follow_up, None);

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["facts"]["revenue"], NOT_STATED);
        assert_eq!(json["facts"]["ebit"], NOT_STATED);
        assert_eq!(json["title"], "Apple Q1 FY25 Results");
    }

    #[tokio::test]
    async fn test_empty_document_is_rejected() {
        let provider = Arc::new(ScriptedProvider::new());
        let blank = DocumentAttachment::new(None, "  \n ");

        let err = analyzer(&provider).analyze(&blank, None).await.unwrap_err();
        assert!(matches!(err, InsightError::InvalidInput(_)));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reply_without_thesis_is_downstream() {
        let provider = Arc::new(
            ScriptedProvider::new().reply(names::DOCUMENT, r#"{"facts": {"revenue": "$124.3 billion"}}"#),
        );

        let err = analyzer(&provider).analyze(&document(), None).await.unwrap_err();
        assert!(matches!(err, InsightError::Downstream { .. }));
    }

    #[tokio::test]
    async fn test_digits_inside_longer_numbers_are_not_stated() {
        let provider = Arc::new(ScriptedProvider::new().reply(
            names::DOCUMENT,
            r#"{"facts": {"revenue": "$124.3 billion", "net_margin": "12", "operating_margin": 1},
                "summary": {"thesis": "Services carry growth.", "outlook": "Stable."}}"#,
        ));
        let document = DocumentAttachment::new(None, "Quarterly revenue of $124.3 billion in Q1.");

        let analysis = analyzer(&provider).analyze(&document, None).await.unwrap();

        assert_eq!(analysis.facts.revenue.as_stated(), Some("$124.3 billion"));
        assert_eq!(analysis.facts.net_margin, Fact::NotStated);
        assert_eq!(analysis.facts.operating_margin, Fact::NotStated);
    }

    #[test]
    fn test_figures_match_on_token_boundaries() {
        let source = normalize("Revenue was $124.3 billion, up from 1,180 units. Margin 46.9%.");
        assert!(appears_as_token("$124.3 billion", &source));
        assert!(appears_as_token("124.3", &source));
        assert!(appears_as_token("46.9%", &source));
        assert!(appears_as_token("1,180", &source));
        assert!(!appears_as_token("12", &source));
        assert!(!appears_as_token("124", &source));
        assert!(!appears_as_token("3", &source));
        assert!(!appears_as_token("180", &source));
        assert!(!appears_as_token("venue", &source));
    }

    #[test]
    fn test_verify_normalizes_whitespace_and_case() {
        let source = normalize(RELEASE);
        assert_eq!(
            verify(Some(&json!("$124.3 BILLION")), &source),
            Fact::Stated("$124.3 BILLION".to_string())
        );
        assert_eq!(verify(Some(&json!("")), &source), Fact::NotStated);
        assert_eq!(verify(Some(&json!(true)), &source), Fact::NotStated);
        assert_eq!(verify(None, &source), Fact::NotStated);
    }
}
