//! Response formatting for terminal and JSON output

use crate::agents::{ChartObservation, ChartReading, DocumentAnalysis};
use crate::error::InsightError;
use crate::market::{PriceQuote, StockSnapshot};
use crate::report::{AnalysisReport, Section};
use crate::router::RouterResponse;
use comfy_table::Table;
use comfy_table::presets::ASCII_MARKDOWN;
use std::fmt::Write;

pub trait Formatter: Send + Sync {
    fn format_response(&self, response: &RouterResponse) -> String;
    fn format_error(&self, error: &InsightError) -> String;
}

/// Markdown-style text with a metrics table
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_response(&self, response: &RouterResponse) -> String {
        match response {
            RouterResponse::Price { quote } => format_quote(quote),
            RouterResponse::Report { report } => format_report(report),
            RouterResponse::Document { analysis } => format_document(analysis),
            RouterResponse::Chart { reading, follow_up } => {
                let mut out = match reading {
                    ChartReading::Reading(observation) => format_chart(observation),
                    ChartReading::Unreadable { error } => format!("I couldn't read this chart: {error}"),
                };
                if let Some(question) = follow_up {
                    let _ = write!(out, "\n\n{question}");
                }
                out
            }
            RouterResponse::Clarification { message } => message.clone(),
        }
    }

    fn format_error(&self, error: &InsightError) -> String {
        format!("Error: {}", error.user_message())
    }
}

/// Pretty-printed JSON
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_response(&self, response: &RouterResponse) -> String {
        serde_json::to_string_pretty(response)
            .unwrap_or_else(|e| format!(r#"{{"kind": "error", "message": "{e}"}}"#))
    }

    fn format_error(&self, error: &InsightError) -> String {
        serde_json::json!({ "kind": "error", "message": error.user_message() }).to_string()
    }
}

fn format_quote(quote: &PriceQuote) -> String {
    format!(
        "{}: {:.2} {} (as of {})",
        quote.ticker,
        quote.price,
        quote.currency,
        quote.as_of.format("%Y-%m-%d %H:%M UTC")
    )
}

fn format_report(report: &AnalysisReport) -> String {
    let mut out = format!(
        "# Stock analysis: {} (as of {})\n\n{}\n\n",
        report.ticker,
        report.as_of.format("%Y-%m-%d %H:%M UTC"),
        report.narrative_summary
    );
    out.push_str(&metrics_table(&report.data_snapshot).to_string());

    for (label, section) in [
        ("Fundamental analysis", &report.fundamental),
        ("Valuation analysis", &report.valuation),
        ("Risk analysis", &report.risk),
    ] {
        match section {
            Section::Available(finding) => {
                let _ = write!(out, "\n\n## {label}");
                if let Some(signal) = &finding.signal {
                    let _ = write!(out, " (signal: {signal})");
                }
                let _ = write!(out, "\n{}", finding.summary);
                for point in &finding.key_points {
                    let _ = write!(out, "\n- {point}");
                }
            }
            Section::Unavailable { reason } => {
                let _ = write!(out, "\n\n## {label}\nUnavailable: {reason}");
            }
        }
    }
    out
}

fn metrics_table(snapshot: &StockSnapshot) -> Table {
    let f = snapshot.fundamentals.clone().unwrap_or_default();
    let t = &snapshot.technicals;
    let currency = &snapshot.quote.currency;

    let rows: Vec<(&str, Option<String>)> = vec![
        ("Price", Some(format!("{:.2} {currency}", snapshot.quote.price))),
        ("Market cap", f.market_cap.map(|v| format!("{} {currency}", abbreviate(v)))),
        ("P/E ratio", f.pe_ratio.map(|v| format!("{v:.2}"))),
        ("Forward P/E", f.forward_pe.map(|v| format!("{v:.2}"))),
        ("Price/book", f.price_to_book.map(|v| format!("{v:.2}"))),
        ("Profit margin", f.profit_margin.map(percent)),
        ("Beta", f.beta.map(|v| format!("{v:.2}"))),
        ("52-week range", f.week_52_low.zip(f.week_52_high).map(|(l, h)| format!("{l:.2} - {h:.2}"))),
        ("SMA 50", t.sma_50.map(|v| format!("{v:.2}"))),
        ("SMA 200", t.sma_200.map(|v| format!("{v:.2}"))),
        ("Volatility (ann.)", t.annualized_volatility.map(percent)),
        ("Max drawdown", t.max_drawdown.map(percent)),
        ("Period return", t.period_return.map(percent)),
    ];

    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(vec!["Metric", "Value"]);
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value.unwrap_or_else(|| "n/a".to_string())]);
    }
    table
}

fn format_document(analysis: &DocumentAnalysis) -> String {
    let mut out = String::from("## Raw data extraction\n");
    let subject = [
        ("Company", analysis.company.as_deref()),
        ("Ticker", analysis.ticker.as_ref().map(|t| t.as_str())),
        ("Sector", analysis.sector.as_deref()),
        ("Period", analysis.period.as_deref()),
    ];
    for (label, value) in subject {
        if let Some(value) = value {
            let _ = writeln!(out, "{label}: {value}");
        }
    }

    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(vec!["Metric", "Value"]);
    for (label, fact) in analysis.facts.entries() {
        table.add_row(vec![label.to_string(), fact.to_string()]);
    }
    let _ = write!(out, "\n{table}\n");

    push_list(&mut out, "Key points", &analysis.key_points);
    push_list(&mut out, "Risk factors", &analysis.risk_factors);
    if let Some(guidance) = &analysis.guidance {
        let _ = write!(out, "\nGuidance: {guidance}\n");
    }

    let summary = &analysis.summary;
    let _ = write!(out, "\n## Investment summary (interpretive)\n{}\n", summary.thesis);
    push_list(&mut out, "Strengths", &summary.strengths);
    push_list(&mut out, "Risks", &summary.risks);
    if !summary.outlook.is_empty() {
        let _ = write!(out, "\nOutlook: {}\n", summary.outlook);
    }
    if let Some(question) = &analysis.follow_up {
        let _ = write!(out, "\n{question}");
    }
    out.trim_end().to_string()
}

fn format_chart(observation: &ChartObservation) -> String {
    let levels = |levels: &[f64]| {
        levels
            .iter()
            .map(|l| format!("{l:.2}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = format!("## Chart reading: {}", observation.ticker);
    if let Some(timeframe) = &observation.timeframe {
        let _ = write!(out, " ({timeframe})");
    }
    let _ = write!(out, "\nTrend: {:?}", observation.trend);
    if let Some(price) = observation.price_level {
        let _ = write!(out, "\nLast price: {price:.2}");
    }
    let _ = write!(
        out,
        "\nSupport: {}\nResistance: {}\nVolume: {:?}\n\n{}",
        levels(&observation.support_levels),
        levels(&observation.resistance_levels),
        observation.volume_trend,
        observation.summary
    );
    out
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "\n{heading}:\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn abbreviate(value: f64) -> String {
    match value.abs() {
        v if v >= 1e12 => format!("{:.2}T", value / 1e12),
        v if v >= 1e9 => format!("{:.2}B", value / 1e9),
        v if v >= 1e6 => format!("{:.2}M", value / 1e6),
        _ => format!("{value:.0}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Fact, FinancialFacts, InvestmentSummary, PriceRange, Trend, VolumeTrend};
    use crate::market::fixtures;
    use crate::report::{AnalysisKind, Finding};
    use crate::ticker::Ticker;
    use std::collections::BTreeMap;

    fn report() -> AnalysisReport {
        let snapshot = fixtures::snapshot("TSLA");
        crate::agents::combine(
            snapshot.ticker.clone(),
            snapshot,
            Ok(Finding {
                kind: AnalysisKind::Fundamental,
                summary: "Margins are compressing.".to_string(),
                key_points: vec!["Operating margin 8%".to_string()],
                signal: Some("stable".to_string()),
                metrics: BTreeMap::new(),
            }),
            Err("timed out after 45s".to_string()),
            Err("model unavailable".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_price_text() {
        let ticker = Ticker::parse("AAPL").unwrap();
        let response = RouterResponse::Price {
            quote: fixtures::quote(&ticker, 227.5),
        };
        assert_eq!(
            TextFormatter.format_response(&response),
            "AAPL: 227.50 USD (as of 2025-01-31 21:00 UTC)"
        );
    }

    #[test]
    fn test_report_text() {
        let text = TextFormatter.format_response(&RouterResponse::Report {
            report: Box::new(report()),
        });

        assert!(text.starts_with("# Stock analysis: TSLA (as of 2025-01-31 21:00 UTC)"));
        assert!(text.contains("P/E ratio"));
        assert!(text.contains("95.20"));
        assert!(text.contains("1.10T USD"));
        assert!(text.contains("## Fundamental analysis (signal: stable)\nMargins are compressing.\n- Operating margin 8%"));
        assert!(text.contains("## Valuation analysis\nUnavailable: timed out after 45s"));
    }

    #[test]
    fn test_document_text_marks_missing_facts() {
        let analysis = DocumentAnalysis {
            ticker: Some(Ticker::parse("AAPL").unwrap()),
            title: None,
            company: Some("Apple Inc.".to_string()),
            sector: None,
            period: None,
            facts: FinancialFacts {
                revenue: Fact::Stated("$124.3 billion".to_string()),
                ..FinancialFacts::default()
            },
            key_points: vec![],
            risk_factors: vec!["Supply chain".to_string()],
            guidance: None,
            summary: InvestmentSummary {
                thesis: "Services carry growth.".to_string(),
                ..InvestmentSummary::default()
            },
            follow_up: Some("Would you like a full real-time analysis report for AAPL using current market data?".to_string()),
        };

        let text = TextFormatter.format_response(&RouterResponse::Document {
            analysis: Box::new(analysis),
        });
        assert!(text.starts_with("## Raw data extraction\nCompany: Apple Inc.\nTicker: AAPL\n"));
        assert!(text.contains("$124.3 billion"));
        assert!(text.contains("Not stated in document"));
        assert!(text.contains("## Investment summary (interpretive)\nServices carry growth."));
        assert!(text.ends_with("using current market data?"));
    }

    #[test]
    fn test_chart_text() {
        let observation = ChartObservation {
            ticker: Ticker::parse("TSLA").unwrap(),
            timeframe: Some("6M".to_string()),
            price_level: None,
            price_axis: PriceRange { low: 300.0, high: 400.0 },
            trend: Trend::Up,
            support_levels: vec![310.0, 330.0],
            resistance_levels: vec![380.0],
            volume_trend: VolumeTrend::Flat,
            summary: "Climbing.".to_string(),
            follow_up_offered: true,
        };
        let text = TextFormatter.format_response(&RouterResponse::Chart {
            reading: ChartReading::Reading(observation),
            follow_up: Some("Would you like a full fundamental analysis report for TSLA?".to_string()),
        });

        assert!(text.starts_with("## Chart reading: TSLA (6M)\nTrend: Up\nSupport: 310.00, 330.00"));
        assert!(text.ends_with("Climbing.\n\nWould you like a full fundamental analysis report for TSLA?"));

        let text = TextFormatter.format_response(&RouterResponse::Chart {
            reading: ChartReading::unreadable("blurry"),
            follow_up: None,
        });
        assert_eq!(text, "I couldn't read this chart: blurry");
    }

    #[test]
    fn test_json_output() {
        let json = JsonFormatter.format_response(&RouterResponse::Report {
            report: Box::new(report()),
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "report");
        assert_eq!(value["report"]["valuation"]["status"], "unavailable");
        assert_eq!(value["report"]["fundamental"]["status"], "available");

        let error = JsonFormatter.format_error(&InsightError::NotFound("ZZZZ".to_string()));
        let value: serde_json::Value = serde_json::from_str(&error).unwrap();
        assert_eq!(value["message"], "No market data was found for ZZZZ.");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate(1.1e12), "1.10T");
        assert_eq!(abbreviate(9.7e10), "97.00B");
        assert_eq!(abbreviate(5_000.0), "5000");
    }
}
