//! Aggregator: merges branch outcomes into one report

use crate::error::{BranchFailure, InsightError, Result};
use crate::market::StockSnapshot;
use crate::report::{AnalysisKind, AnalysisReport, Finding, Section};
use crate::ticker::Ticker;
use std::fmt::Write;

/// What one analytical branch produced: a finding, or why there is none
pub type BranchOutcome = std::result::Result<Finding, String>;

/// Combine the three branch outcomes into a report
///
/// Pure over its inputs. A failed branch, or one that returned a finding of
/// the wrong kind, becomes an unavailable section so the report always has
/// the same shape. When no section is available the result is an
/// [`InsightError::AggregateFailure`].
pub fn combine(
    ticker: Ticker,
    snapshot: StockSnapshot,
    fundamental: BranchOutcome,
    valuation: BranchOutcome,
    risk: BranchOutcome,
) -> Result<AnalysisReport> {
    let outcomes = [
        (AnalysisKind::Fundamental, fundamental),
        (AnalysisKind::Valuation, valuation),
        (AnalysisKind::Risk, risk),
    ];

    let [fundamental, valuation, risk] = outcomes.map(|(kind, outcome)| section(kind, outcome));

    if ![&fundamental, &valuation, &risk].iter().any(|s| s.is_available()) {
        let failures = AnalysisKind::ALL
            .into_iter()
            .zip([fundamental, valuation, risk])
            .filter_map(|(analyzer, section)| match section {
                Section::Unavailable { reason } => Some(BranchFailure { analyzer, reason }),
                Section::Available(_) => None,
            })
            .collect();
        return Err(InsightError::AggregateFailure { failures });
    }

    let narrative_summary = narrate(&ticker, &snapshot, [&fundamental, &valuation, &risk]);

    Ok(AnalysisReport {
        ticker,
        as_of: snapshot.collected_at,
        data_snapshot: snapshot,
        fundamental,
        valuation,
        risk,
        narrative_summary,
    })
}

fn section(kind: AnalysisKind, outcome: BranchOutcome) -> Section {
    match outcome {
        Ok(finding) if finding.kind == kind => Section::Available(finding),
        Ok(finding) => Section::Unavailable {
            reason: format!("analyzer returned a {} finding", finding.kind.label().to_lowercase()),
        },
        Err(reason) => Section::Unavailable { reason },
    }
}

fn narrate(ticker: &Ticker, snapshot: &StockSnapshot, sections: [&Section; 3]) -> String {
    let quote = &snapshot.quote;
    let mut text = match snapshot.fundamentals.as_ref().and_then(|f| f.name.as_deref()) {
        Some(name) => format!("{name} ({ticker})"),
        None => ticker.to_string(),
    };
    let _ = write!(
        text,
        " last traded at {:.2} {} as of {}.",
        quote.price,
        quote.currency,
        quote.as_of.format("%Y-%m-%d %H:%M UTC")
    );

    let mut unavailable = Vec::new();
    for (kind, section) in AnalysisKind::ALL.into_iter().zip(sections) {
        match section {
            Section::Available(finding) => {
                let _ = write!(text, " {}: {}", kind.label(), finding.summary);
                if let Some(signal) = &finding.signal {
                    let _ = write!(text, " (signal: {signal})");
                }
                if !text.ends_with('.') {
                    text.push('.');
                }
            }
            Section::Unavailable { .. } => unavailable.push(kind.label().to_lowercase()),
        }
    }

    if !unavailable.is_empty() {
        let _ = write!(
            text,
            " Not available in this report: {}.",
            unavailable.join(", ")
        );
    }
    text
}
