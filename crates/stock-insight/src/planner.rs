//! Planner: resolve, collect, analyse in parallel, aggregate

use crate::agents::{Analyzer, BranchOutcome, DataCollector, combine};
use crate::error::Result;
use crate::input::UserInput;
use crate::market::StockSnapshot;
use crate::report::AnalysisReport;
use crate::ticker::Ticker;
use insight_core::RequestContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Sequences the sub-agents of a full analysis run
///
/// Ticker resolution always completes before any analyzer starts, and the
/// aggregator only runs once all three branches have settled.
pub struct Planner {
    collector: Arc<DataCollector>,
    fundamental: Arc<dyn Analyzer>,
    valuation: Arc<dyn Analyzer>,
    risk: Arc<dyn Analyzer>,
    analyzer_timeout: Duration,
}

impl Planner {
    pub fn new(
        collector: Arc<DataCollector>,
        fundamental: Arc<dyn Analyzer>,
        valuation: Arc<dyn Analyzer>,
        risk: Arc<dyn Analyzer>,
        analyzer_timeout: Duration,
    ) -> Self {
        Self {
            collector,
            fundamental,
            valuation,
            risk,
            analyzer_timeout,
        }
    }

    /// Produce a full report for whatever stock the input is about
    #[instrument(skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn run(&self, input: &UserInput, ctx: &RequestContext) -> Result<AnalysisReport> {
        let ticker = self.collector.resolve_input(input).await?;
        self.run_for_ticker(ticker, ctx).await
    }

    /// Produce a full report for an already resolved ticker
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), ticker = %ticker))]
    pub async fn run_for_ticker(&self, ticker: Ticker, ctx: &RequestContext) -> Result<AnalysisReport> {
        let snapshot = self.collector.collect(&ticker).await?;

        let (fundamental, valuation, risk) = tokio::join!(
            self.branch(self.fundamental.as_ref(), &ticker, &snapshot),
            self.branch(self.valuation.as_ref(), &ticker, &snapshot),
            self.branch(self.risk.as_ref(), &ticker, &snapshot),
        );

        let report = combine(ticker, snapshot, fundamental, valuation, risk)?;
        info!(
            unavailable = report.unavailable().len(),
            elapsed_ms = ctx.elapsed().as_millis() as u64,
            "analysis report ready"
        );
        Ok(report)
    }

    /// Run one analyzer under the branch time budget
    async fn branch(
        &self,
        analyzer: &dyn Analyzer,
        ticker: &Ticker,
        snapshot: &StockSnapshot,
    ) -> BranchOutcome {
        let kind = analyzer.kind();
        match tokio::time::timeout(self.analyzer_timeout, analyzer.analyze(ticker, snapshot)).await {
            Ok(Ok(finding)) => Ok(finding),
            Ok(Err(e)) => {
                warn!(%kind, error = %e, "analyzer failed");
                Err(e.to_string())
            }
            Err(_) => {
                warn!(%kind, "analyzer timed out");
                Err(format!("timed out after {:?}", self.analyzer_timeout))
            }
        }
    }
}
