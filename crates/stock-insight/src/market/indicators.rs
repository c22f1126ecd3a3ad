//! Technical indicators over daily price history

use super::{PriceBar, TechnicalSummary};
use ta::Next;
use ta::indicators::{SimpleMovingAverage, StandardDeviation};
use tracing::debug;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summarise a price history (oldest bar first)
///
/// Indicators that need more bars than are available are left as `None`.
pub fn compute_technicals(history: &[PriceBar]) -> TechnicalSummary {
    let closes: Vec<f64> = history
        .iter()
        .map(|bar| bar.close)
        .filter(|c| c.is_finite() && *c > 0.0)
        .collect();

    TechnicalSummary {
        sma_50: sma(&closes, 50),
        sma_200: sma(&closes, 200),
        annualized_volatility: annualized_volatility(&closes),
        max_drawdown: max_drawdown(&closes),
        period_return: period_return(&closes),
        observations: closes.len(),
    }
}

fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }
    let mut indicator = match SimpleMovingAverage::new(period) {
        Ok(indicator) => indicator,
        Err(e) => {
            debug!(period, error = ?e, "SMA rejected period");
            return None;
        }
    };
    closes.iter().fold(None, |_, close| Some(indicator.next(*close)))
}

fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    if returns.len() < 2 {
        return None;
    }
    let mut indicator = StandardDeviation::new(returns.len()).ok()?;
    let daily = returns.iter().fold(0.0, |_, r| indicator.next(*r));
    Some(daily * TRADING_DAYS_PER_YEAR.sqrt())
}

fn max_drawdown(closes: &[f64]) -> Option<f64> {
    let first = *closes.first()?;
    let (_, worst) = closes.iter().fold((first, 0.0_f64), |(peak, worst), close| {
        let peak = peak.max(*close);
        (peak, worst.max((peak - close) / peak))
    });
    Some(worst)
}

fn period_return(closes: &[f64]) -> Option<f64> {
    match (closes.first(), closes.last()) {
        (Some(first), Some(last)) if closes.len() >= 2 => Some(last / first - 1.0),
        _ => None,
    }
}
