//! On-Balance Volume (OBV) indicator.

use super::math::{last_defined, linear_slope, rolling_mean};
use crate::services::signals::{Computation, Indicator};
use crate::types::{IndicatorKind, IndicatorResult, ObvDivergence, ObvResult, ObvTrend, Series, Signal};

const SMA_PERIOD: usize = 20;
const TREND_WINDOW: usize = 10;

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume flow: adds volume on up moves, subtracts on down moves.
/// Trend is the sign of a linear fit over the last ten OBV values; a trend
/// opposite to the price trend is reported as divergence.
pub struct Obv;

impl Default for Obv {
    fn default() -> Self {
        Self
    }
}

/// Running OBV, starting at zero.
pub fn on_balance_volume(prices: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut obv = Vec::with_capacity(prices.len());
    let mut running = 0.0;
    for i in 0..prices.len() {
        if i > 0 {
            let change = prices[i] - prices[i - 1];
            let volume = volumes.get(i).copied().unwrap_or(0.0);
            if change > 0.0 {
                running += volume;
            } else if change < 0.0 {
                running -= volume;
            }
        }
        obv.push(running);
    }
    obv
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

impl Indicator for Obv {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Obv
    }

    fn name(&self) -> &str {
        "OBV"
    }

    fn min_periods(&self) -> usize {
        SMA_PERIOD
    }

    fn requires_volume(&self) -> bool {
        true
    }

    fn compute(&self, series: &Series) -> Computation {
        let Some(volumes) = series.volumes() else {
            return Computation::unavailable(self.kind(), "Volume data not available for OBV");
        };
        let prices = series.prices();

        let obv = on_balance_volume(&prices, &volumes);
        let obv_sma = rolling_mean(&obv, SMA_PERIOD);

        let (Some(&value), Some(sma)) = (obv.last(), last_defined(&obv_sma)) else {
            return Computation::unavailable(self.kind(), "Insufficient data for OBV");
        };

        let trend = if linear_slope(tail(&obv, TREND_WINDOW)) > 0.0 {
            ObvTrend::Rising
        } else {
            ObvTrend::Falling
        };

        let (signal, recommendation) = if value > sma && trend == ObvTrend::Rising {
            (
                Signal::Bullish,
                "OBV rising - accumulation, buying pressure increasing",
            )
        } else if value < sma && trend == ObvTrend::Falling {
            (
                Signal::Bearish,
                "OBV falling - distribution, selling pressure increasing",
            )
        } else {
            (Signal::Neutral, "OBV trend unclear")
        };

        let price_rising = linear_slope(tail(&prices, TREND_WINDOW)) > 0.0;
        let (divergence, divergence_warning) = match (price_rising, trend) {
            (true, ObvTrend::Falling) => (
                ObvDivergence::Negative,
                Some("Price rising but OBV falling - weak rally"),
            ),
            (false, ObvTrend::Rising) => (
                ObvDivergence::Positive,
                Some("Price falling but OBV rising - potential reversal"),
            ),
            _ => (ObvDivergence::NoDivergence, None),
        };

        Computation::new(IndicatorResult::Obv(ObvResult {
            value,
            sma,
            trend,
            signal,
            recommendation: recommendation.to_string(),
            divergence,
            divergence_warning: divergence_warning.map(str::to_string),
        }))
        .with_column("obv", obv.into_iter().map(Some).collect())
        .with_column("obv_sma", obv_sma)
    }
}
