//! Stochastic Oscillator indicator.

use super::math::{last_defined, rolling_max, rolling_mean_opt, rolling_min};
use crate::services::signals::{Computation, Indicator};
use crate::types::{IndicatorKind, IndicatorResult, Series, Signal, StochasticResult};

/// Stochastic Oscillator.
///
/// Where the price sits within its range over `k_period` samples:
/// %K = (price - lowest) / (highest - lowest) * 100, %D = SMA(%K, d_period).
/// Only a price series is available, so the range comes from prices too.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }

    fn classify(k: f64, d: f64) -> (Signal, Signal, &'static str) {
        if k > 80.0 {
            (
                Signal::Overbought,
                Signal::Bearish,
                "Overbought - price may be due for pullback",
            )
        } else if k < 20.0 {
            (
                Signal::Oversold,
                Signal::Bullish,
                "Oversold - price may be due for bounce",
            )
        } else if k > d && k < 50.0 {
            (
                Signal::BullishCross,
                Signal::Bullish,
                "%K above %D in the lower half - bullish signal",
            )
        } else if k < d && k > 50.0 {
            (
                Signal::BearishCross,
                Signal::Bearish,
                "%K below %D in the upper half - bearish signal",
            )
        } else {
            (Signal::Neutral, Signal::Neutral, "No strong signal")
        }
    }
}

impl Indicator for Stochastic {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Stochastic
    }

    fn name(&self) -> &str {
        "Stochastic"
    }

    fn min_periods(&self) -> usize {
        (self.k_period + self.d_period).max(1)
    }

    fn compute(&self, series: &Series) -> Computation {
        let prices = series.prices();
        let lows = rolling_min(&prices, self.k_period);
        let highs = rolling_max(&prices, self.k_period);

        let k_col: Vec<Option<f64>> = prices
            .iter()
            .zip(lows.iter().zip(&highs))
            .map(|(p, (lo, hi))| {
                lo.zip(*hi).map(|(lo, hi)| {
                    let range = hi - lo;
                    if range == 0.0 {
                        50.0
                    } else {
                        100.0 * (p - lo) / range
                    }
                })
            })
            .collect();
        let d_col = rolling_mean_opt(&k_col, self.d_period);

        let (Some(k), Some(d)) = (last_defined(&k_col), last_defined(&d_col)) else {
            return Computation::unavailable(self.kind(), "Insufficient data for Stochastic");
        };

        let (signal, trade_signal, recommendation) = Self::classify(k, d);

        Computation::new(IndicatorResult::Stochastic(StochasticResult {
            k,
            d,
            signal,
            trade_signal,
            recommendation: recommendation.to_string(),
            overbought: k > 80.0,
            oversold: k < 20.0,
        }))
        .with_column("stoch_k", k_col)
        .with_column("stoch_d", d_col)
    }
}
