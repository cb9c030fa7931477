//! Moving Average Convergence Divergence (MACD) indicator.

use super::math::ewm;
use crate::services::signals::{Computation, Indicator};
use crate::types::{IndicatorKind, IndicatorResult, MacdResult, Series, Signal};

/// MACD indicator.
///
/// MACD line = EMA(fast) - EMA(slow), signal line = EMA(MACD, signal),
/// histogram = MACD - signal. A crossover between the last two samples
/// outranks the plain trend reading.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    fn classify(
        macd: f64,
        signal: f64,
        histogram: f64,
        prev_macd: f64,
        prev_signal: f64,
    ) -> (Signal, &'static str) {
        if prev_macd <= prev_signal && macd > signal {
            (
                Signal::BullishCrossover,
                "Buy signal - MACD crossed above signal line",
            )
        } else if prev_macd >= prev_signal && macd < signal {
            (
                Signal::BearishCrossover,
                "Sell signal - MACD crossed below signal line",
            )
        } else if macd > signal && histogram > 0.0 {
            (Signal::Bullish, "Upward momentum - MACD above signal line")
        } else if macd < signal && histogram < 0.0 {
            (Signal::Bearish, "Downward momentum - MACD below signal line")
        } else {
            (Signal::Neutral, "No clear trend")
        }
    }
}

impl Indicator for Macd {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Macd
    }

    fn name(&self) -> &str {
        "MACD"
    }

    fn min_periods(&self) -> usize {
        self.slow_period.max(1)
    }

    fn compute(&self, series: &Series) -> Computation {
        let prices = series.prices();
        let fast = ewm(&prices, self.fast_period);
        let slow = ewm(&prices, self.slow_period);

        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = ewm(&macd_line, self.signal_period);
        let histogram: Vec<f64> = macd_line
            .iter()
            .zip(&signal_line)
            .map(|(m, s)| m - s)
            .collect();

        let n = macd_line.len();
        let (Some(&macd), Some(&signal), Some(&hist)) =
            (macd_line.last(), signal_line.last(), histogram.last())
        else {
            return Computation::unavailable(self.kind(), "Insufficient data for MACD calculation");
        };
        let (prev_macd, prev_signal) = if n > 1 {
            (macd_line[n - 2], signal_line[n - 2])
        } else {
            (macd, signal)
        };

        let (trade_signal, recommendation) =
            Self::classify(macd, signal, hist, prev_macd, prev_signal);

        let to_column = |v: Vec<f64>| v.into_iter().map(Some).collect::<Vec<_>>();

        Computation::new(IndicatorResult::Macd(MacdResult {
            macd,
            signal_line: signal,
            histogram: hist,
            trade_signal,
            recommendation: recommendation.to_string(),
        }))
        .with_column("macd", to_column(macd_line))
        .with_column("macd_signal", to_column(signal_line))
        .with_column("macd_histogram", to_column(histogram))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::evaluate;
    use chrono::{TimeZone, Utc};

    fn macd_result(prices: &[f64]) -> IndicatorResult {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = Series::daily(start, prices, None).unwrap();
        evaluate(&Macd::default(), &series).result
    }

    #[test]
    fn test_macd_insufficient_data() {
        let prices: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        assert!(!macd_result(&prices).is_available());
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 1.5).collect();
        let IndicatorResult::Macd(result) = macd_result(&prices) else {
            panic!("expected MACD result");
        };
        assert!(result.macd > 0.0);
        assert!((result.histogram - (result.macd - result.signal_line)).abs() < 1e-12);
        assert!(matches!(
            result.trade_signal,
            Signal::Bullish | Signal::BullishCrossover
        ));
    }

    #[test]
    fn test_macd_downtrend_negative() {
        let prices: Vec<f64> = (0..60).map(|i| 200.0 - i as f64 * 1.5).collect();
        let IndicatorResult::Macd(result) = macd_result(&prices) else {
            panic!("expected MACD result");
        };
        assert!(result.macd < 0.0);
        assert!(matches!(
            result.trade_signal,
            Signal::Bearish | Signal::BearishCrossover
        ));
    }

    #[test]
    fn test_macd_flat_is_neutral() {
        let IndicatorResult::Macd(result) = macd_result(&[100.0; 40]) else {
            panic!("expected MACD result");
        };
        assert_eq!(result.macd, 0.0);
        assert_eq!(result.trade_signal, Signal::Neutral);
    }

    #[test]
    fn test_crossover_classification() {
        let (signal, _) = Macd::classify(1.0, 0.5, 0.5, 0.2, 0.4);
        assert_eq!(signal, Signal::BullishCrossover);
        let (signal, _) = Macd::classify(0.2, 0.5, -0.3, 0.6, 0.4);
        assert_eq!(signal, Signal::BearishCrossover);
        let (signal, _) = Macd::classify(1.0, 0.5, 0.5, 0.9, 0.4);
        assert_eq!(signal, Signal::Bullish);
    }
}
