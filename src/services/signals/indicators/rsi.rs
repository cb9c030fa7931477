//! Relative Strength Index (RSI) indicator.

use super::math::{diff, last_defined, rolling_mean_opt};
use crate::services::signals::{Computation, Indicator};
use crate::types::{IndicatorKind, IndicatorResult, RsiResult, Series, Signal};

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the average gain to the average loss over
/// the last `period` price changes. Values range from 0-100:
/// - Above 70: Overbought
/// - Below 30: Oversold
/// - Above 60 / below 40: Bullish / bearish momentum
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI from average gain and loss. A window with no losses reads 100,
    /// a window with no movement at all reads 50.
    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return if avg_gain > 0.0 { 100.0 } else { 50.0 };
        }
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }

    fn classify(rsi: f64) -> (Signal, &'static str) {
        if rsi > 70.0 {
            (Signal::Overbought, "Consider selling or taking profits")
        } else if rsi < 30.0 {
            (Signal::Oversold, "Potential buying opportunity")
        } else if rsi > 60.0 {
            (Signal::Bullish, "Upward momentum")
        } else if rsi < 40.0 {
            (Signal::Bearish, "Downward momentum")
        } else {
            (Signal::Neutral, "No strong signal")
        }
    }
}

impl Indicator for Rsi {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi
    }

    fn name(&self) -> &str {
        "RSI"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, series: &Series) -> Computation {
        let deltas = diff(&series.prices());
        let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
        let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

        let avg_gains = rolling_mean_opt(&gains, self.period);
        let avg_losses = rolling_mean_opt(&losses, self.period);

        let column: Vec<Option<f64>> = avg_gains
            .iter()
            .zip(&avg_losses)
            .map(|(g, l)| g.zip(*l).map(|(g, l)| Self::from_averages(g, l)))
            .collect();

        let Some(value) = last_defined(&column) else {
            return Computation::unavailable(self.kind(), "Insufficient data for RSI calculation");
        };

        let (signal, recommendation) = Self::classify(value);

        Computation::new(IndicatorResult::Rsi(RsiResult {
            value,
            signal,
            recommendation: recommendation.to_string(),
            overbought: value > 70.0,
            oversold: value < 30.0,
        }))
        .with_column("rsi", column)
    }
}
