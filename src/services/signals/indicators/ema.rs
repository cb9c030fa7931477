//! Exponential Moving Average (EMA) indicator.

use super::math::ewm;
use crate::services::signals::{Computation, Indicator};
use crate::types::{EmaResult, IndicatorKind, IndicatorResult, MovingAverage, Series, Signal};

/// Exponential moving averages over several periods.
///
/// Smoothing factor 2/(period+1), seeded with the first price. A period is
/// reported once the series is at least that long.
pub struct Ema {
    periods: Vec<usize>,
}

impl Default for Ema {
    fn default() -> Self {
        Self {
            periods: vec![12, 26, 50],
        }
    }
}

impl Ema {
    pub fn new(periods: Vec<usize>) -> Self {
        Self { periods }
    }
}

impl Indicator for Ema {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ema
    }

    fn name(&self) -> &str {
        "EMA"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, series: &Series) -> Computation {
        let prices = series.prices();
        let current_price = series.last_price();

        let mut averages = Vec::new();
        let mut columns = Vec::new();

        for &period in &self.periods {
            if period == 0 || prices.len() < period {
                continue;
            }
            let line = ewm(&prices, period);
            let Some(&value) = line.last() else {
                continue;
            };
            averages.push(MovingAverage {
                period,
                value,
                current_price,
                signal: if current_price > value {
                    Signal::Bullish
                } else {
                    Signal::Bearish
                },
            });
            columns.push((
                format!("ema_{}", period),
                line.into_iter().map(Some).collect::<Vec<_>>(),
            ));
        }

        let mut computation = Computation::new(IndicatorResult::Ema(EmaResult { averages }));
        for (name, column) in columns {
            computation = computation.with_column(name, column);
        }
        computation
    }
}
