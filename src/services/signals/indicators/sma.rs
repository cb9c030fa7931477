//! Simple Moving Average (SMA) indicator with golden/death cross detection.

use super::math::{last_defined, rolling_mean};
use crate::services::signals::{Computation, Indicator};
use crate::types::{
    IndicatorKind, IndicatorResult, MovingAverage, MovingAverageCross, Series, Signal, SmaResult,
};

const CROSS_FAST: usize = 50;
const CROSS_SLOW: usize = 200;

/// Simple moving averages over several periods.
///
/// Reports every period the series can fill. When both the 50 and 200
/// averages are configured and the series is long enough, it also compares
/// them at the last two samples:
/// - crossing from <= to >: golden cross (STRONG_BULLISH)
/// - crossing from >= to <: death cross (STRONG_BEARISH)
pub struct Sma {
    periods: Vec<usize>,
}

impl Default for Sma {
    fn default() -> Self {
        Self {
            periods: vec![20, 50, 200],
        }
    }
}

impl Sma {
    pub fn new(periods: Vec<usize>) -> Self {
        Self { periods }
    }

    fn cross(fast: &[Option<f64>], slow: &[Option<f64>]) -> Option<MovingAverageCross> {
        let n = fast.len();
        let current_fast = last_defined(fast)?;
        let current_slow = last_defined(slow)?;

        let previous = if n > 1 {
            fast[n - 2].zip(slow[n - 2])
        } else {
            None
        };

        if let Some((prev_fast, prev_slow)) = previous {
            if prev_fast <= prev_slow && current_fast > current_slow {
                return Some(MovingAverageCross {
                    golden_cross: true,
                    death_cross: false,
                    cross_signal: Signal::StrongBullish,
                });
            }
            if prev_fast >= prev_slow && current_fast < current_slow {
                return Some(MovingAverageCross {
                    golden_cross: false,
                    death_cross: true,
                    cross_signal: Signal::StrongBearish,
                });
            }
        }

        Some(MovingAverageCross {
            golden_cross: false,
            death_cross: false,
            cross_signal: if current_fast > current_slow {
                Signal::Bullish
            } else {
                Signal::Bearish
            },
        })
    }
}

impl Indicator for Sma {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Sma
    }

    fn name(&self) -> &str {
        "SMA"
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
            let column = rolling_mean(&prices, period);
            if let Some(value) = last_defined(&column) {
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
                columns.push((period, column));
            }
        }

        let column_for = |p: usize| columns.iter().find(|(period, _)| *period == p);
        let cross = match (column_for(CROSS_FAST), column_for(CROSS_SLOW)) {
            (Some((_, fast)), Some((_, slow))) => Self::cross(fast, slow),
            _ => None,
        };

        let mut computation = Computation::new(IndicatorResult::Sma(SmaResult { averages, cross }));
        for (period, column) in columns {
            computation = computation.with_column(format!("sma_{}", period), column);
        }
        computation
    }
}
