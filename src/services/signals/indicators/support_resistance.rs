//! Support and resistance levels from local extrema.

use crate::services::signals::{Computation, Indicator};
use crate::types::{IndicatorKind, IndicatorResult, Series, SupportResistanceResult};

const MAX_LEVELS: usize = 5;

/// A sample is support (resistance) when it equals the minimum (maximum) of
/// the window of `window` samples on either side of it.
pub struct SupportResistance {
    window: usize,
}

impl Default for SupportResistance {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl SupportResistance {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    fn levels(&self, prices: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut support = Vec::new();
        let mut resistance = Vec::new();
        let w = self.window;

        if prices.len() <= 2 * w {
            return (support, resistance);
        }

        for i in w..prices.len() - w {
            let neighbourhood = &prices[i - w..=i + w];
            let lo = neighbourhood.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = neighbourhood.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if prices[i] == lo {
                support.push(prices[i]);
            }
            if prices[i] == hi {
                resistance.push(prices[i]);
            }
        }
        (support, resistance)
    }
}

fn recommendation(dist_support: f64, dist_resistance: f64) -> &'static str {
    if dist_support < 2.0 {
        "Near support - potential bounce zone"
    } else if dist_resistance < 2.0 {
        "Near resistance - potential reversal zone"
    } else if dist_support < dist_resistance {
        "Closer to support than resistance"
    } else {
        "Closer to resistance than support"
    }
}

fn distinct_sorted(mut levels: Vec<f64>, descending: bool) -> Vec<f64> {
    levels.sort_by(|a, b| a.total_cmp(b));
    levels.dedup();
    if descending {
        levels.reverse();
    }
    levels.truncate(MAX_LEVELS);
    levels
}

impl Indicator for SupportResistance {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::SupportResistance
    }

    fn name(&self) -> &str {
        "Support/Resistance"
    }

    fn min_periods(&self) -> usize {
        self.window.max(1)
    }

    fn compute(&self, series: &Series) -> Computation {
        let prices = series.prices();
        let current_price = series.last_price();
        let (support, resistance) = self.levels(&prices);

        let series_min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let series_max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let nearest_support = support
            .iter()
            .copied()
            .filter(|s| *s < current_price)
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
            .unwrap_or(series_min);
        let nearest_resistance = resistance
            .iter()
            .copied()
            .filter(|r| *r > current_price)
            .fold(None, |best: Option<f64>, r| Some(best.map_or(r, |b| b.min(r))))
            .unwrap_or(series_max);

        let distance_to_support_pct = (current_price - nearest_support) / current_price * 100.0;
        let distance_to_resistance_pct =
            (nearest_resistance - current_price) / current_price * 100.0;

        Computation::new(IndicatorResult::SupportResistance(SupportResistanceResult {
            current_price,
            nearest_support,
            nearest_resistance,
            distance_to_support_pct,
            distance_to_resistance_pct,
            support_levels: distinct_sorted(support, true),
            resistance_levels: distinct_sorted(resistance, false),
            recommendation: recommendation(distance_to_support_pct, distance_to_resistance_pct)
                .to_string(),
        }))
    }
}
