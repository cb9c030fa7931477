//! Average Directional Index (ADX) indicator.

use super::math::{diff, last_defined, rolling_mean, rolling_mean_opt};
use crate::services::signals::{Computation, Indicator};
use crate::types::{AdxResult, IndicatorKind, IndicatorResult, Series, TrendStrength};

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength, not direction. Without high/low data the true
/// range is approximated by the absolute price-to-price change:
/// - TR = |p[i] - p[i-1]|
/// - +DM = up-move when it beats the down-move, -DM the reverse
/// - +DI/-DI = 100 * mean(DM) / mean(TR) over `period`
/// - ADX = mean(DX) over `period`
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn classify(adx: f64) -> (TrendStrength, &'static str) {
        if adx > 50.0 {
            (
                TrendStrength::VeryStrong,
                "Very strong trend - high conviction trades",
            )
        } else if adx > 25.0 {
            (
                TrendStrength::Strong,
                "Strong trend - good for trend-following",
            )
        } else if adx > 20.0 {
            (
                TrendStrength::Moderate,
                "Moderate trend - some directionality",
            )
        } else {
            (
                TrendStrength::Weak,
                "Weak trend - choppy/ranging market, avoid trend trades",
            )
        }
    }
}

impl Indicator for Adx {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Adx
    }

    fn name(&self) -> &str {
        "ADX"
    }

    fn min_periods(&self) -> usize {
        (self.period * 2).max(2)
    }

    fn compute(&self, series: &Series) -> Computation {
        let moves = diff(&series.prices());

        let tr: Vec<Option<f64>> = moves.iter().map(|m| m.map(f64::abs)).collect();
        let plus_dm: Vec<f64> = moves.iter().map(|m| m.unwrap_or(0.0).max(0.0)).collect();
        let minus_dm: Vec<f64> = moves.iter().map(|m| (-m.unwrap_or(0.0)).max(0.0)).collect();

        let tr_smooth = rolling_mean_opt(&tr, self.period);
        let plus_dm_smooth = rolling_mean(&plus_dm, self.period);
        let minus_dm_smooth = rolling_mean(&minus_dm, self.period);

        let directional = |dm: &[Option<f64>]| -> Vec<Option<f64>> {
            dm.iter()
                .zip(&tr_smooth)
                .map(|(dm, tr)| {
                    dm.zip(*tr)
                        .map(|(dm, tr)| if tr == 0.0 { 0.0 } else { 100.0 * dm / tr })
                })
                .collect()
        };
        let plus_di = directional(&plus_dm_smooth);
        let minus_di = directional(&minus_dm_smooth);

        let dx: Vec<Option<f64>> = plus_di
            .iter()
            .zip(&minus_di)
            .map(|(p, m)| {
                p.zip(*m).map(|(p, m)| {
                    let sum = p + m;
                    if sum == 0.0 {
                        0.0
                    } else {
                        100.0 * (p - m).abs() / sum
                    }
                })
            })
            .collect();
        let adx = rolling_mean_opt(&dx, self.period);

        let (Some(value), Some(plus), Some(minus)) = (
            last_defined(&adx),
            last_defined(&plus_di),
            last_defined(&minus_di),
        ) else {
            return Computation::unavailable(self.kind(), "Insufficient data for ADX");
        };

        let (strength, recommendation) = Self::classify(value);

        Computation::new(IndicatorResult::Adx(AdxResult {
            value,
            plus_di: plus,
            minus_di: minus,
            strength,
            recommendation: recommendation.to_string(),
            trending: value > 25.0,
        }))
        .with_column("plus_di", plus_di)
        .with_column("minus_di", minus_di)
        .with_column("dx", dx)
        .with_column("adx", adx)
    }
}
