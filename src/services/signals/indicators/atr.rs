//! Average True Range (ATR) indicator.

use super::math::{diff, last_defined, rolling_mean_opt};
use crate::services::signals::{Computation, Indicator};
use crate::types::{AtrResult, IndicatorKind, IndicatorResult, Series, VolatilityLevel};

/// ATR (Average True Range) indicator.
///
/// Rolling mean of the absolute price-to-price change, reported in price
/// units and as a percentage of the current price. Suggested stop distance
/// is twice the ATR.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn classify(atr_pct: f64) -> (VolatilityLevel, &'static str) {
        if atr_pct > 5.0 {
            (
                VolatilityLevel::VeryHigh,
                "Very high volatility - use wider stops, smaller positions",
            )
        } else if atr_pct > 3.0 {
            (
                VolatilityLevel::High,
                "High volatility - expect larger price swings",
            )
        } else if atr_pct > 1.5 {
            (
                VolatilityLevel::Moderate,
                "Moderate volatility - normal market conditions",
            )
        } else {
            (
                VolatilityLevel::Low,
                "Low volatility - tight range, potential breakout coming",
            )
        }
    }
}

impl Indicator for Atr {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Atr
    }

    fn name(&self) -> &str {
        "ATR"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, series: &Series) -> Computation {
        let tr: Vec<Option<f64>> = diff(&series.prices())
            .into_iter()
            .map(|d| d.map(f64::abs))
            .collect();
        let atr = rolling_mean_opt(&tr, self.period);

        let Some(value) = last_defined(&atr) else {
            return Computation::unavailable(self.kind(), "Insufficient data for ATR");
        };

        let current_price = series.last_price();
        let atr_pct = value / current_price * 100.0;
        let (volatility, recommendation) = Self::classify(atr_pct);
        let suggested_stop_distance = value * 2.0;

        Computation::new(IndicatorResult::Atr(AtrResult {
            value,
            atr_pct,
            volatility,
            recommendation: recommendation.to_string(),
            suggested_stop_distance,
            suggested_stop_pct: suggested_stop_distance / current_price * 100.0,
        }))
        .with_column("atr", atr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::evaluate;
    use chrono::{TimeZone, Utc};

    fn atr_result(prices: &[f64]) -> IndicatorResult {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = Series::daily(start, prices, None).unwrap();
        evaluate(&Atr::default(), &series).result
    }

    #[test]
    fn test_constant_step() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 1.5).collect();
        let IndicatorResult::Atr(result) = atr_result(&prices) else {
            panic!("expected ATR result");
        };
        assert!((result.value - 1.5).abs() < 1e-9);
        assert!((result.suggested_stop_distance - 3.0).abs() < 1e-9);
        let last = prices[29];
        assert!((result.atr_pct - 1.5 / last * 100.0).abs() < 1e-9);
        assert_eq!(result.volatility, VolatilityLevel::Low);
    }

    #[test]
    fn test_volatile_series() {
        let prices: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 110.0 })
            .collect();
        let IndicatorResult::Atr(result) = atr_result(&prices) else {
            panic!("expected ATR result");
        };
        assert!((result.value - 10.0).abs() < 1e-9);
        assert_eq!(result.volatility, VolatilityLevel::VeryHigh);
    }

    #[test]
    fn test_insufficient_data() {
        let prices: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert!(!atr_result(&prices).is_available());
    }
}
