//! Bollinger Bands indicator.

use super::math::{last_defined, rolling_mean, rolling_std};
use crate::services::signals::{Computation, Indicator};
use crate::types::{BollingerResult, IndicatorKind, IndicatorResult, Series, Signal};

/// Bollinger Bands.
///
/// Middle band is the SMA; upper/lower bands sit `std_dev` sample standard
/// deviations away from it.
pub struct BollingerBands {
    period: usize,
    std_dev: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev: f64) -> Self {
        Self { period, std_dev }
    }
}

/// Price position within the bands: 0 at the lower band, 100 at the upper.
/// Collapsed bands read 50.
pub(crate) fn price_position(price: f64, lower: f64, upper: f64) -> f64 {
    let width = upper - lower;
    if width == 0.0 {
        return 50.0;
    }
    (price - lower) / width * 100.0
}

fn classify(price: f64, upper: f64, middle: f64, lower: f64) -> (Signal, &'static str) {
    if price > upper {
        (
            Signal::Overbought,
            "Price above upper band - potential reversal down",
        )
    } else if price < lower {
        (
            Signal::Oversold,
            "Price below lower band - potential reversal up",
        )
    } else if price > middle {
        (Signal::Bullish, "Price above middle band - upward trend")
    } else if price < middle {
        (Signal::Bearish, "Price below middle band - downward trend")
    } else {
        (Signal::Neutral, "Price at middle band")
    }
}

impl Indicator for BollingerBands {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Bollinger
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }

    fn min_periods(&self) -> usize {
        self.period.max(2)
    }

    fn compute(&self, series: &Series) -> Computation {
        let prices = series.prices();
        let middle_col = rolling_mean(&prices, self.period);
        let std_col = rolling_std(&prices, self.period);

        let upper_col: Vec<Option<f64>> = middle_col
            .iter()
            .zip(&std_col)
            .map(|(m, s)| m.zip(*s).map(|(m, s)| m + self.std_dev * s))
            .collect();
        let lower_col: Vec<Option<f64>> = middle_col
            .iter()
            .zip(&std_col)
            .map(|(m, s)| m.zip(*s).map(|(m, s)| m - self.std_dev * s))
            .collect();

        let (Some(upper), Some(middle), Some(lower)) = (
            last_defined(&upper_col),
            last_defined(&middle_col),
            last_defined(&lower_col),
        ) else {
            return Computation::unavailable(self.kind(), "Insufficient data for Bollinger Bands");
        };

        let current_price = series.last_price();
        let band_width = if middle != 0.0 {
            (upper - lower) / middle * 100.0
        } else {
            0.0
        };
        let (signal, recommendation) = classify(current_price, upper, middle, lower);

        Computation::new(IndicatorResult::Bollinger(BollingerResult {
            upper,
            middle,
            lower,
            current_price,
            band_width,
            price_position: price_position(current_price, lower, upper),
            signal,
            recommendation: recommendation.to_string(),
            high_volatility: band_width > 10.0,
        }))
        .with_column("bb_middle", middle_col)
        .with_column("bb_upper", upper_col)
        .with_column("bb_lower", lower_col)
    }
}
