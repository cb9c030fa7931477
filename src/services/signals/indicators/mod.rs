//! Technical indicator implementations.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod math;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod support_resistance;
pub mod volume;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use ema::Ema;
pub use macd::Macd;
pub use obv::Obv;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;
pub use support_resistance::SupportResistance;
pub use volume::VolumeAnalysis;

use super::patterns::{ChartPatterns, PricePatterns};
use super::Indicator;
use crate::config::IndicatorSettings;

/// Get all indicators, in report order.
pub fn all_indicators(settings: &IndicatorSettings) -> Vec<Box<dyn Indicator>> {
    vec![
        // Trend
        Box::new(Sma::new(settings.sma_periods.clone())),
        Box::new(Ema::new(settings.ema_periods.clone())),
        // Momentum
        Box::new(Rsi::new(settings.rsi_period)),
        Box::new(Macd::new(
            settings.macd_fast,
            settings.macd_slow,
            settings.macd_signal,
        )),
        // Volatility and levels
        Box::new(BollingerBands::new(
            settings.bollinger_period,
            settings.bollinger_std_dev,
        )),
        Box::new(SupportResistance::new(settings.support_resistance_window)),
        // Volume
        Box::new(VolumeAnalysis::default()),
        // Advanced
        Box::new(Stochastic::new(settings.stochastic_k, settings.stochastic_d)),
        Box::new(Adx::new(settings.adx_period)),
        Box::new(Atr::new(settings.atr_period)),
        Box::new(Obv::default()),
        // Patterns
        Box::new(PricePatterns),
        Box::new(ChartPatterns),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndicatorKind;

    #[test]
    fn test_registry_covers_every_kind_once() {
        let indicators = all_indicators(&IndicatorSettings::default());
        let kinds: Vec<IndicatorKind> = indicators.iter().map(|i| i.kind()).collect();
        assert_eq!(kinds, IndicatorKind::ALL.to_vec());
    }
}
