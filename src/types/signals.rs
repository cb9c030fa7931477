use super::indicators::{IndicatorMap, Signal};
use serde::{Deserialize, Serialize};

/// Point tallies per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub bullish: u32,
    pub bearish: u32,
    pub neutral: u32,
}

impl Breakdown {
    pub fn total(&self) -> u32 {
        self.bullish + self.bearish + self.neutral
    }
}

/// Fused verdict over one indicator map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSignal {
    /// BULLISH, BEARISH or NEUTRAL.
    pub overall: Signal,
    /// 0-100, one decimal.
    pub confidence: f64,
    pub breakdown: Breakdown,
    pub bullish_pct: f64,
    pub bearish_pct: f64,
}

impl AggregateSignal {
    pub fn neutral() -> Self {
        Self {
            overall: Signal::Neutral,
            confidence: 0.0,
            breakdown: Breakdown::default(),
            bullish_pct: 0.0,
            bearish_pct: 0.0,
        }
    }
}

impl Default for AggregateSignal {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Indicator battery plus its fused verdict for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalAnalysis {
    pub indicators: IndicatorMap,
    pub signals: AggregateSignal,
}
