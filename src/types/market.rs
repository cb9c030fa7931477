use super::indicators::Signal;
use serde::{Deserialize, Serialize};

/// A market-context result, or the reason it is not available.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Analysis<T> {
    Ready(T),
    Unavailable { error: String },
}

impl<T> Analysis<T> {
    pub fn unavailable(error: impl Into<String>) -> Self {
        Self::Unavailable {
            error: error.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    StrongUp,
    Up,
    Sideways,
    Down,
    StrongDown,
    Unknown,
}

/// Indicator verdict and simple statistics for one look-back window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeAnalysis {
    pub overall_signal: Signal,
    pub confidence: f64,
    pub bullish_count: u32,
    pub bearish_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<Signal>,
    pub trend: TrendDirection,
    pub volatility: f64,
    pub price_change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeEntry {
    pub days: u32,
    /// "7d", "30d", ...
    pub label: String,
    pub analysis: Analysis<TimeframeAnalysis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlignmentAssessment {
    PerfectBullishAlignment,
    PerfectBearishAlignment,
    BullishMajority,
    BearishMajority,
    MixedSignals,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeAlignment {
    pub score: f64,
    pub assessment: AlignmentAssessment,
    pub recommendation: String,
    pub bullish_timeframes: u32,
    pub bearish_timeframes: u32,
    pub neutral_timeframes: u32,
    pub total_timeframes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiTimeframeReport {
    pub timeframes: Vec<TimeframeEntry>,
    pub alignment: TimeframeAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    VeryWeak,
    /// The asset is Bitcoin itself.
    #[serde(rename = "SELF")]
    SelfReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub correlation: f64,
    pub strength: CorrelationStrength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<CorrelationDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_description: Option<String>,
    pub recommendation: String,
    /// Number of timestamp-aligned samples used.
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSizing {
    Increase,
    NormalToIncrease,
    Normal,
    Reduce,
    Minimize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeResult {
    pub fear_greed: Option<u8>,
    pub regime: MarketRegime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_sizing: Option<PositionSizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// Everything the market-context pass knows about one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensiveContext {
    pub asset_id: String,
    pub timeframe_analysis: MultiTimeframeReport,
    /// Omitted when the asset is Bitcoin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btc_correlation: Option<Analysis<CorrelationReport>>,
    pub market_regime: RegimeResult,
}

/// Fear & Greed index reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FearGreedData {
    pub value: u8,
    pub classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
