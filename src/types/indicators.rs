use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Categorical reading shared by every indicator and pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
    Overbought,
    Oversold,
    StrongBullish,
    StrongBearish,
    BullishCrossover,
    BearishCrossover,
    BullishCross,
    BearishCross,
    Caution,
    Watch,
    Mixed,
    #[serde(rename = "NONE")]
    NoSignal,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
            Self::Neutral => "NEUTRAL",
            Self::Overbought => "OVERBOUGHT",
            Self::Oversold => "OVERSOLD",
            Self::StrongBullish => "STRONG_BULLISH",
            Self::StrongBearish => "STRONG_BEARISH",
            Self::BullishCrossover => "BULLISH_CROSSOVER",
            Self::BearishCrossover => "BEARISH_CROSSOVER",
            Self::BullishCross => "BULLISH_CROSS",
            Self::BearishCross => "BEARISH_CROSS",
            Self::Caution => "CAUTION",
            Self::Watch => "WATCH",
            Self::Mixed => "MIXED",
            Self::NoSignal => "NONE",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every indicator family the engine produces, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
    SupportResistance,
    VolumeAnalysis,
    Stochastic,
    Adx,
    Atr,
    Obv,
    PricePatterns,
    ChartPatterns,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 13] = [
        Self::Sma,
        Self::Ema,
        Self::Rsi,
        Self::Macd,
        Self::Bollinger,
        Self::SupportResistance,
        Self::VolumeAnalysis,
        Self::Stochastic,
        Self::Adx,
        Self::Atr,
        Self::Obv,
        Self::PricePatterns,
        Self::ChartPatterns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Bollinger => "bollinger",
            Self::SupportResistance => "support_resistance",
            Self::VolumeAnalysis => "volume_analysis",
            Self::Stochastic => "stochastic",
            Self::Adx => "adx",
            Self::Atr => "atr",
            Self::Obv => "obv",
            Self::PricePatterns => "price_patterns",
            Self::ChartPatterns => "chart_patterns",
        }
    }
}

// ---------------------------------------------------------------------------
// Moving averages
// ---------------------------------------------------------------------------

/// One moving average reading (SMA or EMA).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverage {
    pub period: usize,
    pub value: f64,
    pub current_price: f64,
    pub signal: Signal,
}

/// SMA-50 vs SMA-200 comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageCross {
    pub golden_cross: bool,
    pub death_cross: bool,
    pub cross_signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmaResult {
    pub averages: Vec<MovingAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross: Option<MovingAverageCross>,
}

impl SmaResult {
    pub fn average(&self, period: usize) -> Option<&MovingAverage> {
        self.averages.iter().find(|a| a.period == period)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmaResult {
    pub averages: Vec<MovingAverage>,
}

impl EmaResult {
    pub fn average(&self, period: usize) -> Option<&MovingAverage> {
        self.averages.iter().find(|a| a.period == period)
    }
}

// ---------------------------------------------------------------------------
// Momentum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiResult {
    pub value: f64,
    pub signal: Signal,
    pub recommendation: String,
    pub overbought: bool,
    pub oversold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal_line: f64,
    pub histogram: f64,
    pub trade_signal: Signal,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StochasticResult {
    pub k: f64,
    pub d: f64,
    pub signal: Signal,
    pub trade_signal: Signal,
    pub recommendation: String,
    pub overbought: bool,
    pub oversold: bool,
}

// ---------------------------------------------------------------------------
// Volatility and levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub current_price: f64,
    pub band_width: f64,
    pub price_position: f64,
    pub signal: Signal,
    pub recommendation: String,
    pub high_volatility: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportResistanceResult {
    pub current_price: f64,
    pub nearest_support: f64,
    pub nearest_resistance: f64,
    pub distance_to_support_pct: f64,
    pub distance_to_resistance_pct: f64,
    /// Up to five distinct levels, highest first.
    pub support_levels: Vec<f64>,
    /// Up to five distinct levels, lowest first.
    pub resistance_levels: Vec<f64>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdxResult {
    pub value: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub strength: TrendStrength,
    pub recommendation: String,
    pub trending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityLevel {
    VeryHigh,
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtrResult {
    pub value: f64,
    pub atr_pct: f64,
    pub volatility: VolatilityLevel,
    pub recommendation: String,
    pub suggested_stop_distance: f64,
    pub suggested_stop_pct: f64,
}

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObvTrend {
    Rising,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObvDivergence {
    /// Price falling while OBV rises.
    Positive,
    /// Price rising while OBV falls.
    Negative,
    #[serde(rename = "NONE")]
    NoDivergence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObvResult {
    pub value: f64,
    pub sma: f64,
    pub trend: ObvTrend,
    pub signal: Signal,
    pub recommendation: String,
    pub divergence: ObvDivergence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence_warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeLevel {
    ExtremeVolume,
    VeryHighVolume,
    HighVolume,
    LowVolume,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeDivergence {
    NegativeDivergence,
    PositiveConfirmation,
    WeakMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpikeMagnitude {
    Extreme,
    Significant,
    #[serde(rename = "NONE")]
    NoSpike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeAssessment {
    StrongConfirmation,
    ModerateConfirmation,
    WeakConfirmation,
    NoConfirmation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysisResult {
    pub current_volume: f64,
    pub avg_volume_20: f64,
    pub avg_volume_50: f64,
    pub volume_ratio: f64,
    pub level: VolumeLevel,
    pub recommendation: String,
    pub trend_direction: VolumeTrend,
    pub trend_change_pct: f64,
    pub divergence_signal: VolumeDivergence,
    /// BULLISH, BEARISH or NEUTRAL.
    pub divergence_type: Signal,
    pub divergence_recommendation: String,
    pub spike_detected: bool,
    pub spike_magnitude: SpikeMagnitude,
    pub confirmation_score: u8,
    pub overall_assessment: VolumeAssessment,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    BullishReversal,
    BearishReversal,
    StrongUptrend,
    StrongDowntrend,
    ExhaustionWarning,
    OversoldBounce,
    Indecision,
    DoubleTop,
    DoubleBottom,
    Consolidation,
    UpsideBreakout,
    DownsideBreakdown,
    RisingChannel,
    FallingChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub name: PatternKind,
    pub description: String,
    pub signal: Signal,
    pub strength: PatternStrength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternResult {
    pub patterns_detected: Vec<Pattern>,
    pub pattern_count: usize,
    pub overall_signal: Signal,
}

impl PatternResult {
    pub fn contains(&self, kind: PatternKind) -> bool {
        self.patterns_detected.iter().any(|p| p.name == kind)
    }
}

// ---------------------------------------------------------------------------
// Result union
// ---------------------------------------------------------------------------

/// One indicator's output, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorResult {
    Sma(SmaResult),
    Ema(EmaResult),
    Rsi(RsiResult),
    Macd(MacdResult),
    Bollinger(BollingerResult),
    SupportResistance(SupportResistanceResult),
    VolumeAnalysis(VolumeAnalysisResult),
    Stochastic(StochasticResult),
    Adx(AdxResult),
    Atr(AtrResult),
    Obv(ObvResult),
    PricePatterns(PatternResult),
    ChartPatterns(PatternResult),
    Unavailable {
        indicator: IndicatorKind,
        error: String,
    },
}

impl IndicatorResult {
    pub fn unavailable(indicator: IndicatorKind, error: impl Into<String>) -> Self {
        Self::Unavailable {
            indicator,
            error: error.into(),
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Sma(_) => IndicatorKind::Sma,
            Self::Ema(_) => IndicatorKind::Ema,
            Self::Rsi(_) => IndicatorKind::Rsi,
            Self::Macd(_) => IndicatorKind::Macd,
            Self::Bollinger(_) => IndicatorKind::Bollinger,
            Self::SupportResistance(_) => IndicatorKind::SupportResistance,
            Self::VolumeAnalysis(_) => IndicatorKind::VolumeAnalysis,
            Self::Stochastic(_) => IndicatorKind::Stochastic,
            Self::Adx(_) => IndicatorKind::Adx,
            Self::Atr(_) => IndicatorKind::Atr,
            Self::Obv(_) => IndicatorKind::Obv,
            Self::PricePatterns(_) => IndicatorKind::PricePatterns,
            Self::ChartPatterns(_) => IndicatorKind::ChartPatterns,
            Self::Unavailable { indicator, .. } => *indicator,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Unavailable { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Ordered `IndicatorKind -> IndicatorResult` map produced by one
/// `calculate_all` pass.
///
/// Typed accessors return `None` for both absent and unavailable entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorMap {
    entries: BTreeMap<IndicatorKind, IndicatorResult>,
}

impl IndicatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result under its own kind, replacing any previous entry.
    pub fn insert(&mut self, result: IndicatorResult) {
        self.entries.insert(result.kind(), result);
    }

    pub fn get(&self, kind: IndicatorKind) -> Option<&IndicatorResult> {
        self.entries.get(&kind)
    }

    pub fn contains(&self, kind: IndicatorKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndicatorKind, &IndicatorResult)> {
        self.entries.iter()
    }

    /// Kinds that produced a numeric result.
    pub fn available(&self) -> Vec<IndicatorKind> {
        self.entries
            .iter()
            .filter(|(_, r)| r.is_available())
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn sma(&self) -> Option<&SmaResult> {
        match self.get(IndicatorKind::Sma)? {
            IndicatorResult::Sma(r) => Some(r),
            _ => None,
        }
    }

    pub fn ema(&self) -> Option<&EmaResult> {
        match self.get(IndicatorKind::Ema)? {
            IndicatorResult::Ema(r) => Some(r),
            _ => None,
        }
    }

    pub fn rsi(&self) -> Option<&RsiResult> {
        match self.get(IndicatorKind::Rsi)? {
            IndicatorResult::Rsi(r) => Some(r),
            _ => None,
        }
    }

    pub fn macd(&self) -> Option<&MacdResult> {
        match self.get(IndicatorKind::Macd)? {
            IndicatorResult::Macd(r) => Some(r),
            _ => None,
        }
    }

    pub fn bollinger(&self) -> Option<&BollingerResult> {
        match self.get(IndicatorKind::Bollinger)? {
            IndicatorResult::Bollinger(r) => Some(r),
            _ => None,
        }
    }

    pub fn support_resistance(&self) -> Option<&SupportResistanceResult> {
        match self.get(IndicatorKind::SupportResistance)? {
            IndicatorResult::SupportResistance(r) => Some(r),
            _ => None,
        }
    }

    pub fn volume_analysis(&self) -> Option<&VolumeAnalysisResult> {
        match self.get(IndicatorKind::VolumeAnalysis)? {
            IndicatorResult::VolumeAnalysis(r) => Some(r),
            _ => None,
        }
    }

    pub fn stochastic(&self) -> Option<&StochasticResult> {
        match self.get(IndicatorKind::Stochastic)? {
            IndicatorResult::Stochastic(r) => Some(r),
            _ => None,
        }
    }

    pub fn adx(&self) -> Option<&AdxResult> {
        match self.get(IndicatorKind::Adx)? {
            IndicatorResult::Adx(r) => Some(r),
            _ => None,
        }
    }

    pub fn atr(&self) -> Option<&AtrResult> {
        match self.get(IndicatorKind::Atr)? {
            IndicatorResult::Atr(r) => Some(r),
            _ => None,
        }
    }

    pub fn obv(&self) -> Option<&ObvResult> {
        match self.get(IndicatorKind::Obv)? {
            IndicatorResult::Obv(r) => Some(r),
            _ => None,
        }
    }

    pub fn price_patterns(&self) -> Option<&PatternResult> {
        match self.get(IndicatorKind::PricePatterns)? {
            IndicatorResult::PricePatterns(r) => Some(r),
            _ => None,
        }
    }

    pub fn chart_patterns(&self) -> Option<&PatternResult> {
        match self.get(IndicatorKind::ChartPatterns)? {
            IndicatorResult::ChartPatterns(r) => Some(r),
            _ => None,
        }
    }
}

impl FromIterator<IndicatorResult> for IndicatorMap {
    fn from_iter<I: IntoIterator<Item = IndicatorResult>>(iter: I) -> Self {
        let mut map = Self::new();
        for result in iter {
            map.insert(result);
        }
        map
    }
}
