//! Market context: multi-timeframe alignment, Bitcoin correlation and the
//! fear & greed regime.
//!
//! Works against any [`PriceHistory`]; the binary prefetches into a
//! [`MemoryPriceHistory`](crate::sources::MemoryPriceHistory) so everything
//! here stays synchronous.

use crate::services::signals::indicators::math::{
    linear_slope, pct_changes, pearson, round_to, std_sample,
};
use crate::services::signals::IndicatorEngine;
use crate::sources::PriceHistory;
use crate::types::{
    AlignmentAssessment, Analysis, ComprehensiveContext, CorrelationDirection, CorrelationReport,
    CorrelationStrength, MarketRegime, MultiTimeframeReport, PositionSizing, RegimeResult, Series,
    Signal, TimeframeAlignment, TimeframeAnalysis, TimeframeEntry, TrendDirection,
};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_TIMEFRAMES: [u32; 3] = [7, 30, 90];
pub const BITCOIN_ID: &str = "bitcoin";

const TREND_WINDOW: usize = 10;
const MIN_VOLATILITY_POINTS: usize = 5;
const MIN_CORRELATION_POINTS: usize = 10;

/// Slope of the last ten prices against 1% of the latest price.
pub fn classify_trend(prices: &[f64]) -> TrendDirection {
    if prices.len() < TREND_WINDOW {
        return TrendDirection::Unknown;
    }
    let window = &prices[prices.len() - TREND_WINDOW..];
    let slope = linear_slope(window);
    let threshold = window[TREND_WINDOW - 1] * 0.01;

    if slope > threshold {
        TrendDirection::StrongUp
    } else if slope > 0.0 {
        TrendDirection::Up
    } else if slope < -threshold {
        TrendDirection::StrongDown
    } else if slope < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    }
}

/// Sample deviation of percentage returns.
pub fn volatility(prices: &[f64]) -> f64 {
    if prices.len() < MIN_VOLATILITY_POINTS {
        return 0.0;
    }
    std_sample(&pct_changes(prices)).unwrap_or(0.0)
}

/// Indicator verdict plus trend, volatility and window return for one series.
pub fn analyze_timeframe(engine: &IndicatorEngine, series: &Series) -> TimeframeAnalysis {
    let analysis = engine.analyze(series);
    let prices = series.prices();
    let first = series.first_price();

    TimeframeAnalysis {
        overall_signal: analysis.signals.overall,
        confidence: analysis.signals.confidence,
        bullish_count: analysis.signals.breakdown.bullish,
        bearish_count: analysis.signals.breakdown.bearish,
        rsi: analysis.indicators.rsi().map(|r| r.value),
        macd_signal: analysis.indicators.macd().map(|m| m.trade_signal),
        trend: classify_trend(&prices),
        volatility: volatility(&prices),
        price_change_pct: (series.last_price() - first) / first * 100.0,
    }
}

/// How far the per-timeframe verdicts agree.
pub fn timeframe_alignment(entries: &[TimeframeEntry]) -> TimeframeAlignment {
    let valid: Vec<&TimeframeAnalysis> = entries.iter().filter_map(|e| e.analysis.ready()).collect();
    let count = |signal: Signal| valid.iter().filter(|a| a.overall_signal == signal).count() as u32;

    let bullish = count(Signal::Bullish);
    let bearish = count(Signal::Bearish);
    let neutral = count(Signal::Neutral);
    let total = valid.len() as u32;

    let (score, assessment, recommendation) = if total < 2 {
        (
            0.0,
            AlignmentAssessment::InsufficientData,
            "Need data from multiple timeframes".to_string(),
        )
    } else if bullish == total {
        (
            100.0,
            AlignmentAssessment::PerfectBullishAlignment,
            "All timeframes bullish - very strong signal!".to_string(),
        )
    } else if bearish == total {
        (
            100.0,
            AlignmentAssessment::PerfectBearishAlignment,
            "All timeframes bearish - very strong signal!".to_string(),
        )
    } else if bullish > bearish {
        (
            f64::from(bullish) / f64::from(total) * 100.0,
            AlignmentAssessment::BullishMajority,
            format!("{}/{} timeframes bullish - moderately strong signal", bullish, total),
        )
    } else if bearish > bullish {
        (
            f64::from(bearish) / f64::from(total) * 100.0,
            AlignmentAssessment::BearishMajority,
            format!("{}/{} timeframes bearish - moderately strong signal", bearish, total),
        )
    } else {
        (
            50.0,
            AlignmentAssessment::MixedSignals,
            "Mixed signals across timeframes - proceed with caution".to_string(),
        )
    };

    TimeframeAlignment {
        score: round_to(score, 1),
        assessment,
        recommendation,
        bullish_timeframes: bullish,
        bearish_timeframes: bearish,
        neutral_timeframes: neutral,
        total_timeframes: total,
    }
}

fn correlation_strength(r: f64) -> CorrelationStrength {
    let abs = r.abs();
    if abs > 0.8 {
        CorrelationStrength::VeryStrong
    } else if abs > 0.6 {
        CorrelationStrength::Strong
    } else if abs > 0.4 {
        CorrelationStrength::Moderate
    } else if abs > 0.2 {
        CorrelationStrength::Weak
    } else {
        CorrelationStrength::VeryWeak
    }
}

/// Pearson correlation of two series joined on identical timestamps.
pub fn correlate(asset: &Series, reference: &Series) -> Analysis<CorrelationReport> {
    let reference_prices: HashMap<_, _> = reference
        .points()
        .iter()
        .map(|p| (p.timestamp, p.price))
        .collect();
    let (xs, ys): (Vec<f64>, Vec<f64>) = asset
        .points()
        .iter()
        .filter_map(|p| reference_prices.get(&p.timestamp).map(|r| (p.price, *r)))
        .unzip();

    if xs.len() < MIN_CORRELATION_POINTS {
        return Analysis::unavailable("Insufficient overlapping data for correlation");
    }
    let Some(r) = pearson(&xs, &ys) else {
        return Analysis::unavailable("Correlation undefined for a constant price series");
    };

    let (direction, direction_description) = if r > 0.0 {
        (CorrelationDirection::Positive, "moves with Bitcoin")
    } else {
        (CorrelationDirection::Negative, "moves opposite to Bitcoin")
    };

    let recommendation = if r.abs() > 0.7 {
        if r > 0.0 {
            format!("Highly correlated with BTC ({:.2}) - BTC trend dominates", r)
        } else {
            format!("Strongly inversely correlated with BTC ({:.2}) - rare!", r)
        }
    } else if r.abs() > 0.4 {
        format!("Moderately correlated with BTC ({:.2}) - some independence", r)
    } else {
        format!("Low correlation with BTC ({:.2}) - moves independently", r)
    };

    Analysis::Ready(CorrelationReport {
        correlation: r,
        strength: correlation_strength(r),
        direction: Some(direction),
        direction_description: Some(direction_description.to_string()),
        recommendation,
        sample_size: xs.len(),
    })
}

/// Regime, sizing and strategy for a fear & greed reading.
pub fn market_regime(fear_greed: Option<u8>) -> RegimeResult {
    let Some(value) = fear_greed else {
        return RegimeResult {
            fear_greed: None,
            regime: MarketRegime::Unknown,
            sentiment: None,
            recommendation: String::new(),
            position_sizing: None,
            strategy: None,
        };
    };

    let (regime, sentiment, recommendation, sizing, strategy) = match value {
        0..=19 => (
            MarketRegime::ExtremeFear,
            "Extreme Fear",
            "CONTRARIAN BUY ZONE - Market panic creates opportunities",
            PositionSizing::Increase,
            "Accumulate quality assets",
        ),
        20..=39 => (
            MarketRegime::Fear,
            "Fear",
            "BUY ZONE - Market nervous, good entry prices",
            PositionSizing::NormalToIncrease,
            "Buy dips, DCA",
        ),
        40..=59 => (
            MarketRegime::Neutral,
            "Neutral",
            "BALANCED MARKET - Trade based on technicals",
            PositionSizing::Normal,
            "Follow technical signals",
        ),
        60..=79 => (
            MarketRegime::Greed,
            "Greed",
            "CAUTION ZONE - Market getting heated, take some profits",
            PositionSizing::Reduce,
            "Scale out of positions",
        ),
        _ => (
            MarketRegime::ExtremeGreed,
            "Extreme Greed",
            "SELL ZONE - Market euphoric, significant correction likely",
            PositionSizing::Minimize,
            "Take profits, wait for pullback",
        ),
    };

    RegimeResult {
        fear_greed: Some(value),
        regime,
        sentiment: Some(sentiment.to_string()),
        recommendation: recommendation.to_string(),
        position_sizing: Some(sizing),
        strategy: Some(strategy.to_string()),
    }
}

/// Market-context analyzer over a price-history source.
pub struct MarketContext<'a, S: PriceHistory + ?Sized> {
    history: &'a S,
    engine: &'a IndicatorEngine,
    timeframes: Vec<u32>,
}

impl<'a, S: PriceHistory + ?Sized> MarketContext<'a, S> {
    pub fn new(history: &'a S, engine: &'a IndicatorEngine) -> Self {
        Self {
            history,
            engine,
            timeframes: DEFAULT_TIMEFRAMES.to_vec(),
        }
    }

    /// Timeframes used by [`Self::comprehensive_context`].
    pub fn with_timeframes(mut self, timeframes: Vec<u32>) -> Self {
        self.timeframes = timeframes;
        self
    }

    pub fn timeframes(&self) -> &[u32] {
        &self.timeframes
    }

    fn fetch(&self, asset_id: &str, days: u32) -> Option<Series> {
        match self.history.historical_prices(asset_id, days) {
            Ok(series) => series,
            Err(e) => {
                debug!("No {}d history for {}: {}", days, asset_id, e);
                None
            }
        }
    }

    pub fn analyze_multiple_timeframes(
        &self,
        asset_id: &str,
        timeframes: &[u32],
    ) -> MultiTimeframeReport {
        let entries: Vec<TimeframeEntry> = timeframes
            .iter()
            .map(|&days| TimeframeEntry {
                days,
                label: format!("{}d", days),
                analysis: match self.fetch(asset_id, days) {
                    Some(series) => Analysis::Ready(analyze_timeframe(self.engine, &series)),
                    None => Analysis::unavailable("No data available"),
                },
            })
            .collect();

        let alignment = timeframe_alignment(&entries);
        debug!(
            "{} timeframe alignment: {:?} ({})",
            asset_id, alignment.assessment, alignment.score
        );

        MultiTimeframeReport {
            timeframes: entries,
            alignment,
        }
    }

    pub fn analyze_btc_correlation(&self, asset_id: &str, days: u32) -> Analysis<CorrelationReport> {
        if asset_id.eq_ignore_ascii_case(BITCOIN_ID) {
            return Analysis::Ready(CorrelationReport {
                correlation: 1.0,
                strength: CorrelationStrength::SelfReference,
                direction: None,
                direction_description: None,
                recommendation: "Analyzing Bitcoin itself".to_string(),
                sample_size: 0,
            });
        }

        match (self.fetch(asset_id, days), self.fetch(BITCOIN_ID, days)) {
            (Some(asset), Some(btc)) => correlate(&asset, &btc),
            _ => Analysis::unavailable("Unable to fetch data for correlation analysis"),
        }
    }

    pub fn analyze_market_regime(fear_greed: Option<u8>) -> RegimeResult {
        market_regime(fear_greed)
    }

    pub fn comprehensive_context(
        &self,
        asset_id: &str,
        days: u32,
        fear_greed: Option<u8>,
    ) -> ComprehensiveContext {
        let btc_correlation = (!asset_id.eq_ignore_ascii_case(BITCOIN_ID))
            .then(|| self.analyze_btc_correlation(asset_id, days));

        ComprehensiveContext {
            asset_id: asset_id.to_string(),
            timeframe_analysis: self.analyze_multiple_timeframes(asset_id, &self.timeframes),
            btc_correlation,
            market_regime: Self::analyze_market_regime(fear_greed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemoryPriceHistory;
    use chrono::{TimeZone, Utc};

    fn create_series(prices: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Series::daily(start, prices, None).unwrap()
    }

    fn entry(days: u32, signal: Option<Signal>) -> TimeframeEntry {
        TimeframeEntry {
            days,
            label: format!("{}d", days),
            analysis: match signal {
                Some(overall_signal) => Analysis::Ready(TimeframeAnalysis {
                    overall_signal,
                    confidence: 70.0,
                    bullish_count: 0,
                    bearish_count: 0,
                    rsi: None,
                    macd_signal: None,
                    trend: TrendDirection::Unknown,
                    volatility: 0.0,
                    price_change_pct: 0.0,
                }),
                None => Analysis::unavailable("No data available"),
            },
        }
    }

    #[test]
    fn test_trend_classification() {
        let up: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 2.0).collect();
        assert_eq!(classify_trend(&up), TrendDirection::StrongUp);

        let gentle: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 0.1).collect();
        assert_eq!(classify_trend(&gentle), TrendDirection::Up);

        let down: Vec<f64> = (0..10).map(|i| 100.0 - i as f64 * 2.0).collect();
        assert_eq!(classify_trend(&down), TrendDirection::StrongDown);

        assert_eq!(classify_trend(&[100.0; 10]), TrendDirection::Sideways);
        assert_eq!(classify_trend(&[100.0; 9]), TrendDirection::Unknown);
    }

    #[test]
    fn test_volatility() {
        assert_eq!(volatility(&[100.0, 110.0, 100.0, 110.0]), 0.0);
        assert_eq!(volatility(&[100.0; 6]), 0.0);
        assert!(volatility(&[100.0, 110.0, 100.0, 110.0, 100.0]) > 5.0);
    }

    #[test]
    fn test_alignment_needs_two_timeframes() {
        let alignment = timeframe_alignment(&[entry(7, Some(Signal::Bullish)), entry(30, None)]);
        assert_eq!(alignment.assessment, AlignmentAssessment::InsufficientData);
        assert_eq!(alignment.score, 0.0);
    }

    #[test]
    fn test_perfect_alignment() {
        let alignment = timeframe_alignment(&[
            entry(7, Some(Signal::Bearish)),
            entry(30, Some(Signal::Bearish)),
            entry(90, None),
        ]);
        assert_eq!(alignment.assessment, AlignmentAssessment::PerfectBearishAlignment);
        assert_eq!(alignment.score, 100.0);
        assert_eq!(alignment.total_timeframes, 2);
    }

    #[test]
    fn test_majority_alignment() {
        let alignment = timeframe_alignment(&[
            entry(7, Some(Signal::Bullish)),
            entry(30, Some(Signal::Bullish)),
            entry(90, Some(Signal::Neutral)),
        ]);
        assert_eq!(alignment.assessment, AlignmentAssessment::BullishMajority);
        assert_eq!(alignment.score, 66.7);
        assert_eq!(
            alignment.recommendation,
            "2/3 timeframes bullish - moderately strong signal"
        );
        assert_eq!(alignment.neutral_timeframes, 1);
    }

    #[test]
    fn test_mixed_alignment() {
        let alignment = timeframe_alignment(&[
            entry(7, Some(Signal::Bullish)),
            entry(30, Some(Signal::Bearish)),
        ]);
        assert_eq!(alignment.assessment, AlignmentAssessment::MixedSignals);
        assert_eq!(alignment.score, 50.0);
    }

    #[test]
    fn test_correlation_of_scaled_copy() {
        let btc: Vec<f64> = (0..30)
            .map(|i| 40_000.0 + (i as f64).sin() * 500.0 + i as f64 * 10.0)
            .collect();
        let alt: Vec<f64> = btc.iter().map(|p| p / 20.0).collect();
        let Analysis::Ready(report) = correlate(&create_series(&alt), &create_series(&btc)) else {
            panic!("expected a correlation");
        };
        assert!((report.correlation - 1.0).abs() < 1e-9);
        assert_eq!(report.strength, CorrelationStrength::VeryStrong);
        assert_eq!(report.direction, Some(CorrelationDirection::Positive));
        assert_eq!(report.sample_size, 30);
        assert!(report.recommendation.starts_with("Highly correlated with BTC (1.00)"));
    }

    #[test]
    fn test_correlation_needs_overlap() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let a = Series::daily(start, &prices, None).unwrap();
        let b = Series::daily(later, &prices, None).unwrap();
        assert_eq!(
            correlate(&a, &b).error(),
            Some("Insufficient overlapping data for correlation")
        );
    }

    #[test]
    fn test_correlation_of_constant_series_is_unavailable() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert!(!correlate(&create_series(&[5.0; 20]), &create_series(&prices)).is_ready());
    }

    #[test]
    fn test_regime_table() {
        assert_eq!(market_regime(None).regime, MarketRegime::Unknown);
        assert_eq!(market_regime(None).recommendation, "");
        assert_eq!(market_regime(Some(10)).regime, MarketRegime::ExtremeFear);
        assert_eq!(market_regime(Some(20)).regime, MarketRegime::Fear);
        assert_eq!(market_regime(Some(59)).regime, MarketRegime::Neutral);
        assert_eq!(market_regime(Some(60)).position_sizing, Some(PositionSizing::Reduce));
        let greed = market_regime(Some(80));
        assert_eq!(greed.regime, MarketRegime::ExtremeGreed);
        assert_eq!(greed.sentiment.as_deref(), Some("Extreme Greed"));
        assert_eq!(greed.strategy.as_deref(), Some("Take profits, wait for pullback"));
    }

    #[test]
    fn test_bitcoin_correlates_with_itself() {
        let history = MemoryPriceHistory::new();
        let engine = IndicatorEngine::default();
        let context = MarketContext::new(&history, &engine);
        let report = context.analyze_btc_correlation("bitcoin", 30);
        let report = report.ready().unwrap();
        assert_eq!(report.correlation, 1.0);
        assert_eq!(report.strength, CorrelationStrength::SelfReference);
    }

    #[test]
    fn test_missing_history_is_reported() {
        let history = MemoryPriceHistory::new();
        let engine = IndicatorEngine::default();
        let context = MarketContext::new(&history, &engine);

        let report = context.analyze_multiple_timeframes("ethereum", &[7, 30]);
        assert_eq!(report.timeframes[0].label, "7d");
        assert_eq!(report.timeframes[0].analysis.error(), Some("No data available"));
        assert_eq!(report.alignment.assessment, AlignmentAssessment::InsufficientData);

        assert_eq!(
            context.analyze_btc_correlation("ethereum", 30).error(),
            Some("Unable to fetch data for correlation analysis")
        );
    }
}
