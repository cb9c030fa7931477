//! Price and chart pattern recognition.
//!
//! Only closing prices are available, so the "candlestick" patterns are
//! approximated from consecutive percentage changes and the chart patterns
//! from strict local extrema over the last twenty samples.

use super::indicators::math::{linear_fit, mean, pct_changes, std_population};
use super::{evaluate, Computation, Indicator};
use crate::types::{
    IndicatorKind, IndicatorResult, Pattern, PatternKind, PatternResult, PatternStrength, Series,
    Signal,
};

const PRICE_PATTERN_MIN: usize = 5;
const STREAK_WINDOW: usize = 5;
const CHART_WINDOW: usize = 20;
const CHANNEL_WINDOW: usize = 10;

fn pattern(
    name: PatternKind,
    description: impl Into<String>,
    signal: Signal,
    strength: PatternStrength,
) -> Pattern {
    Pattern {
        name,
        description: description.into(),
        signal,
        strength,
        price_level: None,
    }
}

/// Majority of BULLISH vs BEARISH patterns; `tie` when they balance.
fn overall(patterns: &[Pattern], tie: Signal) -> Signal {
    if patterns.is_empty() {
        return Signal::NoSignal;
    }
    let bullish = patterns.iter().filter(|p| p.signal == Signal::Bullish).count();
    let bearish = patterns.iter().filter(|p| p.signal == Signal::Bearish).count();
    if bullish > bearish {
        Signal::Bullish
    } else if bearish > bullish {
        Signal::Bearish
    } else {
        tie
    }
}

fn finish(patterns: Vec<Pattern>, tie: Signal) -> PatternResult {
    let overall_signal = overall(&patterns, tie);
    PatternResult {
        pattern_count: patterns.len(),
        patterns_detected: patterns,
        overall_signal,
    }
}

/// Short-run patterns over the latest percentage changes.
///
/// Streaks are counted over the last five changes, so a full five-change
/// streak can report exhaustion or a bounce.
pub fn detect_price_patterns(prices: &[f64]) -> PatternResult {
    let changes = pct_changes(prices);
    let recent = &changes[changes.len().saturating_sub(STREAK_WINDOW)..];
    let mut patterns = Vec::new();

    if recent.len() < 2 {
        return finish(patterns, Signal::Neutral);
    }
    let last = recent[recent.len() - 1];
    let prev = recent[recent.len() - 2];

    // Sharp reversal
    if last.abs() > 3.0 && prev.abs() > 3.0 && last.signum() != prev.signum() {
        if last > 0.0 {
            patterns.push(pattern(
                PatternKind::BullishReversal,
                "Strong bullish reversal after decline",
                Signal::Bullish,
                PatternStrength::Strong,
            ));
        } else {
            patterns.push(pattern(
                PatternKind::BearishReversal,
                "Strong bearish reversal after rise",
                Signal::Bearish,
                PatternStrength::Strong,
            ));
        }
    }

    // Streaks; flat changes neither extend nor reset.
    let mut up = 0usize;
    let mut down = 0usize;
    for &change in recent {
        if change > 0.0 {
            up += 1;
            down = 0;
        } else if change < 0.0 {
            down += 1;
            up = 0;
        }
    }

    if up >= 3 {
        patterns.push(pattern(
            PatternKind::StrongUptrend,
            format!("{} consecutive up moves - strong momentum", up),
            Signal::Bullish,
            PatternStrength::Moderate,
        ));
    } else if down >= 3 {
        patterns.push(pattern(
            PatternKind::StrongDowntrend,
            format!("{} consecutive down moves - strong momentum", down),
            Signal::Bearish,
            PatternStrength::Moderate,
        ));
    }

    if up >= 5 {
        patterns.push(pattern(
            PatternKind::ExhaustionWarning,
            "Extended uptrend - potential exhaustion/reversal",
            Signal::Caution,
            PatternStrength::Moderate,
        ));
    } else if down >= 5 {
        patterns.push(pattern(
            PatternKind::OversoldBounce,
            "Extended downtrend - potential bounce coming",
            Signal::Watch,
            PatternStrength::Moderate,
        ));
    }

    // Small move right after a large one
    if last.abs() < 0.5 && prev.abs() > 2.0 {
        patterns.push(pattern(
            PatternKind::Indecision,
            "Small move after large move - market indecision",
            Signal::Neutral,
            PatternStrength::Weak,
        ));
    }

    finish(patterns, Signal::Neutral)
}

/// Indices of strict local maxima and minima.
fn local_extrema(prices: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let mut maxima = Vec::new();
    let mut minima = Vec::new();
    for i in 1..prices.len().saturating_sub(1) {
        if prices[i] > prices[i - 1] && prices[i] > prices[i + 1] {
            maxima.push(i);
        }
        if prices[i] < prices[i - 1] && prices[i] < prices[i + 1] {
            minima.push(i);
        }
    }
    (maxima, minima)
}

fn last_two(prices: &[f64], indices: &[usize]) -> Option<(f64, f64)> {
    match indices {
        [.., a, b] => Some((prices[*a], prices[*b])),
        _ => None,
    }
}

fn range(values: &[f64]) -> f64 {
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    hi - lo
}

/// Classical chart patterns over the last twenty samples.
pub fn detect_chart_patterns(prices: &[f64]) -> PatternResult {
    let recent = &prices[prices.len().saturating_sub(CHART_WINDOW)..];
    let mut patterns = Vec::new();

    if recent.len() < 3 {
        return finish(patterns, Signal::Mixed);
    }
    let current = recent[recent.len() - 1];
    let (maxima, minima) = local_extrema(recent);

    if let Some((first, second)) = last_two(recent, &maxima) {
        if (second - first).abs() / first < 0.02 {
            let mut p = pattern(
                PatternKind::DoubleTop,
                "Double top pattern - bearish reversal",
                Signal::Bearish,
                PatternStrength::Strong,
            );
            p.price_level = Some(first.max(second));
            patterns.push(p);
        }
    }

    if let Some((first, second)) = last_two(recent, &minima) {
        if (second - first).abs() / first < 0.02 {
            let mut p = pattern(
                PatternKind::DoubleBottom,
                "Double bottom pattern - bullish reversal",
                Signal::Bullish,
                PatternStrength::Strong,
            );
            p.price_level = Some(first.min(second));
            patterns.push(p);
        }
    }

    if maxima.len() >= 2 && minima.len() >= 2 {
        let tail5 = &recent[recent.len().saturating_sub(5)..];
        if range(tail5) < range(recent) * 0.5 {
            patterns.push(pattern(
                PatternKind::Consolidation,
                "Price consolidating - potential breakout imminent",
                Signal::Watch,
                PatternStrength::Moderate,
            ));
        }
    }

    let mu = mean(recent);
    let sigma = std_population(recent);
    if current > mu + 1.5 * sigma {
        patterns.push(pattern(
            PatternKind::UpsideBreakout,
            "Price breaking out above resistance",
            Signal::Bullish,
            PatternStrength::Strong,
        ));
    } else if current < mu - 1.5 * sigma {
        patterns.push(pattern(
            PatternKind::DownsideBreakdown,
            "Price breaking down below support",
            Signal::Bearish,
            PatternStrength::Strong,
        ));
    }

    if prices.len() >= CHANNEL_WINDOW {
        let window = &prices[prices.len() - CHANNEL_WINDOW..];
        let (slope, intercept) = linear_fit(window);
        let avg_deviation = window
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (slope * i as f64 + intercept)).abs())
            .sum::<f64>()
            / CHANNEL_WINDOW as f64;

        if avg_deviation / mean(window) < 0.02 {
            if slope > 0.0 {
                patterns.push(pattern(
                    PatternKind::RisingChannel,
                    "Clean uptrend channel - trend-following opportunity",
                    Signal::Bullish,
                    PatternStrength::Moderate,
                ));
            } else {
                patterns.push(pattern(
                    PatternKind::FallingChannel,
                    "Clean downtrend channel - wait for reversal",
                    Signal::Bearish,
                    PatternStrength::Moderate,
                ));
            }
        }
    }

    finish(patterns, Signal::Mixed)
}

/// Price-pattern pass as an indicator.
pub struct PricePatterns;

impl Indicator for PricePatterns {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::PricePatterns
    }

    fn name(&self) -> &str {
        "Price Patterns"
    }

    fn min_periods(&self) -> usize {
        PRICE_PATTERN_MIN
    }

    fn compute(&self, series: &Series) -> Computation {
        let prices = series.prices();
        let changes: Vec<Option<f64>> = std::iter::once(None)
            .chain(pct_changes(&prices).into_iter().map(Some))
            .collect();
        Computation::new(IndicatorResult::PricePatterns(detect_price_patterns(&prices)))
            .with_column("pct_change", changes)
    }
}

/// Chart-pattern pass as an indicator.
pub struct ChartPatterns;

impl Indicator for ChartPatterns {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::ChartPatterns
    }

    fn name(&self) -> &str {
        "Chart Patterns"
    }

    fn min_periods(&self) -> usize {
        CHART_WINDOW
    }

    fn compute(&self, series: &Series) -> Computation {
        Computation::new(IndicatorResult::ChartPatterns(detect_chart_patterns(
            &series.prices(),
        )))
    }
}

/// Scans a series for price and chart patterns.
pub struct PatternDetector;

impl PatternDetector {
    pub fn price_patterns(series: &Series) -> IndicatorResult {
        evaluate(&PricePatterns, series).result
    }

    pub fn chart_patterns(series: &Series) -> IndicatorResult {
        evaluate(&ChartPatterns, series).result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_series(prices: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Series::daily(start, prices, None).unwrap()
    }

    fn kinds(result: &PatternResult) -> Vec<PatternKind> {
        result.patterns_detected.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_price_patterns_need_five_points() {
        let result = PatternDetector::price_patterns(&create_series(&[1.0, 2.0, 3.0, 4.0]));
        assert!(!result.is_available());
    }

    #[test]
    fn test_four_change_uptrend() {
        let result = detect_price_patterns(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        assert_eq!(kinds(&result), vec![PatternKind::StrongUptrend]);
        assert_eq!(result.overall_signal, Signal::Bullish);
    }

    #[test]
    fn test_five_change_uptrend_warns_exhaustion() {
        let result = detect_price_patterns(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert_eq!(
            kinds(&result),
            vec![PatternKind::StrongUptrend, PatternKind::ExhaustionWarning]
        );
        assert_eq!(result.pattern_count, 2);
        assert_eq!(result.overall_signal, Signal::Bullish);
    }

    #[test]
    fn test_five_change_downtrend_watches_bounce() {
        let result = detect_price_patterns(&[110.0, 108.0, 106.0, 104.0, 102.0, 100.0]);
        assert!(result.contains(PatternKind::StrongDowntrend));
        assert!(result.contains(PatternKind::OversoldBounce));
        assert_eq!(result.overall_signal, Signal::Bearish);
    }

    #[test]
    fn test_flat_moves_do_not_reset_streak() {
        let result = detect_price_patterns(&[100.0, 101.0, 101.0, 102.0, 102.0, 103.0]);
        assert!(result.contains(PatternKind::StrongUptrend));
    }

    #[test]
    fn test_sharp_reversal() {
        let result = detect_price_patterns(&[100.0, 100.0, 100.0, 100.0, 90.0, 95.0]);
        assert!(result.contains(PatternKind::BullishReversal));
        assert_eq!(result.overall_signal, Signal::Bullish);

        let result = detect_price_patterns(&[100.0, 100.0, 100.0, 100.0, 110.0, 104.0]);
        assert!(result.contains(PatternKind::BearishReversal));
    }

    #[test]
    fn test_indecision_is_neutral() {
        let result = detect_price_patterns(&[100.0, 100.0, 100.0, 100.0, 104.0, 104.2]);
        assert_eq!(kinds(&result), vec![PatternKind::Indecision]);
        assert_eq!(result.patterns_detected[0].strength, PatternStrength::Weak);
        assert_eq!(result.overall_signal, Signal::Neutral);
    }

    #[test]
    fn test_no_price_patterns() {
        let result = detect_price_patterns(&[100.0; 8]);
        assert_eq!(result.pattern_count, 0);
        assert_eq!(result.overall_signal, Signal::NoSignal);
    }

    #[test]
    fn test_chart_patterns_need_twenty_points() {
        assert!(!PatternDetector::chart_patterns(&create_series(&[100.0; 19])).is_available());
    }

    #[test]
    fn test_double_top_and_bottom_is_mixed() {
        let wave = [100.0, 110.0, 120.0, 130.0, 120.0, 110.0];
        let prices: Vec<f64> = wave.iter().cycle().take(20).copied().collect();
        let result = detect_chart_patterns(&prices);

        assert!(result.contains(PatternKind::DoubleTop));
        assert!(result.contains(PatternKind::DoubleBottom));
        assert!(!result.contains(PatternKind::UpsideBreakout));
        let top = result
            .patterns_detected
            .iter()
            .find(|p| p.name == PatternKind::DoubleTop)
            .unwrap();
        assert_eq!(top.price_level, Some(130.0));
        assert_eq!(result.overall_signal, Signal::Mixed);
    }

    #[test]
    fn test_upside_breakout() {
        let mut prices = vec![100.0; 19];
        prices.push(110.0);
        let result = detect_chart_patterns(&prices);
        assert!(result.contains(PatternKind::UpsideBreakout));
        assert_eq!(result.overall_signal, Signal::Bullish);
    }

    #[test]
    fn test_rising_channel() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = detect_chart_patterns(&prices);
        assert!(result.contains(PatternKind::RisingChannel));
        assert_eq!(result.overall_signal, Signal::Bullish);
    }

    #[test]
    fn test_flat_channel_counts_as_falling() {
        let result = detect_chart_patterns(&[100.0; 20]);
        assert_eq!(kinds(&result), vec![PatternKind::FallingChannel]);
        assert_eq!(result.overall_signal, Signal::Bearish);
    }

    #[test]
    fn test_consolidation() {
        let mut prices: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 90.0 } else { 110.0 })
            .collect();
        prices.extend((15..20).map(|i| if i % 2 == 1 { 101.0 } else { 100.0 }));
        let result = detect_chart_patterns(&prices);
        assert!(result.contains(PatternKind::Consolidation));
    }
}
