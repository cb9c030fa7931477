//! Volume analysis: level, trend, price/volume divergence, spikes and a
//! combined confirmation score.

use super::math::{last_defined, linear_slope, mean, rolling_mean};
use crate::services::signals::{Computation, Indicator};
use crate::types::{
    IndicatorKind, IndicatorResult, Series, Signal, SpikeMagnitude, VolumeAnalysisResult,
    VolumeAssessment, VolumeDivergence, VolumeLevel, VolumeTrend,
};

const SHORT_AVERAGE: usize = 20;
const LONG_AVERAGE: usize = 50;
const TREND_WINDOW: usize = 5;
const DIVERGENCE_WINDOW: usize = 10;

pub struct VolumeAnalysis;

impl Default for VolumeAnalysis {
    fn default() -> Self {
        Self
    }
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn classify_level(ratio: f64) -> (VolumeLevel, &'static str) {
    if ratio > 2.5 {
        (
            VolumeLevel::ExtremeVolume,
            "Extreme volume spike - major event or whale activity",
        )
    } else if ratio > 2.0 {
        (
            VolumeLevel::VeryHighVolume,
            "Very high volume - strong conviction in price move",
        )
    } else if ratio > 1.5 {
        (
            VolumeLevel::HighVolume,
            "Above average volume - increased interest",
        )
    } else if ratio < 0.5 {
        (
            VolumeLevel::LowVolume,
            "Low volume - lack of conviction, weak move",
        )
    } else {
        (VolumeLevel::Normal, "Normal volume levels")
    }
}

fn classify_divergence(
    price_up: bool,
    volume_up: bool,
) -> (VolumeDivergence, Signal, &'static str) {
    match (price_up, volume_up) {
        (true, false) => (
            VolumeDivergence::NegativeDivergence,
            Signal::Bearish,
            "Price rising but volume declining - weak rally, possible reversal",
        ),
        (false, true) => (
            VolumeDivergence::NegativeDivergence,
            Signal::Bearish,
            "Price falling with increasing volume - strong selling pressure",
        ),
        (true, true) => (
            VolumeDivergence::PositiveConfirmation,
            Signal::Bullish,
            "Price rising with increasing volume - healthy uptrend",
        ),
        (false, false) => (
            VolumeDivergence::WeakMove,
            Signal::Neutral,
            "Price falling with decreasing volume - selling pressure weakening",
        ),
    }
}

/// Latest volume against the mean of the two before it.
fn detect_spike(volumes: &[f64]) -> (bool, SpikeMagnitude) {
    let last3 = tail(volumes, 3);
    if last3.len() < 3 {
        return (false, SpikeMagnitude::NoSpike);
    }
    let previous = mean(&last3[..2]);
    let ratio = if previous > 0.0 { last3[2] / previous } else { 1.0 };

    if ratio > 3.0 {
        (true, SpikeMagnitude::Extreme)
    } else if ratio > 2.0 {
        (true, SpikeMagnitude::Significant)
    } else {
        (false, SpikeMagnitude::NoSpike)
    }
}

/// Additive 0-100 confirmation score.
pub(crate) fn confirmation_score(ratio: f64, trend: VolumeTrend, divergence_type: Signal) -> u8 {
    let mut score: i32 = 0;

    if ratio > 1.5 {
        score += 30;
    } else if ratio > 1.0 {
        score += 15;
    }

    if trend == VolumeTrend::Increasing {
        score += 25;
    }

    match divergence_type {
        Signal::Bullish => score += 45,
        Signal::Bearish => score = (score - 30).max(0),
        _ => score += 20,
    }

    score.clamp(0, 100) as u8
}

fn assess(score: u8) -> VolumeAssessment {
    if score >= 70 {
        VolumeAssessment::StrongConfirmation
    } else if score >= 50 {
        VolumeAssessment::ModerateConfirmation
    } else if score >= 30 {
        VolumeAssessment::WeakConfirmation
    } else {
        VolumeAssessment::NoConfirmation
    }
}

impl Indicator for VolumeAnalysis {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::VolumeAnalysis
    }

    fn name(&self) -> &str {
        "Volume Analysis"
    }

    fn min_periods(&self) -> usize {
        SHORT_AVERAGE
    }

    fn requires_volume(&self) -> bool {
        true
    }

    fn compute(&self, series: &Series) -> Computation {
        let Some(volumes) = series.volumes() else {
            return Computation::unavailable(self.kind(), "Volume data not available");
        };
        let prices = series.prices();

        let ma_20 = rolling_mean(&volumes, SHORT_AVERAGE);
        let ma_50 = (volumes.len() >= LONG_AVERAGE).then(|| rolling_mean(&volumes, LONG_AVERAGE));

        let (Some(&current_volume), Some(avg_volume_20)) = (volumes.last(), last_defined(&ma_20))
        else {
            return Computation::unavailable(
                self.kind(),
                "Insufficient data for volume analysis (need 20+ data points)",
            );
        };
        let avg_volume_50 = ma_50
            .as_deref()
            .and_then(last_defined)
            .unwrap_or(avg_volume_20);

        let volume_ratio = if avg_volume_20 > 0.0 {
            current_volume / avg_volume_20
        } else {
            1.0
        };
        let (level, recommendation) = classify_level(volume_ratio);

        let recent = tail(&volumes, TREND_WINDOW);
        let trend_direction = if linear_slope(recent) > 0.0 {
            VolumeTrend::Increasing
        } else {
            VolumeTrend::Decreasing
        };
        let trend_change_pct = match (recent.first(), recent.last()) {
            (Some(&first), Some(&last)) if first > 0.0 => (last - first) / first * 100.0,
            _ => 0.0,
        };

        let price_up = linear_slope(tail(&prices, DIVERGENCE_WINDOW)) > 0.0;
        let volume_up = linear_slope(tail(&volumes, DIVERGENCE_WINDOW)) > 0.0;
        let (divergence_signal, divergence_type, divergence_recommendation) =
            classify_divergence(price_up, volume_up);

        let (spike_detected, spike_magnitude) = detect_spike(&volumes);
        let score = confirmation_score(volume_ratio, trend_direction, divergence_type);

        let mut computation = Computation::new(IndicatorResult::VolumeAnalysis(VolumeAnalysisResult {
            current_volume,
            avg_volume_20,
            avg_volume_50,
            volume_ratio,
            level,
            recommendation: recommendation.to_string(),
            trend_direction,
            trend_change_pct,
            divergence_signal,
            divergence_type,
            divergence_recommendation: divergence_recommendation.to_string(),
            spike_detected,
            spike_magnitude,
            confirmation_score: score,
            overall_assessment: assess(score),
        }))
        .with_column("volume_ma_20", ma_20);

        if let Some(ma_50) = ma_50 {
            computation = computation.with_column("volume_ma_50", ma_50);
        }
        computation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::evaluate;
    use chrono::{TimeZone, Utc};

    fn volume_result(prices: &[f64], volumes: &[f64]) -> VolumeAnalysisResult {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series = Series::daily(start, prices, Some(volumes)).unwrap();
        match evaluate(&VolumeAnalysis, &series).result {
            IndicatorResult::VolumeAnalysis(r) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_rising_price_rising_volume_confirms() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let volumes: Vec<f64> = (0..60).map(|i| 1000.0 + i as f64 * 10.0).collect();
        let result = volume_result(&prices, &volumes);

        assert_eq!(result.divergence_signal, VolumeDivergence::PositiveConfirmation);
        assert_eq!(result.divergence_type, Signal::Bullish);
        assert_eq!(result.trend_direction, VolumeTrend::Increasing);
        assert_eq!(result.level, VolumeLevel::Normal);
        // ratio > 1 (+15), increasing (+25), bullish (+45)
        assert_eq!(result.confirmation_score, 85);
        assert_eq!(result.overall_assessment, VolumeAssessment::StrongConfirmation);
        assert!(!result.spike_detected);
        assert!((result.avg_volume_50 - mean(&volumes[10..])).abs() < 1e-9);
    }

    #[test]
    fn test_rising_price_falling_volume_is_bearish_divergence() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let volumes: Vec<f64> = (0..30).map(|i| 5000.0 - i as f64 * 50.0).collect();
        let result = volume_result(&prices, &volumes);
        assert_eq!(result.divergence_signal, VolumeDivergence::NegativeDivergence);
        assert_eq!(result.divergence_type, Signal::Bearish);
        assert_eq!(result.confirmation_score, 0);
        assert_eq!(result.overall_assessment, VolumeAssessment::NoConfirmation);
        // Under 50 points the long average falls back to the short one.
        assert_eq!(result.avg_volume_50, result.avg_volume_20);
    }

    #[test]
    fn test_extreme_spike() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let mut volumes = vec![100.0; 30];
        volumes[29] = 500.0;
        let result = volume_result(&prices, &volumes);
        assert!(result.spike_detected);
        assert_eq!(result.spike_magnitude, SpikeMagnitude::Extreme);
        assert_eq!(result.level, VolumeLevel::ExtremeVolume);
    }

    #[test]
    fn test_score_is_floored_at_zero() {
        assert_eq!(confirmation_score(1.2, VolumeTrend::Decreasing, Signal::Bearish), 0);
        assert_eq!(confirmation_score(2.0, VolumeTrend::Increasing, Signal::Bearish), 25);
        assert_eq!(confirmation_score(0.8, VolumeTrend::Decreasing, Signal::Neutral), 20);
        assert_eq!(confirmation_score(2.0, VolumeTrend::Increasing, Signal::Bullish), 100);
    }
}
