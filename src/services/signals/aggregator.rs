//! Weighted vote over an indicator map.
//!
//! Every indicator reading is looked up in [`VOTE_WEIGHTS`]; the matching row
//! adds its points to one side. The side holding more than 60% of all points
//! wins, otherwise the verdict is NEUTRAL.

use super::indicators::math::round_to;
use crate::types::{AggregateSignal, Breakdown, IndicatorMap, ObvDivergence, Signal};
use serde::Serialize;
use tracing::debug;

/// Share of the total a side needs to carry the verdict.
const MAJORITY_PCT: f64 = 60.0;
const UNDECIDED_CONFIDENCE: f64 = 50.0;

/// Which reading a vote comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSource {
    Rsi,
    Macd,
    Bollinger,
    SmaCross,
    VolumeDivergence,
    VolumeSpike,
    Stochastic,
    ObvSignal,
    ObvDivergence,
    PricePatterns,
    ChartPatterns,
}

impl VoteSource {
    /// Points for a reading with no row of its own. Oscillators always vote;
    /// the remaining sources stay silent.
    fn fallback(&self) -> Option<(Side, u32)> {
        match self {
            Self::Rsi | Self::Macd | Self::Bollinger | Self::Stochastic => {
                Some((Side::Neutral, 1))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Bullish,
    Bearish,
    Neutral,
}

/// `(source, reading, side, points)`.
pub const VOTE_WEIGHTS: &[(VoteSource, Signal, Side, u32)] = &[
    (VoteSource::Rsi, Signal::Oversold, Side::Bullish, 2),
    (VoteSource::Rsi, Signal::Bullish, Side::Bullish, 1),
    // Overbought RSI scores as momentum.
    (VoteSource::Rsi, Signal::Overbought, Side::Bullish, 1),
    (VoteSource::Rsi, Signal::Bearish, Side::Bearish, 1),
    (VoteSource::Rsi, Signal::Neutral, Side::Neutral, 1),
    (VoteSource::Macd, Signal::BullishCrossover, Side::Bullish, 2),
    (VoteSource::Macd, Signal::Bullish, Side::Bullish, 1),
    (VoteSource::Macd, Signal::BearishCrossover, Side::Bearish, 2),
    (VoteSource::Macd, Signal::Bearish, Side::Bearish, 1),
    (VoteSource::Macd, Signal::Neutral, Side::Neutral, 1),
    (VoteSource::Bollinger, Signal::Oversold, Side::Bullish, 2),
    (VoteSource::Bollinger, Signal::Bullish, Side::Bullish, 1),
    (VoteSource::Bollinger, Signal::Overbought, Side::Bearish, 2),
    (VoteSource::Bollinger, Signal::Bearish, Side::Bearish, 1),
    (VoteSource::Bollinger, Signal::Neutral, Side::Neutral, 1),
    (VoteSource::SmaCross, Signal::StrongBullish, Side::Bullish, 3),
    (VoteSource::SmaCross, Signal::StrongBearish, Side::Bearish, 3),
    (VoteSource::SmaCross, Signal::Bullish, Side::Bullish, 1),
    (VoteSource::SmaCross, Signal::Bearish, Side::Bearish, 1),
    (VoteSource::VolumeDivergence, Signal::Bullish, Side::Bullish, 2),
    (VoteSource::VolumeDivergence, Signal::Bearish, Side::Bearish, 2),
    (VoteSource::VolumeSpike, Signal::Neutral, Side::Neutral, 1),
    (VoteSource::Stochastic, Signal::Oversold, Side::Bullish, 1),
    (VoteSource::Stochastic, Signal::BullishCross, Side::Bullish, 1),
    (VoteSource::Stochastic, Signal::Overbought, Side::Bearish, 1),
    (VoteSource::Stochastic, Signal::BearishCross, Side::Bearish, 1),
    (VoteSource::Stochastic, Signal::Neutral, Side::Neutral, 1),
    (VoteSource::ObvSignal, Signal::Bullish, Side::Bullish, 1),
    (VoteSource::ObvSignal, Signal::Bearish, Side::Bearish, 1),
    (VoteSource::ObvDivergence, Signal::Bullish, Side::Bullish, 2),
    (VoteSource::ObvDivergence, Signal::Bearish, Side::Bearish, 2),
    (VoteSource::PricePatterns, Signal::Bullish, Side::Bullish, 1),
    (VoteSource::PricePatterns, Signal::Bearish, Side::Bearish, 1),
    (VoteSource::ChartPatterns, Signal::Bullish, Side::Bullish, 2),
    (VoteSource::ChartPatterns, Signal::Bearish, Side::Bearish, 2),
];

/// Table row for a reading, if there is one.
pub fn points_for(source: VoteSource, signal: Signal) -> Option<(Side, u32)> {
    VOTE_WEIGHTS
        .iter()
        .find(|(s, sig, _, _)| *s == source && *sig == signal)
        .map(|(_, _, side, points)| (*side, *points))
}

/// Collect every vote the map supports, in table order of sources.
fn votes(indicators: &IndicatorMap) -> Vec<(VoteSource, Signal)> {
    let mut votes = Vec::new();

    if let Some(rsi) = indicators.rsi() {
        votes.push((VoteSource::Rsi, rsi.signal));
    }
    if let Some(macd) = indicators.macd() {
        votes.push((VoteSource::Macd, macd.trade_signal));
    }
    if let Some(bb) = indicators.bollinger() {
        votes.push((VoteSource::Bollinger, bb.signal));
    }
    if let Some(cross) = indicators.sma().and_then(|sma| sma.cross.as_ref()) {
        votes.push((VoteSource::SmaCross, cross.cross_signal));
    }
    if let Some(volume) = indicators.volume_analysis() {
        votes.push((VoteSource::VolumeDivergence, volume.divergence_type));
        if volume.spike_detected {
            votes.push((VoteSource::VolumeSpike, Signal::Neutral));
        }
    }
    if let Some(stoch) = indicators.stochastic() {
        votes.push((VoteSource::Stochastic, stoch.signal));
    }
    if let Some(obv) = indicators.obv() {
        votes.push((VoteSource::ObvSignal, obv.signal));
        match obv.divergence {
            ObvDivergence::Positive => votes.push((VoteSource::ObvDivergence, Signal::Bullish)),
            ObvDivergence::Negative => votes.push((VoteSource::ObvDivergence, Signal::Bearish)),
            ObvDivergence::NoDivergence => {}
        }
    }
    if let Some(patterns) = indicators.price_patterns() {
        votes.push((VoteSource::PricePatterns, patterns.overall_signal));
    }
    if let Some(patterns) = indicators.chart_patterns() {
        votes.push((VoteSource::ChartPatterns, patterns.overall_signal));
    }

    votes
}

/// Fuses indicator readings into a single verdict.
pub struct SignalAggregator;

impl SignalAggregator {
    /// Point tallies over every available indicator.
    pub fn tally(indicators: &IndicatorMap) -> Breakdown {
        let mut breakdown = Breakdown::default();
        for (source, signal) in votes(indicators) {
            let Some((side, points)) = points_for(source, signal).or_else(|| source.fallback())
            else {
                continue;
            };
            match side {
                Side::Bullish => breakdown.bullish += points,
                Side::Bearish => breakdown.bearish += points,
                Side::Neutral => breakdown.neutral += points,
            }
        }
        breakdown
    }

    pub fn generate_signals(indicators: &IndicatorMap) -> AggregateSignal {
        let breakdown = Self::tally(indicators);
        let total = breakdown.total();
        if total == 0 {
            return AggregateSignal::neutral();
        }

        let bullish_pct = f64::from(breakdown.bullish) / f64::from(total) * 100.0;
        let bearish_pct = f64::from(breakdown.bearish) / f64::from(total) * 100.0;

        let (overall, confidence) = if bullish_pct > MAJORITY_PCT {
            (Signal::Bullish, bullish_pct)
        } else if bearish_pct > MAJORITY_PCT {
            (Signal::Bearish, bearish_pct)
        } else {
            (Signal::Neutral, UNDECIDED_CONFIDENCE)
        };

        debug!(
            "Votes bullish={} bearish={} neutral={} -> {}",
            breakdown.bullish, breakdown.bearish, breakdown.neutral, overall
        );

        AggregateSignal {
            overall,
            confidence: round_to(confidence, 1),
            breakdown,
            bullish_pct: round_to(bullish_pct, 1),
            bearish_pct: round_to(bearish_pct, 1),
        }
    }
}
