//! Technical analysis service module.
//!
//! Computes the indicator battery over a price series, detects price and
//! chart patterns, and fuses everything into one weighted verdict.

pub mod aggregator;
pub mod indicators;
pub mod patterns;

pub use aggregator::{points_for, SignalAggregator, Side, VoteSource, VOTE_WEIGHTS};
pub use indicators::all_indicators;
pub use patterns::PatternDetector;

use crate::config::IndicatorSettings;
use crate::types::{
    IndicatorFrame, IndicatorKind, IndicatorMap, IndicatorResult, Series, TechnicalAnalysis,
};
use tracing::debug;

/// Output of a single indicator pass: the summary result plus any derived
/// columns, index-aligned with the input series.
#[derive(Debug, Clone)]
pub struct Computation {
    pub result: IndicatorResult,
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl Computation {
    pub fn new(result: IndicatorResult) -> Self {
        Self {
            result,
            columns: Vec::new(),
        }
    }

    pub fn unavailable(kind: IndicatorKind, error: impl Into<String>) -> Self {
        Self::new(IndicatorResult::unavailable(kind, error))
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.push((name.into(), values));
        self
    }
}

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Which result variant this indicator produces.
    fn kind(&self) -> IndicatorKind;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Minimum number of samples required for calculation.
    fn min_periods(&self) -> usize;

    /// Whether every point must carry a volume.
    fn requires_volume(&self) -> bool {
        false
    }

    /// Calculate from the series. Only called once the length and volume
    /// requirements hold.
    fn compute(&self, series: &Series) -> Computation;
}

/// Run one indicator, turning unmet requirements into an unavailable result.
pub fn evaluate(indicator: &dyn Indicator, series: &Series) -> Computation {
    if indicator.requires_volume() && !series.has_volume() {
        return Computation::unavailable(
            indicator.kind(),
            format!("Volume data not available for {}", indicator.name()),
        );
    }

    if series.len() < indicator.min_periods() {
        return Computation::unavailable(
            indicator.kind(),
            format!(
                "Insufficient data for {} (need {}+ data points)",
                indicator.name(),
                indicator.min_periods()
            ),
        );
    }

    indicator.compute(series)
}

/// Stateless indicator battery. Every call is a pure function of the
/// series it is given.
pub struct IndicatorEngine {
    settings: IndicatorSettings,
    indicators: Vec<Box<dyn Indicator>>,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(IndicatorSettings::default())
    }
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        let indicators = all_indicators(&settings);
        Self {
            settings,
            indicators,
        }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    fn run(&self, series: &Series) -> Vec<Computation> {
        self.indicators
            .iter()
            .map(|indicator| {
                let computation = evaluate(indicator.as_ref(), series);
                if let Some(error) = computation.result.error() {
                    debug!("{} unavailable: {}", indicator.name(), error);
                }
                computation
            })
            .collect()
    }

    /// Compute every indicator over the series.
    pub fn calculate_all(&self, series: &Series) -> IndicatorMap {
        self.run(series).into_iter().map(|c| c.result).collect()
    }

    /// The series with every indicator's derived columns merged by index.
    pub fn frame(&self, series: &Series) -> IndicatorFrame {
        let mut frame = IndicatorFrame::from_series(series);
        for computation in self.run(series) {
            for (name, values) in computation.columns {
                frame.insert_column(name, values);
            }
        }
        frame
    }

    /// Indicators plus the aggregated verdict.
    pub fn analyze(&self, series: &Series) -> TechnicalAnalysis {
        let indicators = self.calculate_all(series);
        let signals = SignalAggregator::generate_signals(&indicators);
        debug!(
            "Analysis over {} points: {} ({:.1}%)",
            series.len(),
            signals.overall,
            signals.confidence
        );
        TechnicalAnalysis {
            indicators,
            signals,
        }
    }
}
