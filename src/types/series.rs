use crate::error::SeriesError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            volume: None,
        }
    }

    pub fn with_volume(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume: Some(volume),
        }
    }
}

/// A validated, timestamp-ascending price series.
///
/// Construction sorts the points, drops duplicate timestamps (the point
/// supplied later wins) and rejects non-positive or non-finite prices.
/// A `Series` is never empty and is never mutated after construction;
/// indicators borrow it read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }

        for (index, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(SeriesError::InvalidPrice {
                    index,
                    price: point.price,
                });
            }
            if let Some(volume) = point.volume {
                if !volume.is_finite() || volume < 0.0 {
                    return Err(SeriesError::InvalidVolume { index, volume });
                }
            }
        }

        // Stable sort keeps supply order among equal timestamps.
        let mut sorted = points;
        sorted.sort_by_key(|p| p.timestamp);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(sorted.len());
        for point in sorted {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }

        Ok(Self { points: deduped })
    }

    /// Build a daily-spaced series starting at `start`.
    ///
    /// `volumes`, when given, must be the same length as `prices`; extra or
    /// missing entries leave the corresponding points without volume.
    pub fn daily(
        start: DateTime<Utc>,
        prices: &[f64],
        volumes: Option<&[f64]>,
    ) -> Result<Self, SeriesError> {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                price,
                volume: volumes.and_then(|v| v.get(i).copied()),
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Volumes, only when every point carries one.
    pub fn volumes(&self) -> Option<Vec<f64>> {
        self.points.iter().map(|p| p.volume).collect()
    }

    pub fn has_volume(&self) -> bool {
        self.points.iter().all(|p| p.volume.is_some())
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn first_price(&self) -> f64 {
        self.points.first().map(|p| p.price).unwrap_or_default()
    }

    pub fn last_price(&self) -> f64 {
        self.points.last().map(|p| p.price).unwrap_or_default()
    }
}

/// The series plus every indicator's derived columns, index-aligned, for
/// charting consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<f64>>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorFrame {
    pub fn from_series(series: &Series) -> Self {
        Self {
            timestamps: series.timestamps(),
            prices: series.prices(),
            volumes: series.volumes(),
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    /// Merge a derived column. Columns of the wrong length are ignored.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> bool {
        if values.len() != self.prices.len() {
            return false;
        }
        self.columns.insert(name.into(), values);
        true
    }
}
