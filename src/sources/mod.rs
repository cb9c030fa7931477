pub mod coingecko;

pub use coingecko::CoinGeckoClient;

use crate::error::Result;
use crate::types::Series;
use dashmap::DashMap;

/// Supplies price histories to the synchronous core.
///
/// `Ok(None)` means the source has nothing for that window; callers treat it
/// as insufficient data rather than a failure.
pub trait PriceHistory: Send + Sync {
    fn historical_prices(&self, asset_id: &str, days: u32) -> Result<Option<Series>>;
}

/// Prefetched histories keyed by `(asset, days)`.
#[derive(Default)]
pub struct MemoryPriceHistory {
    series: DashMap<(String, u32), Series>,
}

impl MemoryPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, asset_id: &str, days: u32, series: Series) {
        self.series.insert((asset_id.to_lowercase(), days), series);
    }

    pub fn get(&self, asset_id: &str, days: u32) -> Option<Series> {
        self.series
            .get(&(asset_id.to_lowercase(), days))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl PriceHistory for MemoryPriceHistory {
    fn historical_prices(&self, asset_id: &str, days: u32) -> Result<Option<Series>> {
        Ok(self.get(asset_id, days))
    }
}
