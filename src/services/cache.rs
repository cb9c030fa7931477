use crate::types::Series;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Cache key: asset id and look-back window in days.
pub type SeriesKey = (String, u32);

/// Thread-safe TTL cache of fetched price histories.
pub struct SeriesCache {
    data: DashMap<SeriesKey, CachedSeries>,
    ttl: Duration,
}

struct CachedSeries {
    series: Series,
    fetched_at: Instant,
}

impl CachedSeries {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: DashMap::new(),
            ttl,
        }
    }

    fn key(asset_id: &str, days: u32) -> SeriesKey {
        (asset_id.to_lowercase(), days)
    }

    /// Cached series, if present and younger than the TTL.
    pub fn get(&self, asset_id: &str, days: u32) -> Option<Series> {
        let key = Self::key(asset_id, days);
        let entry = self.data.get(&key)?;
        if entry.is_fresh(self.ttl) {
            Some(entry.series.clone())
        } else {
            drop(entry);
            self.data.remove(&key);
            None
        }
    }

    pub fn insert(&self, asset_id: &str, days: u32, series: Series) {
        self.data.insert(
            Self::key(asset_id, days),
            CachedSeries {
                series,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn contains(&self, asset_id: &str, days: u32) -> bool {
        self.get(asset_id, days).is_some()
    }

    pub fn remove(&self, asset_id: &str, days: u32) -> Option<Series> {
        self.data
            .remove(&Self::key(asset_id, days))
            .map(|(_, entry)| entry.series)
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Drop every stale entry.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.data.retain(|_, entry| entry.is_fresh(ttl));
    }

    /// Number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_series(last: f64) -> Series {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Series::daily(start, &[100.0, last], None).unwrap()
    }

    #[test]
    fn test_cache_basic() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        cache.insert("bitcoin", 30, create_series(110.0));
        assert_eq!(cache.get("bitcoin", 30), Some(create_series(110.0)));
        assert_eq!(cache.get("bitcoin", 7), None);
        assert_eq!(cache.get("ethereum", 30), None);
    }

    #[test]
    fn test_asset_id_is_case_insensitive() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        cache.insert("Bitcoin", 30, create_series(110.0));
        assert!(cache.contains("bitcoin", 30));
    }

    #[test]
    fn test_cache_expiration() {
        let cache = SeriesCache::new(Duration::from_millis(10));
        cache.insert("bitcoin", 30, create_series(110.0));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("bitcoin", 30), None);
        // Expired reads evict.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_cleanup() {
        let cache = SeriesCache::new(Duration::from_millis(10));
        cache.insert("bitcoin", 30, create_series(110.0));
        cache.insert("ethereum", 30, create_series(120.0));
        assert_eq!(cache.len(), 2);

        std::thread::sleep(Duration::from_millis(20));
        cache.cleanup();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_overwrite_and_remove() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        cache.insert("bitcoin", 30, create_series(110.0));
        cache.insert("bitcoin", 30, create_series(90.0));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.remove("bitcoin", 30), Some(create_series(90.0)));
        assert_eq!(cache.remove("bitcoin", 30), None);

        cache.insert("bitcoin", 7, create_series(110.0));
        cache.clear();
        assert!(cache.is_empty());
    }
}
