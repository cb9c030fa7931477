use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::SeriesCache;
use crate::types::{FearGreedData, PricePoint, Series};
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// `/coins/{id}/market_chart` response: `[timestamp_ms, value]` pairs.
#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<[f64; 2]>,
    #[serde(default)]
    total_volumes: Vec<[f64; 2]>,
}

impl MarketChart {
    fn into_points(self) -> Vec<PricePoint> {
        let volumes: HashMap<i64, f64> = self
            .total_volumes
            .iter()
            .map(|[ts, volume]| (*ts as i64, *volume))
            .collect();

        self.prices
            .iter()
            .filter_map(|[ts, price]| {
                let ms = *ts as i64;
                let timestamp = Utc.timestamp_millis_opt(ms).single()?;
                Some(PricePoint {
                    timestamp,
                    price: *price,
                    volume: volumes.get(&ms).copied(),
                })
            })
            .collect()
    }
}

/// CoinGecko market-chart and alternative.me fear & greed client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    fear_greed_url: String,
    api_key: Option<String>,
    cache: Arc<SeriesCache>,
}

impl CoinGeckoClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .user_agent("Augur/0.1 (Crypto Technical Analysis)")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.coingecko_api_url.trim_end_matches('/').to_string(),
            fear_greed_url: config.fear_greed_api_url.clone(),
            api_key: config.coingecko_api_key.clone(),
            cache: Arc::new(SeriesCache::new(Duration::from_secs(
                config.series_cache_ttl_secs,
            ))),
        }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Daily (or finer, for short windows) USD prices and volumes.
    ///
    /// `Ok(None)` when CoinGecko returns no prices for the window.
    pub async fn historical_prices(&self, asset_id: &str, days: u32) -> Result<Option<Series>> {
        if let Some(series) = self.cache.get(asset_id, days) {
            debug!("Series cache hit for {} {}d", asset_id, days);
            return Ok(Some(series));
        }

        let url = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}",
            self.base_url, asset_id, days
        );

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(ref key) = self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "CoinGecko API returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::ExternalApi(format!(
                "CoinGecko API error for {}: {}",
                asset_id, status
            )));
        }

        let chart: MarketChart = response.json().await?;
        let points = chart.into_points();
        if points.is_empty() {
            info!("CoinGecko returned no prices for {} {}d", asset_id, days);
            return Ok(None);
        }

        let series = Series::new(points)?;
        debug!("Fetched {} points for {} {}d", series.len(), asset_id, days);
        self.cache.insert(asset_id, days, series.clone());
        Ok(Some(series))
    }

    /// Latest Fear & Greed reading; `None` when the index cannot be read.
    pub async fn fear_greed(&self) -> Result<Option<FearGreedData>> {
        match self.fetch_fear_greed().await {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                warn!("Failed to fetch Fear & Greed index: {}", e);
                Ok(None)
            }
        }
    }

    async fn fetch_fear_greed(&self) -> Result<FearGreedData> {
        let resp = self.client.get(&self.fear_greed_url).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Fear & Greed API error: {}",
                resp.status()
            )));
        }

        let text = resp.text().await?;
        let parsed: serde_json::Value = serde_json::from_str(&text)?;

        // { "data": [{ "value": "25", "value_classification": "Extreme Fear", "timestamp": "..." }] }
        let item = parsed
            .get("data")
            .and_then(|d| d.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| AppError::ExternalApi("Fear & Greed response has no data".into()))?;

        let value = item
            .get("value")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<u8>().ok())
            .filter(|v| *v <= 100)
            .ok_or_else(|| AppError::ExternalApi("Fear & Greed value missing or invalid".into()))?;

        Ok(FearGreedData {
            value,
            classification: item
                .get("value_classification")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string(),
            timestamp: item
                .get("timestamp")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        })
    }
}
