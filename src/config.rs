use std::env;

const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_FEAR_GREED_API_URL: &str = "https://api.alternative.me/fng/?limit=1";

/// Application configuration, read from the environment.
///
/// Only the binary and the source clients read this. Indicator parameters
/// live in [`IndicatorSettings`] and are passed in explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// CoinGecko demo API key (optional).
    pub coingecko_api_key: Option<String>,
    /// CoinGecko REST base URL.
    pub coingecko_api_url: String,
    /// alternative.me Fear & Greed endpoint.
    pub fear_greed_api_url: String,
    /// Look-back windows (days) for multi-timeframe analysis.
    pub timeframes: Vec<u32>,
    /// Window (days) for the BTC correlation check.
    pub correlation_days: u32,
    /// Starting capital for equity curves.
    pub initial_capital: f64,
    /// Annual risk-free rate used by Sharpe/Sortino (0.02 = 2%).
    pub risk_free_rate: f64,
    /// How long fetched price series stay cached.
    pub series_cache_ttl_secs: u64,
    /// HTTP request timeout for source clients.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coingecko_api_key: None,
            coingecko_api_url: DEFAULT_COINGECKO_API_URL.to_string(),
            fear_greed_api_url: DEFAULT_FEAR_GREED_API_URL.to_string(),
            timeframes: vec![7, 30, 90],
            correlation_days: 30,
            initial_capital: 10_000.0,
            risk_free_rate: 0.0,
            series_cache_ttl_secs: 300,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Format: "7,30,90"
        let timeframes = env::var("ANALYSIS_TIMEFRAMES")
            .ok()
            .map(|s| parse_timeframes(&s))
            .filter(|t| !t.is_empty())
            .unwrap_or(defaults.timeframes);

        Self {
            coingecko_api_key: env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty()),
            coingecko_api_url: env::var("COINGECKO_API_URL")
                .unwrap_or(defaults.coingecko_api_url),
            fear_greed_api_url: env::var("FEAR_GREED_API_URL")
                .unwrap_or(defaults.fear_greed_api_url),
            timeframes,
            correlation_days: env::var("CORRELATION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.correlation_days),
            initial_capital: env::var("INITIAL_CAPITAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|c: &f64| c.is_finite() && *c > 0.0)
                .unwrap_or(defaults.initial_capital),
            risk_free_rate: env::var("RISK_FREE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|r: &f64| r.is_finite())
                .unwrap_or(defaults.risk_free_rate),
            series_cache_ttl_secs: env::var("SERIES_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.series_cache_ttl_secs),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

fn parse_timeframes(raw: &str) -> Vec<u32> {
    raw.split(',')
        .filter_map(|d| d.trim().parse::<u32>().ok())
        .filter(|d| *d > 0)
        .collect()
}

/// Window lengths and multipliers for the indicator battery.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub sma_periods: Vec<usize>,
    pub ema_periods: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub support_resistance_window: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub adx_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_periods: vec![20, 50, 200],
            ema_periods: vec![12, 26, 50],
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            support_resistance_window: 20,
            stochastic_k: 14,
            stochastic_d: 3,
            adx_period: 14,
            atr_period: 14,
        }
    }
}
