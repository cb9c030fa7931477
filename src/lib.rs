//! Augur - technical indicator and signal aggregation engine for crypto assets

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use config::{Config, IndicatorSettings};
pub use error::{AppError, Result, SeriesError};
pub use services::{
    IndicatorEngine, MarketContext, PatternDetector, PerformanceCalculator, SeriesCache,
    SignalAggregator,
};
pub use sources::{CoinGeckoClient, MemoryPriceHistory, PriceHistory};
pub use types::*;
