pub mod cache;
pub mod market_context;
pub mod performance;
pub mod signals;

pub use cache::SeriesCache;
pub use market_context::{MarketContext, BITCOIN_ID, DEFAULT_TIMEFRAMES};
pub use performance::{PerformanceCalculator, PROFIT_FACTOR_UNBOUNDED};
pub use signals::{IndicatorEngine, PatternDetector, SignalAggregator};
