//! Market context over an in-memory price history

use augur::services::BITCOIN_ID;
use augur::{
    CorrelationDirection, CorrelationStrength, IndicatorEngine, MarketContext, MarketRegime,
    MemoryPriceHistory, PositionSizing, Series, TrendDirection,
};
use chrono::{TimeZone, Utc};

/// `len` daily closes growing 2% a day, with rising volumes.
fn growth_series(base: f64, len: usize) -> Series {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let prices: Vec<f64> = (0..len).map(|i| base * 1.02f64.powi(i as i32)).collect();
    let volumes: Vec<f64> = (0..len).map(|i| 10_000.0 + i as f64 * 250.0).collect();
    Series::daily(start, &prices, Some(&volumes)).unwrap()
}

fn seeded_history() -> MemoryPriceHistory {
    let history = MemoryPriceHistory::new();
    for days in [7, 30, 90] {
        history.insert("ethereum", days, growth_series(2_000.0, days as usize));
    }
    history.insert(BITCOIN_ID, 30, growth_series(40_000.0, 30));
    history
}

#[test]
fn test_timeframes_over_growth_history() {
    let history = seeded_history();
    let engine = IndicatorEngine::default();
    let context = MarketContext::new(&history, &engine);

    let report = context.analyze_multiple_timeframes("ethereum", &[7, 30, 90]);
    assert_eq!(report.timeframes.len(), 3);
    assert_eq!(report.alignment.total_timeframes, 3);
    assert!(
        report.alignment.bullish_timeframes
            + report.alignment.bearish_timeframes
            + report.alignment.neutral_timeframes
            <= 3
    );

    let labels: Vec<&str> = report.timeframes.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["7d", "30d", "90d"]);

    // Seven points are too few for a trend.
    let week = report.timeframes[0].analysis.ready().unwrap();
    assert_eq!(week.trend, TrendDirection::Unknown);
    assert!(week.volatility < 1e-9);

    for entry in &report.timeframes[1..] {
        let analysis = entry.analysis.ready().unwrap();
        assert_eq!(analysis.trend, TrendDirection::StrongUp);
        assert!(analysis.price_change_pct > 0.0);
        assert!(analysis.volatility < 1e-9);
        assert!(analysis.rsi.unwrap() > 70.0);
    }
}

#[test]
fn test_missing_timeframe_is_unavailable() {
    let history = seeded_history();
    let engine = IndicatorEngine::default();
    let context = MarketContext::new(&history, &engine);

    let report = context.analyze_multiple_timeframes("ethereum", &[30, 365]);
    assert!(report.timeframes[0].analysis.is_ready());
    assert_eq!(report.timeframes[1].analysis.error(), Some("No data available"));
    assert_eq!(report.alignment.total_timeframes, 1);
    assert_eq!(report.alignment.score, 0.0);
}

#[test]
fn test_correlation_with_bitcoin() {
    let history = seeded_history();
    let engine = IndicatorEngine::default();
    let context = MarketContext::new(&history, &engine);

    let correlation = context.analyze_btc_correlation("ethereum", 30);
    let report = correlation.ready().expect("correlation available");
    assert!((report.correlation - 1.0).abs() < 1e-9);
    assert_eq!(report.strength, CorrelationStrength::VeryStrong);
    assert_eq!(report.direction, Some(CorrelationDirection::Positive));
    assert_eq!(report.sample_size, 30);
    assert!(report.recommendation.starts_with("Highly correlated with BTC"));

    // No 90d bitcoin history seeded.
    let missing = context.analyze_btc_correlation("ethereum", 90);
    assert_eq!(
        missing.error(),
        Some("Unable to fetch data for correlation analysis")
    );
}

#[test]
fn test_comprehensive_context() {
    let history = seeded_history();
    let engine = IndicatorEngine::default();
    let context = MarketContext::new(&history, &engine).with_timeframes(vec![30, 90]);

    let report = context.comprehensive_context("ethereum", 30, Some(12));
    assert_eq!(report.asset_id, "ethereum");
    assert_eq!(report.timeframe_analysis.timeframes.len(), 2);
    assert!(report.btc_correlation.as_ref().unwrap().is_ready());
    assert_eq!(report.market_regime.regime, MarketRegime::ExtremeFear);
    assert_eq!(
        report.market_regime.position_sizing,
        Some(PositionSizing::Increase)
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["market_regime"]["regime"], "EXTREME_FEAR");
    assert_eq!(json["btc_correlation"]["strength"], "VERY_STRONG");
    assert_eq!(json["timeframe_analysis"]["timeframes"][0]["label"], "30d");
}

#[test]
fn test_bitcoin_context_omits_correlation() {
    let history = seeded_history();
    let engine = IndicatorEngine::default();
    let context = MarketContext::new(&history, &engine).with_timeframes(vec![30]);

    let report = context.comprehensive_context("bitcoin", 30, None);
    assert!(report.btc_correlation.is_none());
    assert_eq!(report.market_regime.regime, MarketRegime::Unknown);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("btc_correlation").is_none());
    assert_eq!(json["market_regime"]["fear_greed"], serde_json::Value::Null);
}
