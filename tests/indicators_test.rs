//! Indicator engine properties over randomized and synthetic series

use augur::services::signals::{all_indicators, evaluate};
use augur::{
    IndicatorEngine, IndicatorKind, IndicatorSettings, PricePoint, Series, SeriesError, Signal,
};
use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Geometric random walk with random volumes.
fn random_series(seed: u64, len: usize) -> Series {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0;
    let mut prices = Vec::with_capacity(len);
    let mut volumes = Vec::with_capacity(len);
    for _ in 0..len {
        price *= 1.0 + rng.gen_range(-0.05..0.05);
        prices.push(price);
        volumes.push(rng.gen_range(1_000.0..50_000.0));
    }
    Series::daily(start(), &prices, Some(&volumes)).unwrap()
}

fn in_percent_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

#[test]
fn test_oscillators_stay_in_bounds() {
    let engine = IndicatorEngine::default();
    for seed in 0..50 {
        let series = random_series(seed, 120);
        let map = engine.calculate_all(&series);

        let rsi = map.rsi().expect("rsi available");
        assert!(in_percent_range(rsi.value), "seed {} rsi {}", seed, rsi.value);

        let stoch = map.stochastic().expect("stochastic available");
        assert!(in_percent_range(stoch.k), "seed {} %K {}", seed, stoch.k);
        assert!(in_percent_range(stoch.d), "seed {} %D {}", seed, stoch.d);

        let frame = engine.frame(&series);
        for column in ["rsi", "stoch_k", "stoch_d"] {
            for value in frame.column(column).unwrap().iter().flatten() {
                assert!(in_percent_range(*value), "seed {} {} {}", seed, column, value);
            }
        }
    }
}

#[test]
fn test_calculate_all_is_idempotent() {
    let engine = IndicatorEngine::default();
    for seed in 0..10 {
        let series = random_series(seed, 250);
        let copy = series.clone();
        assert_eq!(engine.calculate_all(&series), engine.calculate_all(&series));
        assert_eq!(series, copy);
    }
}

#[test]
fn test_short_series_never_yields_numbers() {
    let settings = IndicatorSettings::default();
    for indicator in all_indicators(&settings) {
        for len in 1..indicator.min_periods() {
            let series = random_series(len as u64, len);
            let result = evaluate(indicator.as_ref(), &series).result;
            assert!(
                !result.is_available(),
                "{} returned data for {} points",
                indicator.name(),
                len
            );
            assert_eq!(result.kind(), indicator.kind());
        }
    }
}

#[test]
fn test_rsi_on_monotonic_uptrend() {
    let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    let series = Series::daily(start(), &prices, None).unwrap();
    let map = IndicatorEngine::default().calculate_all(&series);
    let rsi = map.rsi().unwrap();
    assert!(rsi.value > 70.0 && rsi.value <= 100.0);
    assert_eq!(rsi.signal, Signal::Overbought);
    assert!(rsi.overbought);
}

#[test]
fn test_full_history_reports_golden_cross_only_on_crossing() {
    // 150 falling days then a sharp rally; SMA-50 overtakes SMA-200 once.
    let mut prices: Vec<f64> = (0..150).map(|i| 300.0 - i as f64).collect();
    prices.extend((0..150).map(|i| 150.0 + i as f64 * 3.0));
    let engine = IndicatorEngine::default();

    let mut crossings = 0;
    for end in 201..=prices.len() {
        let series = Series::daily(start(), &prices[..end], None).unwrap();
        let map = engine.calculate_all(&series);
        let cross = map.sma().unwrap().cross.clone().unwrap();
        assert!(!(cross.golden_cross && cross.death_cross));
        if cross.golden_cross {
            crossings += 1;
        }
    }
    assert_eq!(crossings, 1);
}

#[test]
fn test_every_kind_is_keyed() {
    let map = IndicatorEngine::default().calculate_all(&random_series(7, 60));
    let kinds: Vec<IndicatorKind> = map.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, IndicatorKind::ALL.to_vec());
}

#[test]
fn test_series_rejects_malformed_input() {
    assert_eq!(Series::new(Vec::new()), Err(SeriesError::Empty));

    let bad_price = vec![
        PricePoint::new(start(), 1.0),
        PricePoint::new(start() + Duration::days(1), -2.0),
    ];
    assert!(matches!(
        Series::new(bad_price),
        Err(SeriesError::InvalidPrice { index: 1, .. })
    ));

    let nan = vec![PricePoint::new(start(), f64::NAN)];
    assert!(matches!(Series::new(nan), Err(SeriesError::InvalidPrice { index: 0, .. })));

    let bad_volume = vec![PricePoint::with_volume(start(), 1.0, -5.0)];
    assert!(matches!(
        Series::new(bad_volume),
        Err(SeriesError::InvalidVolume { index: 0, .. })
    ));
}

#[test]
fn test_series_sorts_and_keeps_last_duplicate() {
    let t0 = start();
    let t1 = t0 + Duration::days(1);
    let series = Series::new(vec![
        PricePoint::new(t1, 3.0),
        PricePoint::new(t0, 1.0),
        PricePoint::new(t1, 4.0),
    ])
    .unwrap();
    assert_eq!(series.prices(), vec![1.0, 4.0]);
    assert_eq!(series.timestamps(), vec![t0, t1]);
}
