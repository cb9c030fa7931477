//! CoinGecko and fear & greed clients against a mock server

use augur::{AppError, CoinGeckoClient, Config};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        coingecko_api_url: server.uri(),
        fear_greed_api_url: format!("{}/fng/", server.uri()),
        ..Config::default()
    }
}

fn market_chart() -> serde_json::Value {
    json!({
        "prices": [
            [1704067200000u64, 2300.5],
            [1704153600000u64, 2350.0],
            [1704240000000u64, 2290.25]
        ],
        "market_caps": [],
        "total_volumes": [
            [1704067200000u64, 1.1e10],
            [1704153600000u64, 1.3e10],
            [1704240000000u64, 0.9e10]
        ]
    })
}

#[tokio::test]
async fn test_historical_prices_are_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/ethereum/market_chart"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(market_chart()))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoinGeckoClient::new(&config_for(&server));
    let series = client
        .historical_prices("ethereum", 30)
        .await
        .unwrap()
        .expect("series");
    assert_eq!(series.len(), 3);
    assert_eq!(series.prices(), vec![2300.5, 2350.0, 2290.25]);
    assert!(series.has_volume());

    // Second call is served from the series cache.
    let cached = client.historical_prices("Ethereum", 30).await.unwrap();
    assert_eq!(cached, Some(series));
    assert_eq!(client.cache().len(), 1);
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/market_chart"))
        .and(header("x-cg-demo-api-key", "demo-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(market_chart()))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        coingecko_api_key: Some("demo-key".to_string()),
        ..config_for(&server)
    };
    let series = CoinGeckoClient::new(&config)
        .historical_prices("bitcoin", 7)
        .await
        .unwrap();
    assert!(series.is_some());
}

#[tokio::test]
async fn test_server_error_is_external_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/solana/market_chart"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = CoinGeckoClient::new(&config_for(&server));
    let result = client.historical_prices("solana", 30).await;
    assert!(matches!(result, Err(AppError::ExternalApi(_))));
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_multibyte_error_body_is_logged_and_returned() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("augur=info")
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    // The 200th byte falls inside the first 'é'.
    let body = format!("{}\u{e9}t\u{e9} rate limited", "a".repeat(199));
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/cardano/market_chart"))
        .respond_with(ResponseTemplate::new(429).set_body_string(body))
        .mount(&server)
        .await;

    let client = CoinGeckoClient::new(&config_for(&server));
    let result = client.historical_prices("cardano", 30).await;
    assert!(matches!(result, Err(AppError::ExternalApi(_))));
}

#[tokio::test]
async fn test_empty_prices_are_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/unknown-coin/market_chart"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "prices": [], "total_volumes": [] })),
        )
        .mount(&server)
        .await;

    let client = CoinGeckoClient::new(&config_for(&server));
    assert_eq!(client.historical_prices("unknown-coin", 30).await.unwrap(), None);
}

#[tokio::test]
async fn test_fear_greed_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fng/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Fear and Greed Index",
            "data": [{
                "value": "25",
                "value_classification": "Extreme Fear",
                "timestamp": "1704067200"
            }]
        })))
        .mount(&server)
        .await;

    let reading = CoinGeckoClient::new(&config_for(&server))
        .fear_greed()
        .await
        .unwrap()
        .expect("reading");
    assert_eq!(reading.value, 25);
    assert_eq!(reading.classification, "Extreme Fear");
    assert_eq!(reading.timestamp.as_deref(), Some("1704067200"));
}

#[tokio::test]
async fn test_fear_greed_failures_are_none() {
    let server = MockServer::start().await;
    let client = CoinGeckoClient::new(&config_for(&server));

    Mock::given(method("GET"))
        .and(path("/fng/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    assert_eq!(client.fear_greed().await.unwrap(), None);

    Mock::given(method("GET"))
        .and(path("/fng/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "value": "250" }] })),
        )
        .mount(&server)
        .await;
    assert_eq!(client.fear_greed().await.unwrap(), None);
}
