use augur::services::market_context::market_regime;
use augur::services::BITCOIN_ID;
use augur::{
    ClosedTrade, CoinGeckoClient, Config, IndicatorEngine, MarketContext, MemoryPriceHistory,
    PerformanceCalculator,
};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Usage:
  augur analyze <asset> [days]
  augur timeframes <asset>
  augur correlation <asset> [days]
  augur context <asset> [days]
  augur regime [value]
  augur performance <trades.json> [initial_capital]";

const DEFAULT_ANALYSIS_DAYS: u32 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        anyhow::bail!("{}", USAGE);
    };

    match command.as_str() {
        "analyze" => {
            let asset = required(&args, 1)?;
            let days = optional(&args, 2)?.unwrap_or(DEFAULT_ANALYSIS_DAYS);
            let client = CoinGeckoClient::new(&config);
            let Some(series) = client.historical_prices(asset, days).await? else {
                anyhow::bail!("No price data for {} over {} days", asset, days);
            };
            info!("Analyzing {} points for {}", series.len(), asset);
            print_json(&IndicatorEngine::default().analyze(&series))?;
        }
        "timeframes" => {
            let asset = required(&args, 1)?;
            let client = CoinGeckoClient::new(&config);
            let requests: Vec<(&str, u32)> =
                config.timeframes.iter().map(|&d| (asset, d)).collect();
            let history = prefetch(&client, &requests).await;
            let engine = IndicatorEngine::default();
            let context = MarketContext::new(&history, &engine);
            print_json(&context.analyze_multiple_timeframes(asset, &config.timeframes))?;
        }
        "correlation" => {
            let asset = required(&args, 1)?;
            let days = optional(&args, 2)?.unwrap_or(config.correlation_days);
            let client = CoinGeckoClient::new(&config);
            let history = prefetch(&client, &[(asset, days), (BITCOIN_ID, days)]).await;
            let engine = IndicatorEngine::default();
            let context = MarketContext::new(&history, &engine);
            print_json(&context.analyze_btc_correlation(asset, days))?;
        }
        "context" => {
            let asset = required(&args, 1)?;
            let days = optional(&args, 2)?.unwrap_or(config.correlation_days);
            let client = CoinGeckoClient::new(&config);

            let mut requests: Vec<(&str, u32)> =
                config.timeframes.iter().map(|&d| (asset, d)).collect();
            requests.push((asset, days));
            requests.push((BITCOIN_ID, days));
            let (history, fear_greed) =
                tokio::join!(prefetch(&client, &requests), client.fear_greed());

            let engine = IndicatorEngine::default();
            let context =
                MarketContext::new(&history, &engine).with_timeframes(config.timeframes.clone());
            let fear_greed = fear_greed?.map(|f| f.value);
            print_json(&context.comprehensive_context(asset, days, fear_greed))?;
        }
        "regime" => {
            let value = match optional::<u8>(&args, 1)? {
                Some(value) => Some(value),
                None => CoinGeckoClient::new(&config)
                    .fear_greed()
                    .await?
                    .map(|f| f.value),
            };
            print_json(&market_regime(value))?;
        }
        "performance" => {
            let path = required(&args, 1)?;
            let capital = optional(&args, 2)?.unwrap_or(config.initial_capital);
            let raw = tokio::fs::read_to_string(path).await?;
            let trades: Vec<ClosedTrade> = serde_json::from_str(&raw)?;
            info!("Loaded {} closed trades from {}", trades.len(), path);

            let curve = PerformanceCalculator::build_equity_curve(&trades, capital);
            print_json(&json!({
                "metrics": PerformanceCalculator::comprehensive_metrics(
                    &trades,
                    capital,
                    config.risk_free_rate,
                ),
                "drawdown": PerformanceCalculator::max_drawdown_of_curve(&curve),
                "equityCurve": curve,
            }))?;
        }
        other => anyhow::bail!("Unknown command '{}'\n{}", other, USAGE),
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize) -> anyhow::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing argument\n{}", USAGE))
}

fn optional<T: std::str::FromStr>(args: &[String], index: usize) -> anyhow::Result<Option<T>> {
    args.get(index)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| anyhow::anyhow!("Invalid argument '{}'\n{}", raw, USAGE))
        })
        .transpose()
}

/// Fetch every `(asset, days)` window concurrently into an in-memory history.
async fn prefetch(client: &CoinGeckoClient, requests: &[(&str, u32)]) -> MemoryPriceHistory {
    let history = MemoryPriceHistory::new();
    let fetches = requests.iter().map(|&(asset, days)| async move {
        (asset, days, client.historical_prices(asset, days).await)
    });

    for (asset, days, result) in join_all(fetches).await {
        match result {
            Ok(Some(series)) => history.insert(asset, days, series),
            Ok(None) => warn!("No price data for {} {}d", asset, days),
            Err(e) => warn!("Failed to fetch {} {}d: {}", asset, days, e),
        }
    }
    history
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
