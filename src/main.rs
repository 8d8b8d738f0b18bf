mod bot;

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use market_signal_core::analysis::{AnalysisRequest, AnalysisRunner, NoCommentator};
use market_signal_core::config::Config;
use market_signal_core::core::chart::ChartSnapshot;
use market_signal_core::core::sessions::active_sessions;
use market_signal_core::market::{load_series, MarketData, StaticMarketData, YahooClient};
use market_signal_core::models::{AssetClass, Timeframe};

use crate::bot::SignalBot;

const USAGE: &str = "usage: market-signal-core [signals | scan | sessions | analyze <TICKER> [TF] | chart <TICKER> [TF]]";

fn market_source(cfg: &Config) -> Result<Arc<dyn MarketData>> {
    match &cfg.market_data_file {
        Some(path) => {
            let source = StaticMarketData::from_file(Path::new(path))?;
            info!("Replaying {} tickers from {}", source.tickers().len(), path);
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(YahooClient::new(cfg)?)),
    }
}

fn timeframe_arg(arg: Option<&String>, default: Timeframe) -> Result<Timeframe> {
    match arg {
        Some(s) => Timeframe::from_str_loose(s).with_context(|| format!("unknown timeframe '{}'", s)),
        None => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("signals");

    match command {
        "signals" => {
            let market = market_source(&cfg)?;
            SignalBot::new(Arc::new(cfg), market).run().await?;
        }
        "scan" => {
            let market = market_source(&cfg)?;
            let engine = market_signal_core::strategies::SignalEngine::new(market, Arc::new(cfg.clone()));
            let events = engine.scan(&cfg.scan_watchlist).await;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        "sessions" => {
            println!("{}", serde_json::to_string_pretty(&active_sessions(&cfg, None))?);
        }
        "analyze" => {
            let ticker = args.get(2).context(USAGE)?;
            let timeframe = timeframe_arg(args.get(3), Timeframe::H1)?;
            let asset_type = cfg
                .signal_universe
                .iter()
                .chain(&cfg.scan_watchlist)
                .find(|i| &i.ticker == ticker)
                .map(|i| i.asset_type)
                .unwrap_or_default();

            let runner = AnalysisRunner::new(market_source(&cfg)?, Arc::new(NoCommentator), &cfg);
            let req = AnalysisRequest {
                asset_type,
                ..AnalysisRequest::new(ticker, timeframe)
            };
            let report = runner.run(&req).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "chart" => {
            let ticker = args.get(2).context(USAGE)?;
            let timeframe = timeframe_arg(args.get(3), Timeframe::H1)?;
            let market = market_source(&cfg)?;
            let series = load_series(market.as_ref(), ticker, timeframe, timeframe.default_range()).await?;
            let snapshot = ChartSnapshot::from_series(ticker, timeframe, &series)
                .with_context(|| format!("no chart data for {}", ticker))?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }

    Ok(())
}
