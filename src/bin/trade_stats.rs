use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use market_signal_core::config::Config;
use market_signal_core::models::AssetClass;
use market_signal_core::trading::{ClosedTrade, DailyRecap, TradeAnalyzer, TradeFilter};

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

    // trade_stats <trades.json> [asset]
    let args: Vec<String> = std::env::args().collect();
    let path = args
        .get(1)
        .context("usage: trade_stats <trades.json> [forex|crypto|metals|indices]")?;

    let raw = tokio::fs::read_to_string(Path::new(path))
        .await
        .with_context(|| format!("reading {}", path))?;
    let trades: Vec<ClosedTrade> =
        serde_json::from_str(&raw).with_context(|| format!("parsing trades in {}", path))?;
    info!("Loaded {} trades from {}", trades.len(), path);

    let trade_filter = match args.get(2) {
        Some(a) => Some(TradeFilter {
            asset_type: Some(
                AssetClass::from_str_loose(a).with_context(|| format!("unknown asset type '{}'", a))?,
            ),
            ..TradeFilter::default()
        }),
        None => None,
    };

    let analyzer = TradeAnalyzer::new(cfg.histogram_buckets);
    let report = analyzer.analyze(&trades, trade_filter.as_ref());
    report.print_summary();

    let recap = DailyRecap::for_date(&trades, Utc::now().date_naive());
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "statistics": report,
            "daily_recap": recap,
        }))?
    );

    Ok(())
}
