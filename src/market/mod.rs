pub mod historical;
pub mod yahoo;

pub use historical::StaticMarketData;
pub use yahoo::YahooClient;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::error::CoreError;
use crate::models::{PriceBar, PriceSeries, Timeframe};

/// Source of raw OHLCV bars. Takes `&self` so one client can serve many
/// concurrent fetches.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Bars for `ticker` at the provider-native `timeframe` over `range`
    /// (e.g. "5d", "1mo"). An unknown ticker may legitimately yield no bars.
    async fn fetch_bars(&self, ticker: &str, timeframe: Timeframe, range: &str) -> Result<Vec<PriceBar>>;
}

/// Normalize provider bars into a series; an empty result is `NoData`.
pub fn ingest(ticker: &str, timeframe: Timeframe, bars: Vec<PriceBar>) -> Result<PriceSeries, CoreError> {
    let series = PriceSeries::from_bars(bars);
    if series.is_empty() {
        return Err(CoreError::NoData {
            ticker: ticker.to_string(),
            timeframe,
        });
    }
    Ok(series)
}

/// Fetch at the native timeframe and aggregate when the requested one is synthetic.
pub async fn load_series(
    source: &dyn MarketData,
    ticker: &str,
    timeframe: Timeframe,
    range: &str,
) -> Result<PriceSeries, CoreError> {
    let native = timeframe.native();
    let bars = source
        .fetch_bars(ticker, native, range)
        .await
        .map_err(|e| CoreError::Upstream(format!("{ticker}: {e:#}")))?;

    let series = ingest(ticker, timeframe, bars)?;
    if !timeframe.needs_aggregation() {
        return Ok(series);
    }

    let aggregated = series.aggregate(timeframe.as_duration());
    debug!(
        "{} aggregated {} {} bars into {} {} bars",
        ticker,
        series.len(),
        native,
        aggregated.len(),
        timeframe
    );
    Ok(aggregated)
}
