use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::market::MarketData;
use crate::models::{PriceBar, Timeframe};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Chart API client. Responses are cached briefly per (ticker, interval,
/// range) so a scan and a signal pass in the same cycle share one request.
pub struct YahooClient {
    client: Client,
    base_url: String,
    cache: Mutex<HashMap<String, (Instant, Vec<PriceBar>)>>,
    cache_ttl: Duration,
}

impl YahooClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.market_data_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
            cache_ttl: Duration::from_secs(30),
        })
    }

    pub async fn fetch_chart(&self, ticker: &str, timeframe: Timeframe, range: &str) -> Result<Vec<PriceBar>> {
        let interval = timeframe.provider_interval();
        let cache_key = format!("{}_{}_{}", ticker, interval, range);
        if let Some((cached_at, bars)) = self.cache.lock().await.get(&cache_key) {
            if cached_at.elapsed() < self.cache_ttl {
                return Ok(bars.clone());
            }
        }

        let url = format!("{}/{}", self.base_url, ticker);
        debug!("Fetching chart: {} range={} interval={}", url, range, interval);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("range", range),
                ("interval", interval),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to fetch chart for {}", ticker))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Chart API error {} for {}: {}", status, ticker, body);
        }

        let data: ChartResponse = resp.json().await.context("Failed to parse chart response")?;
        let bars = parse_chart(data)?;

        self.cache
            .lock()
            .await
            .insert(cache_key, (Instant::now(), bars.clone()));

        Ok(bars)
    }
}

/// Zip the column arrays into bars. Points without a positive close are
/// skipped; a result with no timestamps is an empty history, not an error.
fn parse_chart(data: ChartResponse) -> Result<Vec<PriceBar>> {
    if let Some(err) = data.chart.error {
        anyhow::bail!("Chart API error: {} - {}", err.code, err.description);
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&closes, i).filter(|c| *c > 0.0)?;
            Some(PriceBar {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                open: at(&opens, i).unwrap_or(close),
                high: at(&highs, i).unwrap_or(close),
                low: at(&lows, i).unwrap_or(close),
                close,
                volume: at(&volumes, i).unwrap_or(0.0),
            })
        })
        .collect();

    Ok(bars)
}

#[async_trait]
impl MarketData for YahooClient {
    async fn fetch_bars(&self, ticker: &str, timeframe: Timeframe, range: &str) -> Result<Vec<PriceBar>> {
        self.fetch_chart(ticker, timeframe, range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<PriceBar>> {
        parse_chart(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn skips_points_without_close() {
        let bars = parse(
            r#"{"chart": {"result": [{
                "timestamp": [1705320000, 1705323600, 1705327200],
                "indicators": {"quote": [{
                    "open": [1.08, null, 1.09],
                    "high": [1.09, null, 1.10],
                    "low": [1.07, null, 1.085],
                    "close": [1.085, null, 1.095],
                    "volume": [0, null, 12]
                }]}
            }], "error": null}}"#,
        )
        .unwrap();
        assert_eq!(bars.len(), 2);
        assert!((bars[1].close - 1.095).abs() < 1e-12);
        assert!((bars[1].volume - 12.0).abs() < 1e-12);
    }

    #[test]
    fn empty_result_is_empty_history() {
        let bars = parse(r#"{"chart": {"result": [{"indicators": {"quote": [{}]}}], "error": null}}"#).unwrap();
        assert!(bars.is_empty());
        let bars = parse(r#"{"chart": {"result": null, "error": null}}"#).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn api_error_is_surfaced() {
        let err = parse(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("No data found"));
    }
}
