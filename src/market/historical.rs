use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::market::MarketData;
use crate::models::{PriceBar, Timeframe};

#[derive(Debug, Deserialize)]
struct RecordedSeries {
    ticker: String,
    timeframe: Timeframe,
    bars: Vec<PriceBar>,
}

/// A MarketData implementation that replays pre-loaded bars.
/// Unknown (ticker, timeframe) pairs yield no bars rather than an error,
/// which is what the provider does for a delisted or mistyped symbol.
#[derive(Debug, Default, Clone)]
pub struct StaticMarketData {
    data: HashMap<(String, Timeframe), Vec<PriceBar>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load bars for one ticker at one timeframe, replacing any previous set.
    pub fn load(&mut self, ticker: &str, tf: Timeframe, bars: Vec<PriceBar>) {
        self.data.insert((ticker.to_string(), tf), bars);
    }

    /// Parse a JSON array of `{ticker, timeframe, bars}` recordings.
    pub fn from_json(json: &str) -> Result<Self> {
        let recorded: Vec<RecordedSeries> =
            serde_json::from_str(json).context("Failed to parse recorded market data")?;
        let mut source = Self::new();
        for r in recorded {
            source.load(&r.ticker, r.timeframe, r.bars);
        }
        Ok(source)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.data.keys().map(|(t, _)| t.as_str()).collect();
        tickers.sort_unstable();
        tickers.dedup();
        tickers
    }
}

#[async_trait]
impl MarketData for StaticMarketData {
    async fn fetch_bars(&self, ticker: &str, timeframe: Timeframe, _range: &str) -> Result<Vec<PriceBar>> {
        Ok(self
            .data
            .get(&(ticker.to_string(), timeframe))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_from_json() {
        let json = r#"[
            {"ticker": "GC=F", "timeframe": "1d", "bars": [
                {"timestamp": "2024-01-16T00:00:00Z", "open": 2.0, "high": 3.0, "low": 1.5, "close": 2.5, "volume": 10.0},
                {"timestamp": "2024-01-15T00:00:00Z", "open": 1.0, "high": 2.0, "low": 0.5, "close": 2.0, "volume": 10.0}
            ]}
        ]"#;
        let source = StaticMarketData::from_json(json).unwrap();
        assert_eq!(source.tickers(), vec!["GC=F"]);

        let bars = source.fetch_bars("GC=F", Timeframe::D1, "6mo").await.unwrap();
        assert_eq!(bars.len(), 2);
        assert!(source.fetch_bars("GC=F", Timeframe::H1, "5d").await.unwrap().is_empty());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(StaticMarketData::from_json("{not json").is_err());
    }
}
