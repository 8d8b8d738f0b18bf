use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::indicators::IndicatorSet;
use crate::core::scanner::{detect_event, MarketEvent};
use crate::error::CoreError;
use crate::market::{load_series, MarketData};
use crate::models::{Instrument, PriceSeries};
use crate::strategies::signals::Signal;

/// Batch driver: one task per instrument, failures isolated per instrument.
pub struct SignalEngine {
    market: Arc<dyn MarketData>,
    cfg: Arc<Config>,
}

impl SignalEngine {
    pub fn new(market: Arc<dyn MarketData>, cfg: Arc<Config>) -> Self {
        Self { market, cfg }
    }

    /// Fetch every instrument concurrently and hand each loaded series to `f`.
    /// Instruments whose fetch fails, returns no bars, or whose task panics
    /// are logged and left out. Results come back in completion order.
    async fn for_each_series<T, F>(&self, instruments: &[Instrument], label: &str, f: F) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(&Instrument, &PriceSeries) -> Option<T> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let mut tasks = JoinSet::new();

        for instrument in instruments.iter().cloned() {
            let market = Arc::clone(&self.market);
            let cfg = Arc::clone(&self.cfg);
            let f = Arc::clone(&f);
            tasks.spawn(async move {
                let loaded = load_series(
                    market.as_ref(),
                    &instrument.ticker,
                    cfg.signal_timeframe,
                    &cfg.signal_range,
                )
                .await;
                let out = loaded.map(|series| (*f)(&instrument, &series));
                (instrument, out)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Some(item)))) => results.push(item),
                Ok((instrument, Ok(None))) => {
                    debug!("{} {}: nothing to report", label, instrument.ticker);
                }
                Ok((instrument, Err(e @ CoreError::NoData { .. }))) => {
                    info!("{} {}: skipped, {}", label, instrument.ticker, e);
                }
                Ok((instrument, Err(e))) => {
                    warn!("{} {}: skipped, {}", label, instrument.ticker, e);
                }
                Err(e) => {
                    warn!("{} task failed: {}", label, e);
                }
            }
        }
        results
    }

    /// Signals for every instrument whose indicators reach confluence,
    /// sorted by ticker.
    pub async fn generate(&self, instruments: &[Instrument]) -> Vec<Signal> {
        let timeframe = self.cfg.signal_timeframe;
        let chart_height = self.cfg.chart_height;

        let mut signals = self
            .for_each_series(instruments, "signal", move |instrument, series| {
                let ind = IndicatorSet::compute(series, None);
                Signal::evaluate(instrument, timeframe, &ind, chart_height)
            })
            .await;

        signals.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        info!("Generated {} signals from {} instruments", signals.len(), instruments.len());
        signals
    }

    /// Market events for the watchlist, sorted by ticker.
    pub async fn scan(&self, instruments: &[Instrument]) -> Vec<MarketEvent> {
        let now = Utc::now();
        let mut events = self
            .for_each_series(instruments, "scan", move |instrument, series| {
                detect_event(instrument, series, now)
            })
            .await;

        events.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        info!("Scan found {} events across {} instruments", events.len(), instruments.len());
        events
    }
}
