use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use market_signal_core::config::Config;
use market_signal_core::core::sessions::active_sessions;
use market_signal_core::market::MarketData;
use market_signal_core::strategies::{Signal, SignalEngine};

/// Periodic signal and scan pass. With `scan_interval_secs == 0` a single
/// pass runs and the loop exits.
pub struct SignalBot {
    cfg: Arc<Config>,
    engine: SignalEngine,
}

impl SignalBot {
    pub fn new(cfg: Arc<Config>, market: Arc<dyn MarketData>) -> Self {
        info!("{}", "=".repeat(60));
        info!("Market signal core starting up");
        info!(
            "Signals: {} instruments on {} ({})",
            cfg.signal_universe.len(),
            cfg.signal_timeframe,
            cfg.signal_range
        );
        info!("Watchlist: {} instruments", cfg.scan_watchlist.len());
        if cfg.scan_interval_secs > 0 {
            info!("Interval: {}s", cfg.scan_interval_secs);
        } else {
            info!("Interval: single pass");
        }
        info!("{}", "=".repeat(60));

        let engine = SignalEngine::new(market, Arc::clone(&cfg));
        Self { cfg, engine }
    }

    pub async fn run(&self) -> Result<()> {
        if self.cfg.scan_interval_secs == 0 {
            return self.tick().await;
        }

        info!("Running. Press Ctrl+C to stop.");
        let interval = Duration::from_secs(self.cfg.scan_interval_secs);
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    return Ok(());
                }
                res = async {
                    self.tick().await?;
                    tokio::time::sleep(interval).await;
                    anyhow::Ok(())
                } => res?,
            }
        }
    }

    async fn tick(&self) -> Result<()> {
        let sessions: Vec<String> = active_sessions(&self.cfg, None)
            .into_iter()
            .map(|s| s.name)
            .collect();
        info!("Sessions: {}", sessions.join(", "));

        let signals = self.engine.generate(&self.cfg.signal_universe).await;
        for s in &signals {
            log_signal(s);
        }
        let events = self.engine.scan(&self.cfg.scan_watchlist).await;
        for e in &events {
            info!(
                "{} ({}): {:?} at {} ({:+.2}%)",
                e.name, e.symbol, e.event_type, e.current_price, e.change_pct
            );
        }

        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "signals": signals,
            "events": events,
        }))?);
        Ok(())
    }
}

fn log_signal(s: &Signal) {
    info!(
        "{} {} @ {} | conf {}% {} | TP {} / {} / {} SL {} | RR {} | {} confirmations",
        s.action,
        s.symbol,
        s.price,
        s.confidence,
        s.quality,
        s.tp1,
        s.tp2,
        s.tp3,
        s.sl,
        s.risk_reward,
        s.confirmations
    );
}
