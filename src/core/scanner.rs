use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::indicators::sma;
use crate::core::{round2, round5};
use crate::models::{Instrument, PriceSeries};

const SCAN_LOOKBACK: usize = 20;
const LEVEL_PROXIMITY: f64 = 0.01;
const SIGNIFICANT_MOVE_PCT: f64 = 1.0;
const SMA_TOUCH_TOLERANCE: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketEventKind {
    ApproachingResistance,
    ApproachingSupport,
    SignificantMove,
    SmaTouch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    pub symbol: String,
    pub name: String,
    pub event_type: MarketEventKind,
    pub current_price: f64,
    pub change_pct: f64,
    pub high_20: f64,
    pub low_20: f64,
    pub sma_20: f64,
    pub timestamp: DateTime<Utc>,
}

/// Classify the latest bar against the last 20. Needs at least 20 bars;
/// the first matching condition wins.
pub fn detect_event(
    instrument: &Instrument,
    series: &PriceSeries,
    now: DateTime<Utc>,
) -> Option<MarketEvent> {
    if series.len() < SCAN_LOOKBACK {
        return None;
    }

    let window = series.tail(SCAN_LOOKBACK);
    let current = window.last()?.close;
    let prev_close = window[window.len() - 2].close;
    let high_20 = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low_20 = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let sma_20 = sma(&closes, SCAN_LOOKBACK)?;

    let change_pct = if prev_close != 0.0 {
        (current - prev_close) / prev_close * 100.0
    } else {
        0.0
    };

    let kind = if current >= high_20 * (1.0 - LEVEL_PROXIMITY) {
        MarketEventKind::ApproachingResistance
    } else if current <= low_20 * (1.0 + LEVEL_PROXIMITY) {
        MarketEventKind::ApproachingSupport
    } else if change_pct.abs() >= SIGNIFICANT_MOVE_PCT {
        MarketEventKind::SignificantMove
    } else if sma_20 != 0.0 && (current - sma_20).abs() / sma_20 < SMA_TOUCH_TOLERANCE {
        MarketEventKind::SmaTouch
    } else {
        return None;
    };

    Some(MarketEvent {
        symbol: instrument.ticker.clone(),
        name: instrument.name.clone(),
        event_type: kind,
        current_price: round5(current),
        change_pct: round2(change_pct),
        high_20: round5(high_20),
        low_20: round5(low_20),
        sma_20: round5(sma_20),
        timestamp: now,
    })
}
