use chrono::{DateTime, Duration, Utc};
use market_signal_core::models::{AssetClass, PriceBar, TradeDirection};
use market_signal_core::trading::ClosedTrade;

pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// n hourly bars with close = start + i * step.
pub fn trending_bars(n: usize, start: f64, step: f64) -> Vec<PriceBar> {
    let wick = step.abs().max(1e-6);
    (0..n)
        .map(|i| {
            let close = start + i as f64 * step;
            let open = close - step;
            PriceBar {
                timestamp: base_time() + Duration::hours(i as i64),
                open,
                high: open.max(close) + wick,
                low: open.min(close) - wick,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// n hourly bars that wobble around `level` without trending.
pub fn ranging_bars(n: usize, level: f64) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let close = if i % 2 == 0 { level * 1.001 } else { level * 0.999 };
            PriceBar {
                timestamp: base_time() + Duration::hours(i as i64),
                open: level,
                high: level * 1.05,
                low: level * 0.95,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

pub fn trade(symbol: &str, asset: AssetClass, direction: TradeDirection, pnl: f64, day: i64) -> ClosedTrade {
    let outcome = if pnl > 0.0 {
        "win"
    } else if pnl < 0.0 {
        "loss"
    } else {
        "breakeven"
    };
    ClosedTrade {
        id: format!("{symbol}-{day}"),
        symbol: symbol.to_string(),
        asset_type: asset,
        direction,
        entry_price: 100.0,
        exit_price: Some(100.0 + pnl),
        position_size: 1.0,
        stop_loss: Some(98.0),
        take_profit: Some(104.0),
        pnl: Some(pnl),
        outcome: Some(outcome.to_string()),
        timeframe: "1h".to_string(),
        created_at: base_time() + Duration::days(day),
    }
}
