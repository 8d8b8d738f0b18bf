use chrono::{DateTime, Duration, Utc};

use crate::config::{default_scan_watchlist, default_sessions, default_signal_universe, Config};
use crate::core::indicators::IndicatorSet;
use crate::models::{AssetClass, PriceBar, PriceSeries, Timeframe, TradeDirection};
use crate::trading::trade_record::ClosedTrade;

pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A single bar `secs` seconds after the base time.
pub fn bar_at(secs: i64, o: f64, h: f64, l: f64, c: f64) -> PriceBar {
    PriceBar {
        timestamp: base_time() + Duration::seconds(secs),
        open: o,
        high: h,
        low: l,
        close: c,
        volume: 100.0,
    }
}

/// Create bars from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_bars(data: &[(f64, f64, f64, f64)]) -> PriceSeries {
    let bars = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| bar_at(i as i64 * 60, o, h, l, c))
        .collect();
    PriceSeries::from_bars(bars)
}

/// Flat bars where open = high = low = close.
pub fn make_closes(closes: &[f64]) -> PriceSeries {
    let data: Vec<(f64, f64, f64, f64)> = closes.iter().map(|&c| (c, c, c, c)).collect();
    make_bars(&data)
}

/// n bars with close = start + i * step and a small symmetric wick.
pub fn make_trending(n: usize, start: f64, step: f64) -> PriceSeries {
    let wick = step.abs().max(1e-6);
    let data: Vec<(f64, f64, f64, f64)> = (0..n)
        .map(|i| {
            let close = start + i as f64 * step;
            let open = close - step;
            (open, open.max(close) + wick, open.min(close) - wick, close)
        })
        .collect();
    make_bars(&data)
}

/// Indicator snapshot with only the fields the confluence rules read set
/// explicitly; levels sit ±5% around the price with a 1% ATR.
pub fn indicator_set(rsi: f64, price: f64, sma_20: f64, sma_50: f64, macd: f64) -> IndicatorSet {
    IndicatorSet {
        current_price: price,
        sma_20,
        sma_50,
        rsi,
        macd,
        bb_upper: price * 1.04,
        bb_lower: price * 0.96,
        support: price * 0.95,
        resistance: price * 1.05,
        atr: price * 0.01,
    }
}

/// A closed trade `hours` after the base time; outcome follows the PnL sign.
pub fn make_trade(asset: AssetClass, direction: TradeDirection, pnl: f64, hours: i64) -> ClosedTrade {
    let outcome = if pnl > 0.0 {
        "win"
    } else if pnl < 0.0 {
        "loss"
    } else {
        "breakeven"
    };
    ClosedTrade {
        id: format!("t{hours}"),
        symbol: match asset {
            AssetClass::Crypto => "BTC/USD".to_string(),
            AssetClass::Metals => "XAU/USD".to_string(),
            _ => "EUR/USD".to_string(),
        },
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
        created_at: base_time() + Duration::hours(hours),
    }
}

/// Closed forex buys from a PnL list, one hour apart.
pub fn make_trades(pnls: &[f64]) -> Vec<ClosedTrade> {
    pnls.iter()
        .enumerate()
        .map(|(i, &p)| make_trade(AssetClass::Forex, TradeDirection::Buy, p, i as i64))
        .collect()
}

pub fn open_trade(hours: i64) -> ClosedTrade {
    ClosedTrade {
        exit_price: None,
        pnl: None,
        outcome: None,
        ..make_trade(AssetClass::Forex, TradeDirection::Buy, 0.0, hours)
    }
}

/// A Config suitable for testing: default catalogs, single-pass scanner, quiet logs.
pub fn default_test_config() -> Config {
    Config {
        market_data_url: "http://127.0.0.1:9/chart".to_string(),
        http_timeout_secs: 1,
        market_data_file: None,
        signal_timeframe: Timeframe::H1,
        signal_range: "5d".to_string(),
        signal_universe: default_signal_universe(),
        scan_interval_secs: 0,
        scan_watchlist: default_scan_watchlist(),
        commentary_timeout_secs: 1,
        chart_height: 600.0,
        sessions: default_sessions(),
        histogram_buckets: 10,
        log_level: "ERROR".to_string(),
    }
}
