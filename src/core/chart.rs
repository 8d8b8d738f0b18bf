use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{round2, round5};
use crate::models::{PriceBar, PriceSeries, Timeframe};

/// One bar as handed to charting consumers (prices rounded to 5 dp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<&PriceBar> for ChartBar {
    fn from(b: &PriceBar) -> Self {
        Self {
            time: b.timestamp,
            open: round5(b.open),
            high: round5(b.high),
            low: round5(b.low),
            close: round5(b.close),
            volume: b.volume,
        }
    }
}

pub fn chart_bars(bars: &[PriceBar]) -> Vec<ChartBar> {
    bars.iter().map(ChartBar::from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub data: Vec<ChartBar>,
    pub current_price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub period_high: f64,
    pub period_low: f64,
    pub volume: f64,
}

impl ChartSnapshot {
    /// `None` for an empty series; callers surface that as "no data".
    pub fn from_series(symbol: &str, timeframe: Timeframe, series: &PriceSeries) -> Option<Self> {
        let last = series.last()?;
        let current = last.close;
        let prev_close = series
            .len()
            .checked_sub(2)
            .and_then(|i| series.get(i))
            .map(|b| b.close)
            .unwrap_or(current);
        let change = current - prev_close;
        let change_pct = if prev_close != 0.0 {
            change / prev_close * 100.0
        } else {
            0.0
        };

        Some(Self {
            symbol: symbol.to_string(),
            timeframe,
            data: chart_bars(series.as_slice()),
            current_price: round5(current),
            change: round5(change),
            change_pct: round2(change_pct),
            period_high: round5(series.highs_max()),
            period_low: round5(series.lows_min()),
            volume: last.volume,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_bars;

    #[test]
    fn snapshot_change_and_extremes() {
        let s = make_bars(&[
            (100.0, 105.0, 95.0, 100.0),
            (100.0, 112.0, 99.0, 110.0),
        ]);
        let snap = ChartSnapshot::from_series("BTC-USD", Timeframe::H1, &s).unwrap();
        assert_eq!(snap.data.len(), 2);
        assert!((snap.change - 10.0).abs() < 1e-9);
        assert!((snap.change_pct - 10.0).abs() < 1e-9);
        assert!((snap.period_high - 112.0).abs() < 1e-9);
        assert!((snap.period_low - 95.0).abs() < 1e-9);
    }

    #[test]
    fn single_bar_has_zero_change() {
        let s = make_bars(&[(1.0, 1.0, 1.0, 1.0)]);
        let snap = ChartSnapshot::from_series("X", Timeframe::D1, &s).unwrap();
        assert_eq!(snap.change, 0.0);
        assert_eq!(snap.change_pct, 0.0);
    }

    #[test]
    fn zero_previous_close_does_not_divide() {
        let s = make_bars(&[(0.0, 0.0, 0.0, 0.0), (1.0, 1.0, 1.0, 1.0)]);
        let snap = ChartSnapshot::from_series("X", Timeframe::D1, &s).unwrap();
        assert_eq!(snap.change_pct, 0.0);
    }

    #[test]
    fn empty_series_has_no_snapshot() {
        assert!(ChartSnapshot::from_series("X", Timeframe::D1, &PriceSeries::default()).is_none());
    }
}
