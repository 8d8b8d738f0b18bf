use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn range(&self) -> f64 {
        (self.high - self.low).abs()
    }

    fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Ordered, gap-tolerant bar sequence for one instrument/timeframe pair.
///
/// Bars are ascending by timestamp with no duplicates. The series is never
/// mutated after construction; aggregation and slicing produce new values.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Normalize raw provider bars: drop bars with non-finite prices, sort
    /// ascending and collapse duplicate timestamps (the later bar wins).
    pub fn from_bars(mut bars: Vec<PriceBar>) -> Self {
        bars.retain(PriceBar::is_finite);
        // Stable sort keeps provider order among equal timestamps, so the
        // last occurrence is the most recent revision of that bucket.
        bars.sort_by_key(|b| b.timestamp);

        let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match out.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => out.push(bar),
            }
        }
        Self { bars: out }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The last `n` bars, or all of them when the series is shorter.
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceBar> {
        self.bars.iter()
    }

    pub fn as_slice(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs_max(&self) -> f64 {
        self.bars
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn lows_min(&self) -> f64 {
        self.bars
            .iter()
            .map(|b| b.low)
            .fold(f64::INFINITY, f64::min)
    }

    /// Aggregate into a coarser bucket. Timestamps are truncated to bucket
    /// boundaries; buckets without contributing bars are simply absent.
    pub fn aggregate(&self, bucket: Duration) -> PriceSeries {
        let bucket_secs = bucket.as_secs() as i64;
        if self.bars.is_empty() || bucket_secs <= 0 {
            return self.clone();
        }
        let mut result: Vec<PriceBar> = Vec::new();

        for bar in &self.bars {
            let ts = bar.timestamp.timestamp();
            let bucket_start = ts - ts.rem_euclid(bucket_secs);
            let bucket_ts = DateTime::from_timestamp(bucket_start, 0).unwrap_or(bar.timestamp);

            if let Some(last) = result.last_mut() {
                if last.timestamp == bucket_ts {
                    last.high = last.high.max(bar.high);
                    last.low = last.low.min(bar.low);
                    last.close = bar.close;
                    last.volume += bar.volume;
                    continue;
                }
            }

            result.push(PriceBar {
                timestamp: bucket_ts,
                ..bar.clone()
            });
        }

        PriceSeries { bars: result }
    }
}

impl std::ops::Index<usize> for PriceSeries {
    type Output = PriceBar;
    fn index(&self, index: usize) -> &Self::Output {
        &self.bars[index]
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;
    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bars = Vec::<PriceBar>::deserialize(deserializer)?;
        Ok(PriceSeries::from_bars(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bar_at, make_bars};

    #[test]
    fn bar_range() {
        let b = bar_at(0, 100.0, 115.0, 95.0, 110.0);
        assert!((b.range() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn from_bars_sorts_and_dedups() {
        let bars = vec![
            bar_at(120, 3.0, 3.0, 3.0, 3.0),
            bar_at(0, 1.0, 1.0, 1.0, 1.0),
            bar_at(60, 2.0, 2.0, 2.0, 2.0),
            bar_at(60, 2.5, 2.5, 2.5, 2.5),
        ];
        let s = PriceSeries::from_bars(bars);
        assert_eq!(s.len(), 3);
        assert_eq!(s.closes(), vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn from_bars_drops_non_finite() {
        let mut bad_volume = bar_at(120, 3.0, 3.0, 3.0, 3.0);
        bad_volume.volume = f64::NAN;
        let bars = vec![
            bar_at(0, 1.0, 1.0, 1.0, 1.0),
            bar_at(60, 2.0, 2.0, 2.0, f64::NAN),
            bad_volume,
        ];
        let s = PriceSeries::from_bars(bars);
        assert_eq!(s.len(), 1);
        let agg = s.aggregate(Duration::from_secs(300));
        assert!(agg[0].volume.is_finite());
    }

    #[test]
    fn empty_series_is_well_defined() {
        let s = PriceSeries::from_bars(Vec::new());
        assert!(s.is_empty());
        assert!(s.tail(20).is_empty());
        assert!(s.aggregate(Duration::from_secs(300)).is_empty());
    }

    #[test]
    fn tail_shorter_than_window() {
        let s = make_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
        ]);
        assert_eq!(s.tail(20).len(), 2);
        assert!((s.tail(1)[0].close - 106.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_1m_to_5m() {
        let data: Vec<(f64, f64, f64, f64)> = (0..10)
            .map(|i| {
                let v = 100.0 + i as f64;
                (v, v + 2.0, v - 1.0, v + 1.0)
            })
            .collect();
        let s = make_bars(&data);
        let agg = s.aggregate(Duration::from_secs(300));
        assert_eq!(agg.len(), 2);
        assert!((agg[0].open - 100.0).abs() < 1e-9);
        assert!((agg[0].close - 105.0).abs() < 1e-9);
        assert!((agg[0].high - 106.0).abs() < 1e-9);
        assert!((agg[0].low - 99.0).abs() < 1e-9);
        assert!((agg[0].volume - 500.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_drops_empty_buckets() {
        // bars at minute 0 and minute 20; 5m buckets in between have no bars
        let s = PriceSeries::from_bars(vec![
            bar_at(0, 1.0, 2.0, 0.5, 1.5),
            bar_at(20 * 60, 3.0, 4.0, 2.5, 3.5),
        ]);
        let agg = s.aggregate(Duration::from_secs(300));
        assert_eq!(agg.len(), 2);
        assert_eq!(
            (agg[1].timestamp - agg[0].timestamp).num_minutes(),
            20
        );
    }

    #[test]
    fn deserialize_normalizes() {
        let json = r#"[
            {"timestamp":"2024-01-15T12:01:00Z","open":2,"high":2,"low":2,"close":2,"volume":1},
            {"timestamp":"2024-01-15T12:00:00Z","open":1,"high":1,"low":1,"close":1,"volume":1}
        ]"#;
        let s: PriceSeries = serde_json::from_str(json).unwrap();
        assert_eq!(s.closes(), vec![1.0, 2.0]);
    }
}
