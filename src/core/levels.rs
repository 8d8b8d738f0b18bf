use crate::models::PriceSeries;

pub const LEVEL_LOOKBACK: usize = 20;
pub const LEVEL_SAMPLES: usize = 3;
pub const ATR_PERIOD: usize = 14;

/// Support = mean of the 3 lowest lows, resistance = mean of the 3 highest
/// highs, both within the last 20 bars. An empty series falls back to a
/// ±2% band around `current_price`.
pub fn support_resistance(series: &PriceSeries, current_price: f64) -> (f64, f64) {
    let window = series.tail(LEVEL_LOOKBACK);
    if window.is_empty() {
        return (current_price * 0.98, current_price * 1.02);
    }

    let mut lows: Vec<f64> = window.iter().map(|b| b.low).collect();
    let mut highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    lows.sort_by(f64::total_cmp);
    highs.sort_by(|a, b| b.total_cmp(a));

    let take = LEVEL_SAMPLES.min(window.len());
    let support = lows[..take].iter().sum::<f64>() / take as f64;
    let resistance = highs[..take].iter().sum::<f64>() / take as f64;
    (support, resistance)
}

/// Mean absolute high-low range over the last 14 bars (no gap component).
pub fn atr_proxy(series: &PriceSeries) -> f64 {
    let window = series.tail(ATR_PERIOD);
    if window.is_empty() {
        return 0.0;
    }
    window.iter().map(|b| b.range()).sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_bars;

    #[test]
    fn levels_from_extremes() {
        let s = make_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 15.0, 8.0, 14.0),
            (14.0, 14.5, 7.0, 13.0),
            (13.0, 20.0, 12.0, 19.0),
            (19.0, 19.5, 18.0, 18.5),
        ]);
        let (support, resistance) = support_resistance(&s, 18.5);
        assert!((support - 8.0).abs() < 1e-9); // (7 + 8 + 9) / 3
        assert!((resistance - (20.0 + 19.5 + 15.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn levels_with_fewer_bars_than_samples() {
        let s = make_bars(&[(10.0, 12.0, 9.0, 11.0), (11.0, 13.0, 10.0, 12.0)]);
        let (support, resistance) = support_resistance(&s, 12.0);
        assert!((support - 9.5).abs() < 1e-9);
        assert!((resistance - 12.5).abs() < 1e-9);
    }

    #[test]
    fn levels_only_consider_recent_bars() {
        let mut data = vec![(1.0, 1000.0, 0.1, 1.0)];
        data.extend((0..20).map(|_| (10.0, 11.0, 9.0, 10.0)));
        let s = make_bars(&data);
        let (support, resistance) = support_resistance(&s, 10.0);
        assert!((support - 9.0).abs() < 1e-9);
        assert!((resistance - 11.0).abs() < 1e-9);
    }

    #[test]
    fn atr_is_mean_range_of_last_fourteen() {
        let mut data = vec![(0.0, 100.0, 0.0, 50.0)];
        data.extend((0..14).map(|_| (10.0, 12.0, 9.0, 11.0)));
        let s = make_bars(&data);
        assert!((atr_proxy(&s) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn atr_on_short_series_uses_all_bars() {
        let s = make_bars(&[(10.0, 12.0, 9.0, 11.0), (11.0, 12.0, 11.0, 11.5)]);
        assert!((atr_proxy(&s) - 2.0).abs() < 1e-9);
        assert_eq!(atr_proxy(&PriceSeries::default()), 0.0);
    }
}
