//! Moving averages, oscillators and bands over a closing-price slice.
//!
//! Every function tolerates inputs shorter than its nominal window by using
//! what is available, and returns a defined value for an empty slice.
//! RSI uses plain sums over the last 14 deltas instead of Wilder smoothing,
//! and MACD is the difference of two simple averages rather than two EMAs.

use serde::{Deserialize, Serialize};

use crate::core::levels::{atr_proxy, support_resistance};
use crate::core::{round2, round5};
use crate::models::PriceSeries;

pub const SMA_FAST: usize = 20;
pub const SMA_SLOW: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// Used in place of an empty gain or loss side so the ratio stays finite.
const RSI_FLOOR: f64 = 0.001;
const RSI_NEUTRAL: f64 = 50.0;

fn last_n(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean of the last `min(window, len)` values; `None` for an empty slice.
pub fn sma(closes: &[f64], window: usize) -> Option<f64> {
    mean(last_n(closes, window.max(1)))
}

pub fn rsi(closes: &[f64]) -> f64 {
    let window = last_n(closes, RSI_PERIOD + 1);
    if window.len() < 2 {
        return RSI_NEUTRAL;
    }

    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), diff| {
            if diff > 0.0 {
                (g + diff, l)
            } else if diff < 0.0 {
                (g, l - diff)
            } else {
                (g, l)
            }
        });

    let avg_gain = if gains > 0.0 { gains / RSI_PERIOD as f64 } else { RSI_FLOOR };
    let avg_loss = if losses > 0.0 { losses / RSI_PERIOD as f64 } else { RSI_FLOOR };

    let value = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
    if !value.is_finite() {
        return RSI_NEUTRAL;
    }
    value.clamp(0.0, 100.0)
}

pub fn macd_proxy(closes: &[f64]) -> f64 {
    match (sma(closes, MACD_FAST), sma(closes, MACD_SLOW)) {
        (Some(fast), Some(slow)) => fast - slow,
        _ => 0.0,
    }
}

/// (upper, middle, lower) using population standard deviation.
pub fn bollinger(closes: &[f64], period: usize, width: f64) -> Option<(f64, f64, f64)> {
    let window = last_n(closes, period.max(1));
    let mid = mean(window)?;
    let variance = window.iter().map(|x| (x - mid).powi(2)).sum::<f64>() / window.len() as f64;
    let std = variance.sqrt();
    Some((mid + width * std, mid, mid - width * std))
}

/// Full-precision indicator snapshot for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub current_price: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub rsi: f64,
    pub macd: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub support: f64,
    pub resistance: f64,
    pub atr: f64,
}

impl IndicatorSet {
    /// `price_override` replaces the last close as the current price, which
    /// is also the flat fallback for every average when the series is empty.
    pub fn compute(series: &PriceSeries, price_override: Option<f64>) -> Self {
        let closes = series.closes();
        let current_price = price_override
            .or_else(|| series.last().map(|b| b.close))
            .unwrap_or(0.0);

        let sma_20 = sma(&closes, SMA_FAST).unwrap_or(current_price);
        let sma_50 = sma(&closes, SMA_SLOW).unwrap_or(current_price);
        let (bb_upper, _, bb_lower) = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH)
            .unwrap_or((current_price, current_price, current_price));
        let (support, resistance) = support_resistance(series, current_price);

        Self {
            current_price,
            sma_20,
            sma_50,
            rsi: rsi(&closes),
            macd: macd_proxy(&closes),
            bb_upper,
            bb_lower,
            support,
            resistance,
            atr: atr_proxy(series),
        }
    }

    pub fn rsi_is_extreme(&self) -> bool {
        self.rsi < 30.0 || self.rsi > 70.0
    }

    /// Rounded copy for the output boundary.
    pub fn report(&self) -> IndicatorReport {
        IndicatorReport {
            rsi: round2(self.rsi),
            macd: round5(self.macd),
            sma_20: round5(self.sma_20),
            sma_50: round5(self.sma_50),
            bb_upper: round5(self.bb_upper),
            bb_lower: round5(self.bb_lower),
            support: round5(self.support),
            resistance: round5(self.resistance),
            atr: round5(self.atr),
            current_price: round5(self.current_price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub rsi: f64,
    pub macd: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub support: f64,
    pub resistance: f64,
    pub atr: f64,
    pub current_price: f64,
}
