//! Ordered confluence rules folded into a single directional call.
//!
//! Rules run in a fixed order against one [`IndicatorSet`]. Each may add
//! confirmations and a reason; only a rule that finds the bias still at
//! HOLD may set it, so the earliest rule to decide a direction wins.

use serde::{Deserialize, Serialize};

use crate::core::indicators::IndicatorSet;
use crate::models::{Bias, QualityGrade, RiskLevel};

pub const MIN_CONFIRMATIONS: u32 = 2;
pub const MAX_CONFIDENCE: u32 = 95;
const BASE_CONFIDENCE: u32 = 50;
const CONFIDENCE_PER_CONFIRMATION: u32 = 10;
const EXTREME_RSI_BONUS: u32 = 10;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_LEAN_BEARISH: f64 = 45.0;
const RSI_LEAN_BULLISH: f64 = 55.0;
const RSI_DEEP_OVERSOLD: f64 = 25.0;
const RSI_DEEP_OVERBOUGHT: f64 = 75.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confluence {
    pub bias: Bias,
    pub confirmations: u32,
    pub reasons: Vec<String>,
}

impl Confluence {
    fn confirm(mut self, points: u32, direction: Bias, reason: String) -> Self {
        self.confirmations += points;
        self.reasons.push(reason);
        if self.bias == Bias::Hold {
            self.bias = direction;
        }
        self
    }

    /// A signal is only emitted for a decided bias with enough agreement.
    pub fn is_actionable(&self) -> bool {
        self.bias.is_decided() && self.confirmations >= MIN_CONFIRMATIONS
    }

    pub fn confidence(&self, rsi: f64) -> u32 {
        let base = (BASE_CONFIDENCE + self.confirmations * CONFIDENCE_PER_CONFIRMATION).min(MAX_CONFIDENCE);
        if rsi < RSI_DEEP_OVERSOLD || rsi > RSI_DEEP_OVERBOUGHT {
            (base + EXTREME_RSI_BONUS).min(MAX_CONFIDENCE)
        } else {
            base
        }
    }

    pub fn quality(&self, rsi: f64) -> QualityGrade {
        QualityGrade::from_confidence(self.confidence(rsi))
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_confirmations(self.confirmations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    RsiExtreme,
    RsiLean,
    Sma20,
    Sma50,
    Macd,
}

pub const RULES: [Rule; 5] = [
    Rule::RsiExtreme,
    Rule::RsiLean,
    Rule::Sma20,
    Rule::Sma50,
    Rule::Macd,
];

impl Rule {
    pub fn apply(self, acc: Confluence, ind: &IndicatorSet) -> Confluence {
        let price = ind.current_price;
        match self {
            Rule::RsiExtreme => {
                if ind.rsi < RSI_OVERSOLD {
                    acc.confirm(2, Bias::Buy, format!("RSI oversold at {:.1}", ind.rsi))
                } else if ind.rsi > RSI_OVERBOUGHT {
                    acc.confirm(2, Bias::Sell, format!("RSI overbought at {:.1}", ind.rsi))
                } else {
                    acc
                }
            }
            // An extreme reading already decided the bias; leaning only
            // applies inside the 30..=70 band.
            Rule::RsiLean if acc.bias.is_decided() => acc,
            Rule::RsiLean => {
                if ind.rsi < RSI_LEAN_BEARISH {
                    acc.confirm(1, Bias::Sell, format!("RSI leaning bearish at {:.1}", ind.rsi))
                } else if ind.rsi > RSI_LEAN_BULLISH {
                    acc.confirm(1, Bias::Buy, format!("RSI leaning bullish at {:.1}", ind.rsi))
                } else {
                    acc
                }
            }
            Rule::Sma20 => {
                if price > ind.sma_20 && acc.bias != Bias::Sell {
                    acc.confirm(1, Bias::Buy, "Price above SMA20 (bullish)".to_string())
                } else if price < ind.sma_20 && acc.bias != Bias::Buy {
                    acc.confirm(1, Bias::Sell, "Price below SMA20 (bearish)".to_string())
                } else {
                    acc
                }
            }
            Rule::Sma50 => match acc.bias {
                Bias::Buy if price > ind.sma_50 => {
                    acc.confirm(1, Bias::Buy, "Price above SMA50 (strong uptrend)".to_string())
                }
                Bias::Sell if price < ind.sma_50 => {
                    acc.confirm(1, Bias::Sell, "Price below SMA50 (strong downtrend)".to_string())
                }
                _ => acc,
            },
            Rule::Macd => match acc.bias {
                Bias::Buy if ind.macd > 0.0 => {
                    acc.confirm(1, Bias::Buy, "MACD positive (bullish momentum)".to_string())
                }
                Bias::Sell if ind.macd < 0.0 => {
                    acc.confirm(1, Bias::Sell, "MACD negative (bearish momentum)".to_string())
                }
                _ => acc,
            },
        }
    }
}

pub fn evaluate(ind: &IndicatorSet) -> Confluence {
    RULES
        .iter()
        .fold(Confluence::default(), |acc, rule| rule.apply(acc, ind))
}
