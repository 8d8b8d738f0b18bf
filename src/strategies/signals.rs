use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::indicators::IndicatorSet;
use crate::core::{round1, round5};
use crate::models::{AssetClass, Bias, Instrument, MarketDirection, QualityGrade, RiskLevel, Timeframe};
use crate::strategies::confluence::{self, Confluence};
use crate::strategies::overlay::{OverlayLevels, VisualOverlays};

const STOP_ATR_MULTIPLE: f64 = 1.5;
const DEFAULT_RISK_REWARD: &str = "1:2";

/// ATR-spaced take-profit ladder and stop for a decided bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub sl: f64,
}

impl Targets {
    pub fn from_atr(bias: Bias, price: f64, atr: f64) -> Self {
        let side = if bias == Bias::Sell { -1.0 } else { 1.0 };
        Self {
            tp1: price + side * atr,
            tp2: price + side * atr * 2.0,
            tp3: price + side * atr * 3.0,
            sl: price - side * atr * STOP_ATR_MULTIPLE,
        }
    }

    /// Reward to TP2 over risk to the stop; `None` when the stop sits on the entry.
    pub fn reward_risk(&self, price: f64) -> Option<f64> {
        let risk = (price - self.sl).abs();
        if risk > 0.0 {
            Some((self.tp2 - price).abs() / risk)
        } else {
            None
        }
    }
}

pub fn risk_reward_label(rr: Option<f64>) -> String {
    match rr {
        Some(r) => format!("1:{:.1}", r),
        None => DEFAULT_RISK_REWARD.to_string(),
    }
}

/// 0-100 composite of confirmation count, confidence, reward:risk and RSI extremity.
pub fn trade_quality_score(confirmations: u32, confidence: u32, rr: Option<f64>, rsi_extreme: bool) -> u32 {
    let mut score = match confirmations {
        c if c >= 4 => 30,
        3 => 20,
        2 => 10,
        _ => 0,
    };
    score += match confidence {
        c if c >= 80 => 25,
        c if c >= 70 => 15,
        _ => 0,
    };
    let rr = rr.unwrap_or(1.0);
    score += if rr >= 3.0 {
        25
    } else if rr >= 2.0 {
        15
    } else if rr >= 1.5 {
        10
    } else {
        0
    };
    if rsi_extreme {
        score += 20;
    }
    score.min(100)
}

pub fn bias_score(confirmations: u32, rsi_extreme: bool) -> u32 {
    let bonus = if rsi_extreme { 10 } else { 0 };
    (40 + confirmations * 12 + bonus).min(100)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    /// Display name, e.g. "EUR/USD".
    pub symbol: String,
    pub ticker: String,
    pub asset_type: AssetClass,
    pub action: Bias,
    pub confidence: u32,
    pub price: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub tp3: f64,
    pub sl: f64,
    pub rsi: f64,
    pub quality: QualityGrade,
    pub trade_quality_score: u32,
    pub bias_score: u32,
    pub market_bias: MarketDirection,
    pub risk_level: RiskLevel,
    pub market_direction: MarketDirection,
    pub risk_reward: String,
    pub confirmations: u32,
    pub why_this_trade: String,
    pub reasons: Vec<String>,
    pub support: f64,
    pub resistance: f64,
    pub visual_overlays: VisualOverlays,
    pub timeframe: Timeframe,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Run the confluence rules and, when they agree strongly enough,
    /// build the full signal. `None` means "no trade", not a failure.
    pub fn evaluate(
        instrument: &Instrument,
        timeframe: Timeframe,
        ind: &IndicatorSet,
        chart_height: f64,
    ) -> Option<Signal> {
        let outcome = confluence::evaluate(ind);
        if !outcome.is_actionable() {
            return None;
        }
        Some(Self::from_confluence(instrument, timeframe, ind, outcome, chart_height))
    }

    fn from_confluence(
        instrument: &Instrument,
        timeframe: Timeframe,
        ind: &IndicatorSet,
        outcome: Confluence,
        chart_height: f64,
    ) -> Signal {
        let price = ind.current_price;
        let bias = outcome.bias;
        let rsi_extreme = ind.rsi_is_extreme();
        let confidence = outcome.confidence(ind.rsi);
        let direction = bias.to_market_direction().unwrap_or(MarketDirection::Sideways);

        let targets = Targets::from_atr(bias, price, ind.atr);
        let rr = targets.reward_risk(price);
        let risk_reward = risk_reward_label(rr);

        let support = round5(ind.support);
        let resistance = round5(ind.resistance);
        let (tp1, tp2, tp3, sl) = (
            round5(targets.tp1),
            round5(targets.tp2),
            round5(targets.tp3),
            round5(targets.sl),
        );
        let entry = round5(price);

        let visual_overlays = VisualOverlays::build(
            &OverlayLevels {
                bias,
                price: entry,
                support,
                resistance,
                sl,
                tp: [tp1, tp2, tp3],
            },
            chart_height,
        );

        let why_this_trade = format!(
            "Multiple technical confirmations align for a {} setup on {}. {}. Key support at {}, resistance at {}. ATR-based targets with {} risk/reward ratio suggest favorable setup.",
            bias,
            instrument.name,
            outcome.reasons.join(". "),
            support,
            resistance,
            risk_reward
        );

        Signal {
            id: Uuid::new_v4().to_string(),
            symbol: instrument.name.clone(),
            ticker: instrument.ticker.clone(),
            asset_type: instrument.asset_type,
            action: bias,
            confidence,
            price: entry,
            tp1,
            tp2,
            tp3,
            sl,
            rsi: round1(ind.rsi),
            quality: outcome.quality(ind.rsi),
            trade_quality_score: trade_quality_score(outcome.confirmations, confidence, rr, rsi_extreme),
            bias_score: bias_score(outcome.confirmations, rsi_extreme),
            market_bias: direction,
            risk_level: outcome.risk_level(),
            market_direction: direction,
            risk_reward,
            confirmations: outcome.confirmations,
            why_this_trade,
            reasons: outcome.reasons,
            support,
            resistance,
            visual_overlays,
            timeframe,
            created_at: Utc::now(),
        }
    }
}
