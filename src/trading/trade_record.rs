use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AssetClass, TradeDirection};

fn default_asset() -> AssetClass {
    AssetClass::Unknown
}

fn default_timeframe() -> String {
    "1h".to_string()
}

/// A journaled trade. Only trades carrying an outcome count as closed;
/// a closed trade without PnL counts as breakeven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: String,
    pub symbol: String,
    #[serde(default = "default_asset")]
    pub asset_type: AssetClass,
    #[serde(default, alias = "trade_type")]
    pub direction: TradeDirection,
    #[serde(default)]
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub position_size: f64,
    #[serde(default, alias = "sl")]
    pub stop_loss: Option<f64>,
    #[serde(default, alias = "tp1")]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    pub created_at: DateTime<Utc>,
}

impl ClosedTrade {
    pub fn is_closed(&self) -> bool {
        self.outcome.as_deref().is_some_and(|o| !o.is_empty())
    }

    pub fn pnl_or_zero(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }

    pub fn is_win(&self) -> bool {
        self.pnl_or_zero() > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl_or_zero() < 0.0
    }

    /// Planned reward over planned risk; needs entry, stop and target all
    /// set and the stop away from the entry.
    pub fn planned_rr(&self) -> Option<f64> {
        let sl = self.stop_loss.filter(|v| *v != 0.0)?;
        let tp = self.take_profit.filter(|v| *v != 0.0)?;
        let entry = self.entry_price;
        if entry == 0.0 || entry == sl {
            return None;
        }
        Some((tp - entry).abs() / (entry - sl).abs())
    }
}

/// Optional constraints; every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeFilter {
    pub asset_type: Option<AssetClass>,
    pub direction: Option<TradeDirection>,
    pub outcome: Option<String>,
    /// Case-insensitive substring of the symbol.
    pub symbol: Option<String>,
    pub date_from: Option<NaiveDate>,
    /// Inclusive through the end of this day.
    pub date_to: Option<NaiveDate>,
    pub min_pnl: Option<f64>,
    pub max_pnl: Option<f64>,
}

impl TradeFilter {
    pub fn matches(&self, t: &ClosedTrade) -> bool {
        if self.asset_type.is_some_and(|a| a != t.asset_type) {
            return false;
        }
        if self.direction.is_some_and(|d| d != t.direction) {
            return false;
        }
        if let Some(outcome) = &self.outcome {
            if t.outcome.as_deref() != Some(outcome.as_str()) {
                return false;
            }
        }
        if let Some(symbol) = &self.symbol {
            if !t.symbol.to_uppercase().contains(&symbol.to_uppercase()) {
                return false;
            }
        }

        let day = t.created_at.date_naive();
        if self.date_from.is_some_and(|from| day < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| day > to) {
            return false;
        }

        if self.min_pnl.is_some() || self.max_pnl.is_some() {
            let Some(pnl) = t.pnl else {
                return false;
            };
            if self.min_pnl.is_some_and(|m| pnl < m) || self.max_pnl.is_some_and(|m| pnl > m) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, trades: &'a [ClosedTrade]) -> Vec<&'a ClosedTrade> {
        trades.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_trade, open_trade};

    #[test]
    fn closed_requires_outcome() {
        assert!(make_trade(AssetClass::Forex, TradeDirection::Buy, 5.0, 0).is_closed());
        assert!(!open_trade(0).is_closed());
        let mut t = open_trade(1);
        t.outcome = Some(String::new());
        assert!(!t.is_closed());
    }

    #[test]
    fn planned_rr_needs_all_levels() {
        let t = make_trade(AssetClass::Forex, TradeDirection::Buy, 5.0, 0);
        // entry 100, stop 98, target 104
        assert!((t.planned_rr().unwrap() - 2.0).abs() < 1e-9);

        let mut no_stop = t.clone();
        no_stop.stop_loss = None;
        assert!(no_stop.planned_rr().is_none());

        let mut stop_at_entry = t;
        stop_at_entry.stop_loss = Some(100.0);
        assert!(stop_at_entry.planned_rr().is_none());
    }

    #[test]
    fn filter_by_symbol_and_direction() {
        let buy = make_trade(AssetClass::Crypto, TradeDirection::Buy, 5.0, 0);
        let sell = make_trade(AssetClass::Crypto, TradeDirection::Sell, -5.0, 1);
        let f = TradeFilter {
            symbol: Some("btc".to_string()),
            direction: Some(TradeDirection::Sell),
            ..Default::default()
        };
        assert!(!f.matches(&buy));
        assert!(f.matches(&sell));
    }

    #[test]
    fn date_to_covers_whole_day() {
        // base time is 2024-01-15 12:00; +11h stays on the 15th
        let late = make_trade(AssetClass::Forex, TradeDirection::Buy, 1.0, 11);
        let next_day = make_trade(AssetClass::Forex, TradeDirection::Buy, 1.0, 13);
        let f = TradeFilter {
            date_to: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Default::default()
        };
        assert!(f.matches(&late));
        assert!(!f.matches(&next_day));
    }

    #[test]
    fn pnl_bounds_exclude_missing_pnl() {
        let f = TradeFilter {
            min_pnl: Some(-10.0),
            ..Default::default()
        };
        assert!(!f.matches(&open_trade(0)));
        assert!(f.matches(&make_trade(AssetClass::Forex, TradeDirection::Buy, -2.0, 0)));
        assert!(!f.matches(&make_trade(AssetClass::Forex, TradeDirection::Buy, -20.0, 0)));
    }

    #[test]
    fn direction_ignores_case() {
        for (raw, expected) in [
            ("SHORT", TradeDirection::Sell),
            ("Long", TradeDirection::Buy),
            ("bUy", TradeDirection::Buy),
            ("sell", TradeDirection::Sell),
        ] {
            let json = format!(
                r#"{{"id": "x", "symbol": "EUR/USD", "direction": "{raw}", "created_at": "2024-01-15T12:00:00Z"}}"#
            );
            let t: ClosedTrade = serde_json::from_str(&json).unwrap();
            assert_eq!(t.direction, expected, "{raw}");
        }

        let bad = r#"{"id": "x", "symbol": "EUR/USD", "direction": "flat", "created_at": "2024-01-15T12:00:00Z"}"#;
        assert!(serde_json::from_str::<ClosedTrade>(bad).is_err());
    }

    #[test]
    fn deserializes_journal_shape() {
        let t: ClosedTrade = serde_json::from_str(
            r#"{"id": "x", "symbol": "EUR/USD", "trade_type": "SELL", "entry_price": 1.1,
                "sl": 1.11, "tp1": 1.08, "pnl": 12.5, "outcome": "win",
                "created_at": "2024-03-05T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(t.direction, TradeDirection::Sell);
        assert_eq!(t.asset_type, AssetClass::Unknown);
        assert_eq!(t.timeframe, "1h");
        assert_eq!(t.stop_loss, Some(1.11));
        assert!(t.is_closed() && t.is_win());
    }
}
