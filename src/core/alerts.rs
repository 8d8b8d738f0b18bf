use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Above,
    Below,
    CrossResistance,
    CrossSupport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: String,
    pub symbol: String,
    pub price_level: f64,
    pub alert_type: AlertType,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredAlert {
    #[serde(flatten)]
    pub alert: PriceAlert,
    pub current_price: f64,
    pub triggered_at: DateTime<Utc>,
}

/// Check one alert against the two most recent closes.
///
/// Level alerts need a single bar; cross alerts need the previous close
/// strictly on the other side of the level.
pub fn evaluate(alert: &PriceAlert, series: &PriceSeries, now: DateTime<Utc>) -> Option<TriggeredAlert> {
    let current = series.last()?.close;
    let previous = series
        .len()
        .checked_sub(2)
        .and_then(|i| series.get(i))
        .map(|b| b.close);
    let level = alert.price_level;

    let triggered = match alert.alert_type {
        AlertType::Above => current >= level,
        AlertType::Below => current <= level,
        AlertType::CrossResistance => previous.is_some_and(|p| p < level && level <= current),
        AlertType::CrossSupport => previous.is_some_and(|p| p > level && level >= current),
    };

    triggered.then(|| TriggeredAlert {
        alert: alert.clone(),
        current_price: current,
        triggered_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_closes;

    fn alert(kind: AlertType, level: f64) -> PriceAlert {
        PriceAlert {
            id: "a1".to_string(),
            symbol: "EURUSD=X".to_string(),
            price_level: level,
            alert_type: kind,
            note: String::new(),
        }
    }

    #[test]
    fn above_and_below() {
        let s = make_closes(&[1.08, 1.10]);
        assert!(evaluate(&alert(AlertType::Above, 1.10), &s, Utc::now()).is_some());
        assert!(evaluate(&alert(AlertType::Above, 1.11), &s, Utc::now()).is_none());
        assert!(evaluate(&alert(AlertType::Below, 1.10), &s, Utc::now()).is_some());
    }

    #[test]
    fn cross_requires_previous_on_other_side() {
        let s = make_closes(&[1.08, 1.10]);
        assert!(evaluate(&alert(AlertType::CrossResistance, 1.09), &s, Utc::now()).is_some());
        assert!(evaluate(&alert(AlertType::CrossResistance, 1.07), &s, Utc::now()).is_none());
        assert!(evaluate(&alert(AlertType::CrossSupport, 1.09), &s, Utc::now()).is_none());

        let down = make_closes(&[1.10, 1.08]);
        let hit = evaluate(&alert(AlertType::CrossSupport, 1.09), &down, Utc::now()).unwrap();
        assert!((hit.current_price - 1.08).abs() < 1e-12);
    }

    #[test]
    fn cross_needs_two_bars() {
        let s = make_closes(&[1.10]);
        assert!(evaluate(&alert(AlertType::CrossResistance, 1.09), &s, Utc::now()).is_none());
        assert!(evaluate(&alert(AlertType::Above, 1.09), &s, Utc::now()).is_some());
    }

    #[test]
    fn empty_series_never_triggers() {
        assert!(evaluate(&alert(AlertType::Below, 1e9), &PriceSeries::default(), Utc::now()).is_none());
    }
}
