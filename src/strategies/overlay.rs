//! Pixel geometry for drawing a signal on a fixed-size chart canvas.
//!
//! Prices map linearly onto the vertical axis with the resistance level at
//! y = 50 and the support level 100px above the bottom edge.

use serde::{Deserialize, Serialize};

use crate::models::Bias;

pub const MARKER_X: i64 = 650;
pub const TREND_X_START: i64 = 100;
pub const TREND_X_END: i64 = 700;
const TOP_MARGIN: f64 = 50.0;
const VERTICAL_PADDING: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCanvas {
    resistance: f64,
    range: f64,
    height: f64,
}

impl PriceCanvas {
    /// A non-positive support/resistance gap falls back to 10% of the price.
    pub fn new(support: f64, resistance: f64, current_price: f64, height: f64) -> Self {
        let range = if resistance > support {
            resistance - support
        } else {
            current_price * 0.1
        };
        Self {
            resistance,
            range,
            height,
        }
    }

    pub fn y(&self, price: f64) -> i64 {
        if self.range == 0.0 {
            return (self.height / 2.0) as i64;
        }
        let normalized = (self.resistance - price) / self.range;
        (TOP_MARGIN + normalized * (self.height - VERTICAL_PADDING)) as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub y: i64,
    pub label: String,
    pub strength: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: i64,
    pub y: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
}

/// Overlay layers. Pattern, breakout and sweep layers are part of the
/// drawing contract but the indicator engine never populates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualOverlays {
    pub support_zones: Vec<Zone>,
    pub resistance_zones: Vec<Zone>,
    pub trendlines: Vec<Trendline>,
    pub patterns: Vec<serde_json::Value>,
    pub entry_markers: Vec<Marker>,
    pub stop_loss_markers: Vec<Marker>,
    pub take_profit_markers: Vec<Marker>,
    pub breakout_zones: Vec<serde_json::Value>,
    pub liquidity_sweeps: Vec<serde_json::Value>,
}

/// Price levels an overlay is drawn from, already rounded for display.
#[derive(Debug, Clone, Copy)]
pub struct OverlayLevels {
    pub bias: Bias,
    pub price: f64,
    pub support: f64,
    pub resistance: f64,
    pub sl: f64,
    pub tp: [f64; 3],
}

fn marker(canvas: &PriceCanvas, price: f64, label: String, kind: &str) -> Marker {
    Marker {
        x: MARKER_X,
        y: canvas.y(price),
        label,
        kind: kind.to_string(),
    }
}

impl VisualOverlays {
    pub fn build(levels: &OverlayLevels, height: f64) -> Self {
        let l = levels;
        let canvas = PriceCanvas::new(l.support, l.resistance, l.price, height);

        let trendline = match l.bias {
            Bias::Sell => Trendline {
                x1: TREND_X_START,
                y1: canvas.y(l.resistance * 1.01),
                x2: TREND_X_END,
                y2: canvas.y(l.price * 1.005),
                kind: "bearish".to_string(),
                label: "Bearish Trend".to_string(),
            },
            _ => Trendline {
                x1: TREND_X_START,
                y1: canvas.y(l.support * 0.99),
                x2: TREND_X_END,
                y2: canvas.y(l.price * 0.995),
                kind: "bullish".to_string(),
                label: "Bullish Trend".to_string(),
            },
        };

        let take_profit_markers = l
            .tp
            .iter()
            .enumerate()
            .map(|(i, &tp)| {
                let n = i + 1;
                marker(&canvas, tp, format!("TP{n} {tp}"), &format!("tp{n}"))
            })
            .collect();

        Self {
            support_zones: vec![Zone {
                y: canvas.y(l.support),
                label: format!("Support {}", l.support),
                strength: "strong".to_string(),
            }],
            resistance_zones: vec![Zone {
                y: canvas.y(l.resistance),
                label: format!("Resistance {}", l.resistance),
                strength: "strong".to_string(),
            }],
            trendlines: vec![trendline],
            entry_markers: vec![marker(&canvas, l.price, format!("Entry {}", l.price), "entry")],
            stop_loss_markers: vec![marker(&canvas, l.sl, format!("SL {}", l.sl), "stop_loss")],
            take_profit_markers,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistance_at_top_support_near_bottom() {
        let c = PriceCanvas::new(90.0, 110.0, 100.0, 600.0);
        assert_eq!(c.y(110.0), 50);
        assert_eq!(c.y(90.0), 550);
        assert_eq!(c.y(100.0), 300);
    }

    #[test]
    fn inverted_levels_use_price_fraction() {
        // range = 100 * 0.1 = 10; (100 - 95) / 10 * 500 + 50
        let c = PriceCanvas::new(100.0, 100.0, 100.0, 600.0);
        assert_eq!(c.y(95.0), 300);
    }

    #[test]
    fn zero_range_is_mid_canvas() {
        let c = PriceCanvas::new(0.0, 0.0, 0.0, 600.0);
        assert_eq!(c.y(123.0), 300);
    }

    #[test]
    fn truncates_toward_zero() {
        let c = PriceCanvas::new(0.0, 3.0, 1.0, 600.0);
        // 50 + (3 - 2) / 3 * 500 = 216.66
        assert_eq!(c.y(2.0), 216);
    }

    #[test]
    fn buy_overlay_layers() {
        let levels = OverlayLevels {
            bias: Bias::Buy,
            price: 100.0,
            support: 90.0,
            resistance: 110.0,
            sl: 97.0,
            tp: [102.0, 104.0, 106.0],
        };
        let o = VisualOverlays::build(&levels, 600.0);
        assert_eq!(o.entry_markers[0].y, 300);
        assert_eq!(o.entry_markers[0].label, "Entry 100");
        assert_eq!(o.take_profit_markers.len(), 3);
        assert_eq!(o.take_profit_markers[2].kind, "tp3");
        assert_eq!(o.trendlines[0].kind, "bullish");
        assert_eq!(o.trendlines[0].x2, TREND_X_END);
        assert!(o.patterns.is_empty() && o.breakout_zones.is_empty() && o.liquidity_sweeps.is_empty());

        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["stop_loss_markers"][0]["type"], "stop_loss");
        assert_eq!(json["support_zones"][0]["strength"], "strong");
    }

    #[test]
    fn sell_overlay_trend_starts_above_resistance() {
        let levels = OverlayLevels {
            bias: Bias::Sell,
            price: 100.0,
            support: 90.0,
            resistance: 110.0,
            sl: 103.0,
            tp: [98.0, 96.0, 94.0],
        };
        let o = VisualOverlays::build(&levels, 600.0);
        let t = &o.trendlines[0];
        assert_eq!(t.label, "Bearish Trend");
        assert!(t.y1 < 50);
    }
}
