use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional call produced by the confluence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Bias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Buy => "BUY",
            Bias::Sell => "SELL",
            Bias::Hold => "HOLD",
        }
    }

    pub fn is_decided(&self) -> bool {
        *self != Bias::Hold
    }

    pub fn to_market_direction(self) -> Option<MarketDirection> {
        match self {
            Bias::Buy => Some(MarketDirection::Bullish),
            Bias::Sell => Some(MarketDirection::Bearish),
            Bias::Hold => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketDirection {
    Bullish,
    Bearish,
    Sideways,
}

impl fmt::Display for MarketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketDirection::Bullish => write!(f, "BULLISH"),
            MarketDirection::Bearish => write!(f, "BEARISH"),
            MarketDirection::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
}

impl QualityGrade {
    pub fn from_confidence(confidence: u32) -> Self {
        match confidence {
            c if c >= 85 => QualityGrade::APlus,
            c if c >= 75 => QualityGrade::A,
            c if c >= 65 => QualityGrade::B,
            _ => QualityGrade::C,
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityGrade::APlus => write!(f, "A+"),
            QualityGrade::A => write!(f, "A"),
            QualityGrade::B => write!(f, "B"),
            QualityGrade::C => write!(f, "C"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_confirmations(confirmations: u32) -> Self {
        match confirmations {
            c if c >= 4 => RiskLevel::Low,
            3 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Side of a journaled trade. Deserializes from `buy`/`long` or
/// `sell`/`short` in any casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    #[default]
    Buy,
    Sell,
}

impl<'de> Deserialize<'de> for TradeDirection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "buy" | "long" => Ok(TradeDirection::Buy),
            "sell" | "short" => Ok(TradeDirection::Sell),
            _ => Err(serde::de::Error::unknown_variant(&raw, &["buy", "long", "sell", "short"])),
        }
    }
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "buy",
            TradeDirection::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakType {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    #[default]
    Forex,
    Crypto,
    Metals,
    Indices,
    Commodities,
    Stocks,
    #[serde(other)]
    Unknown,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Forex => "forex",
            AssetClass::Crypto => "crypto",
            AssetClass::Metals => "metals",
            AssetClass::Indices => "indices",
            AssetClass::Commodities => "commodities",
            AssetClass::Stocks => "stocks",
            AssetClass::Unknown => "unknown",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<AssetClass> {
        match s.trim().to_lowercase().as_str() {
            "forex" => Some(AssetClass::Forex),
            "crypto" => Some(AssetClass::Crypto),
            "metals" => Some(AssetClass::Metals),
            "indices" => Some(AssetClass::Indices),
            "commodities" => Some(AssetClass::Commodities),
            "stocks" => Some(AssetClass::Stocks),
            _ => None,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
