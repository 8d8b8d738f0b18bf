use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    pub fn as_duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::from_secs(60),
            Timeframe::M5 => Duration::from_secs(300),
            Timeframe::M15 => Duration::from_secs(900),
            Timeframe::M30 => Duration::from_secs(1800),
            Timeframe::H1 => Duration::from_secs(3600),
            Timeframe::H4 => Duration::from_secs(14400),
            Timeframe::D1 => Duration::from_secs(86400),
            Timeframe::W1 => Duration::from_secs(604800),
        }
    }

    /// Timeframe the provider actually serves for this one.
    /// 4h is not offered natively and is aggregated from 1h bars.
    pub fn native(&self) -> Timeframe {
        match self {
            Timeframe::H4 => Timeframe::H1,
            other => *other,
        }
    }

    pub fn needs_aggregation(&self) -> bool {
        self.native() != *self
    }

    /// Provider interval string (Yahoo chart API).
    pub fn provider_interval(&self) -> &'static str {
        match self.native() {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 | Timeframe::H4 => "1h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1wk",
        }
    }

    /// Default history window requested for an analysis run.
    pub fn default_range(&self) -> &'static str {
        match self {
            Timeframe::M1 => "7d",
            Timeframe::M5 => "5d",
            Timeframe::M15 => "5d",
            Timeframe::M30 => "10d",
            Timeframe::H1 => "1mo",
            Timeframe::H4 => "3mo",
            Timeframe::D1 => "6mo",
            Timeframe::W1 => "2y",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Timeframe> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Some(Timeframe::M1),
            "5m" => Some(Timeframe::M5),
            "15m" => Some(Timeframe::M15),
            "30m" => Some(Timeframe::M30),
            "1h" | "60m" => Some(Timeframe::H1),
            "4h" => Some(Timeframe::H4),
            "1d" => Some(Timeframe::D1),
            "1w" | "1wk" => Some(Timeframe::W1),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
