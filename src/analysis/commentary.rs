//! Boundary to an external narrative-commentary service.
//!
//! The service is asked for a JSON verdict. Anything it returns that does
//! not parse, and any failure to reach it, degrades to a fixed neutral
//! verdict built from the current price.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::round5;
use crate::models::{Bias, MarketDirection};

const EXPLANATION_LIMIT: usize = 500;

pub const SYSTEM_PROMPT: &str = "You are an expert trading analyst specializing in forex, crypto, and metals. \
You analyze charts using technical analysis including candlestick patterns, trend detection, support/resistance, \
moving averages, RSI, MACD, Bollinger Bands, and advanced pattern recognition. Always provide structured, \
actionable trading recommendations. Be specific with price levels. You must respond in valid JSON format only.";

#[async_trait]
pub trait Commentator: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Used when no service is configured; every run gets the fallback verdict.
pub struct NoCommentator;

#[async_trait]
impl Commentator for NoCommentator {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        anyhow::bail!("no commentary service configured")
    }
}

fn default_confidence() -> f64 {
    50.0
}

fn default_trend() -> MarketDirection {
    MarketDirection::Sideways
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    #[serde(default)]
    pub support: Vec<f64>,
    #[serde(default)]
    pub resistance: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commentary {
    #[serde(default)]
    pub recommendation: Bias,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub tp1: f64,
    #[serde(default)]
    pub tp2: f64,
    #[serde(default)]
    pub tp3: f64,
    #[serde(default)]
    pub sl: f64,
    #[serde(default)]
    pub risk_reward: String,
    #[serde(default)]
    pub patterns_detected: Vec<String>,
    #[serde(default = "default_trend")]
    pub trend: MarketDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_levels: Option<KeyLevels>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub entry_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe_bias: Option<String>,
    #[serde(default)]
    pub advanced_patterns: Vec<String>,
    #[serde(default)]
    pub volume_analysis: String,
    #[serde(default)]
    pub momentum: String,
}

impl Commentary {
    /// Neutral verdict around `price`. `raw` is whatever text the service
    /// produced, kept (truncated) as the explanation.
    pub fn fallback(price: f64, raw: &str) -> Self {
        let explanation = if raw.is_empty() {
            "Analysis completed".to_string()
        } else {
            raw.chars().take(EXPLANATION_LIMIT).collect()
        };

        Self {
            recommendation: Bias::Hold,
            confidence: 50.0,
            tp1: round5(price * 1.01),
            tp2: round5(price * 1.02),
            tp3: round5(price * 1.03),
            sl: round5(price * 0.99),
            risk_reward: "1:2".to_string(),
            patterns_detected: vec!["Analysis pending".to_string()],
            trend: MarketDirection::Sideways,
            key_levels: None,
            explanation,
            entry_zone: format!("{} - {}", round5(price * 0.999), round5(price * 1.001)),
            timeframe_bias: None,
            advanced_patterns: Vec::new(),
            volume_analysis: "Normal volume".to_string(),
            momentum: "Neutral".to_string(),
        }
    }

    /// Parse a service reply, tolerating a surrounding markdown code fence.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(strip_code_fence(raw)).ok()
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }
    // Drop the opening fence line (it may carry a language tag) and the closing fence.
    let body = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"recommendation\": \"BUY\", \"confidence\": 72, \"trend\": \"BULLISH\", \"tp1\": 1.1}\n```";
        let c = Commentary::parse(raw).unwrap();
        assert_eq!(c.recommendation, Bias::Buy);
        assert!((c.confidence - 72.0).abs() < 1e-9);
        assert_eq!(c.trend, MarketDirection::Bullish);
        assert!(c.patterns_detected.is_empty());
    }

    #[test]
    fn parses_bare_json_with_defaults() {
        let c = Commentary::parse("  {}  ").unwrap();
        assert_eq!(c.recommendation, Bias::Hold);
        assert_eq!(c.trend, MarketDirection::Sideways);
        assert!((c.confidence - 50.0).abs() < 1e-9);
    }

    #[test]
    fn prose_falls_back() {
        let raw = "The market looks choppy today.";
        assert!(Commentary::parse(raw).is_none());
        let c = Commentary::fallback(2.0, raw);
        assert_eq!(c.recommendation, Bias::Hold);
        assert_eq!(c.explanation, "The market looks choppy today.");
        assert!((c.tp1 - 2.02).abs() < 1e-9);
        assert!((c.tp3 - 2.06).abs() < 1e-9);
        assert!((c.sl - 1.98).abs() < 1e-9);
        assert_eq!(c.entry_zone, "1.998 - 2.002");
        assert_eq!(c.patterns_detected, vec!["Analysis pending"]);
    }

    #[test]
    fn fallback_truncates_and_defaults_explanation() {
        let long = "x".repeat(800);
        assert_eq!(Commentary::fallback(1.0, &long).explanation.len(), 500);
        assert_eq!(Commentary::fallback(1.0, "").explanation, "Analysis completed");
    }

    #[tokio::test]
    async fn no_commentator_always_errors() {
        assert!(NoCommentator.complete(SYSTEM_PROMPT, "hi").await.is_err());
    }
}
