use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::commentary::{Commentary, Commentator, SYSTEM_PROMPT};
use crate::config::Config;
use crate::core::chart::{chart_bars, ChartBar};
use crate::core::indicators::{IndicatorReport, IndicatorSet};
use crate::core::round5;
use crate::error::CoreError;
use crate::market::{load_series, MarketData};
use crate::models::{AssetClass, PriceSeries, Timeframe};

const CHART_BARS: usize = 30;
const PROMPT_HISTORY: usize = 10;

fn default_timeframe() -> Timeframe {
    Timeframe::H1
}

fn default_trader_type() -> String {
    "swing".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub position_size: Option<f64>,
    #[serde(default)]
    pub asset_type: AssetClass,
    #[serde(default = "default_trader_type")]
    pub trader_type: String,
}

impl AnalysisRequest {
    pub fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            current_price: None,
            position_size: None,
            asset_type: AssetClass::default(),
            trader_type: default_trader_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub asset_type: AssetClass,
    pub indicators: IndicatorReport,
    pub ai_result: Commentary,
    pub chart_data: Vec<ChartBar>,
    pub created_at: DateTime<Utc>,
}

pub struct AnalysisRunner {
    market: Arc<dyn MarketData>,
    commentator: Arc<dyn Commentator>,
    commentary_timeout: Duration,
}

impl AnalysisRunner {
    pub fn new(market: Arc<dyn MarketData>, commentator: Arc<dyn Commentator>, cfg: &Config) -> Self {
        Self {
            market,
            commentator,
            commentary_timeout: Duration::from_secs(cfg.commentary_timeout_secs),
        }
    }

    /// Indicators plus commentary for one symbol. Only a missing or failing
    /// price history is an error; commentary problems resolve to the
    /// neutral fallback verdict.
    pub async fn run(&self, req: &AnalysisRequest) -> Result<AnalysisReport, CoreError> {
        if req.symbol.trim().is_empty() {
            return Err(CoreError::InvalidInput("symbol is empty".to_string()));
        }
        if let Some(p) = req.current_price.filter(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(CoreError::InvalidInput(format!("current price {} is not positive", p)));
        }

        let series = load_series(
            self.market.as_ref(),
            &req.symbol,
            req.timeframe,
            req.timeframe.default_range(),
        )
        .await?;

        let ind = IndicatorSet::compute(&series, req.current_price);
        let report = ind.report();
        let prompt = build_prompt(req, &report, &series);

        let reply = tokio::time::timeout(
            self.commentary_timeout,
            self.commentator.complete(SYSTEM_PROMPT, &prompt),
        )
        .await;

        let ai_result = match reply {
            Ok(Ok(text)) => Commentary::parse(&text).unwrap_or_else(|| {
                warn!("{}: unparsable commentary, using fallback", req.symbol);
                Commentary::fallback(ind.current_price, &text)
            }),
            Ok(Err(e)) => {
                warn!("{}: {}", req.symbol, CoreError::Commentary(format!("{e:#}")));
                Commentary::fallback(ind.current_price, "")
            }
            Err(_) => {
                let e = CoreError::Commentary(format!(
                    "timed out after {}s",
                    self.commentary_timeout.as_secs()
                ));
                warn!("{}: {}", req.symbol, e);
                Commentary::fallback(ind.current_price, "")
            }
        };

        info!(
            "Analysis {} {}: {} ({:.0}%)",
            req.symbol, req.timeframe, ai_result.recommendation, ai_result.confidence
        );

        Ok(AnalysisReport {
            id: Uuid::new_v4().to_string(),
            symbol: req.symbol.clone(),
            timeframe: req.timeframe,
            asset_type: req.asset_type,
            indicators: report,
            ai_result,
            chart_data: chart_bars(series.tail(CHART_BARS)),
            created_at: Utc::now(),
        })
    }
}

fn rounded(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| round5(*v)).collect()
}

pub fn build_prompt(req: &AnalysisRequest, ind: &IndicatorReport, series: &PriceSeries) -> String {
    let recent = series.tail(PROMPT_HISTORY);
    let closes: Vec<f64> = recent.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = recent.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = recent.iter().map(|b| b.low).collect();
    let position = req
        .position_size
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Not specified".to_string());

    format!(
        "Analyze this {asset} pair: {symbol}
Timeframe: {tf}
Trader Type: {trader}
Current Price: {price}
Position Size: {position}

Technical Indicators:
- RSI(14): {rsi}
- MACD: {macd}
- SMA 20: {sma20}
- SMA 50: {sma50}
- Bollinger Upper: {bbu}
- Bollinger Lower: {bbl}
- Key Support: {support}
- Key Resistance: {resistance}

Recent price action (last 10 closes): {closes:?}
Recent highs: {highs:?}
Recent lows: {lows:?}

{RESPONSE_FORMAT}",
        asset = req.asset_type,
        symbol = req.symbol,
        tf = req.timeframe,
        trader = req.trader_type,
        price = ind.current_price,
        rsi = ind.rsi,
        macd = ind.macd,
        sma20 = ind.sma_20,
        sma50 = ind.sma_50,
        bbu = ind.bb_upper,
        bbl = ind.bb_lower,
        support = ind.support,
        resistance = ind.resistance,
        closes = rounded(&closes),
        highs = rounded(&highs),
        lows = rounded(&lows),
    )
}

const RESPONSE_FORMAT: &str = r#"Provide analysis in this exact JSON format:
{
  "recommendation": "BUY" or "SELL" or "HOLD",
  "confidence": 0-100,
  "tp1": price_level,
  "tp2": price_level,
  "tp3": price_level,
  "sl": price_level,
  "risk_reward": "ratio like 1:2.5",
  "patterns_detected": ["list of detected patterns"],
  "trend": "BULLISH" or "BEARISH" or "SIDEWAYS",
  "key_levels": {"support": [levels], "resistance": [levels]},
  "explanation": "Detailed analysis explanation",
  "entry_zone": "price range for entry",
  "timeframe_bias": "short-term outlook",
  "advanced_patterns": ["harmonic patterns, market structure etc"],
  "volume_analysis": "volume assessment",
  "momentum": "momentum assessment"
}"#;
