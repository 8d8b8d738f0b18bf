use crate::core::sessions::SessionWindow;
use crate::models::{AssetClass, Instrument, Timeframe};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKET_DATA_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Market data
    pub market_data_url: String,
    pub http_timeout_secs: u64,
    /// Replay bars from this JSON recording instead of calling the provider.
    pub market_data_file: Option<String>,

    // Signals
    pub signal_timeframe: Timeframe,
    pub signal_range: String,
    pub signal_universe: Vec<Instrument>,

    // Scanner (0 = run a single pass and exit)
    pub scan_interval_secs: u64,
    pub scan_watchlist: Vec<Instrument>,

    // Analysis commentary
    pub commentary_timeout_secs: u64,

    // Overlay canvas height in pixels
    pub chart_height: f64,

    // Sessions, in UTC hours
    pub sessions: Vec<SessionWindow>,

    // Statistics
    pub histogram_buckets: usize,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        Config {
            market_data_url: env("MARKET_DATA_URL", DEFAULT_MARKET_DATA_URL),
            http_timeout_secs: env("HTTP_TIMEOUT_SECS", "15").parse().unwrap_or(15),
            market_data_file: std::env::var("MARKET_DATA_FILE").ok().filter(|s| !s.is_empty()),
            signal_timeframe: Timeframe::from_str_loose(&env("SIGNAL_TIMEFRAME", "1h"))
                .unwrap_or(Timeframe::H1),
            signal_range: env("SIGNAL_RANGE", "5d"),
            signal_universe: default_signal_universe(),
            scan_interval_secs: env("SCAN_INTERVAL", "0").parse().unwrap_or(0),
            scan_watchlist: default_scan_watchlist(),
            commentary_timeout_secs: env("COMMENTARY_TIMEOUT_SECS", "30").parse().unwrap_or(30),
            chart_height: env("CHART_HEIGHT", "600").parse().unwrap_or(600.0),
            sessions: default_sessions(),
            histogram_buckets: 10,
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }
}

pub fn default_signal_universe() -> Vec<Instrument> {
    vec![
        Instrument::new("EURUSD=X", "EUR/USD", AssetClass::Forex),
        Instrument::new("GBPUSD=X", "GBP/USD", AssetClass::Forex),
        Instrument::new("BTC-USD", "BTC/USD", AssetClass::Crypto),
        Instrument::new("ETH-USD", "ETH/USD", AssetClass::Crypto),
        Instrument::new("GC=F", "Gold", AssetClass::Metals),
    ]
}

pub fn default_scan_watchlist() -> Vec<Instrument> {
    vec![
        Instrument::new("EURUSD=X", "EUR/USD", AssetClass::Forex),
        Instrument::new("GC=F", "Gold", AssetClass::Metals),
        Instrument::new("BTC-USD", "Bitcoin", AssetClass::Crypto),
        Instrument::new("^GSPC", "S&P 500", AssetClass::Indices),
        Instrument::new("GBPUSD=X", "GBP/USD", AssetClass::Forex),
        Instrument::new("ETH-USD", "Ethereum", AssetClass::Crypto),
    ]
}

pub fn default_sessions() -> Vec<SessionWindow> {
    vec![
        SessionWindow::new("Tokyo", 0, 9),
        SessionWindow::new("London", 7, 16),
        SessionWindow::new("New York", 13, 22),
        SessionWindow::new("Sydney", 21, 6),
    ]
}
