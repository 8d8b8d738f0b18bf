pub mod trade_analyzer;
pub mod trade_record;

pub use trade_analyzer::{DailyRecap, StatisticsReport, TradeAnalyzer};
pub use trade_record::{ClosedTrade, TradeFilter};
