use thiserror::Error;

use crate::models::Timeframe;

/// Faults the core can surface to a caller.
///
/// Degenerate numeric input (zero trades, zero variance, zero risk) is never
/// represented here; those cases resolve to fallback values at the point of
/// computation.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no data available for {ticker} ({timeframe})")]
    NoData { ticker: String, timeframe: Timeframe },

    #[error("market data provider error: {0}")]
    Upstream(String),

    #[error("commentary service error: {0}")]
    Commentary(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, CoreError::NoData { .. })
    }
}
