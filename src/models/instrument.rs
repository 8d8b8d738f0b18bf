use serde::{Deserialize, Serialize};

use crate::models::AssetClass;

/// A tradable symbol as known to the market-data provider plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub ticker: String,
    pub name: String,
    pub asset_type: AssetClass,
}

impl Instrument {
    pub fn new(ticker: &str, name: &str, asset_type: AssetClass) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            asset_type,
        }
    }
}
