pub mod candle;
pub mod direction;
pub mod instrument;
pub mod timeframe;

pub use candle::{PriceBar, PriceSeries};
pub use direction::*;
pub use instrument::Instrument;
pub use timeframe::Timeframe;
