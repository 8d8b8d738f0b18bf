pub mod confluence;
pub mod overlay;
pub mod signal_engine;
pub mod signals;

pub use signal_engine::SignalEngine;
pub use signals::Signal;
