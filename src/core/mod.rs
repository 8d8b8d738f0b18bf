pub mod alerts;
pub mod chart;
pub mod indicators;
pub mod levels;
pub mod scanner;
pub mod sessions;

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn round5(x: f64) -> f64 {
    (x * 100_000.0).round() / 100_000.0
}
