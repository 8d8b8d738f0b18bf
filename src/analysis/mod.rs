pub mod commentary;
pub mod runner;

pub use commentary::{Commentary, Commentator, NoCommentator};
pub use runner::{AnalysisReport, AnalysisRequest, AnalysisRunner};
