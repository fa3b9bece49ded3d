mod evaluator;
mod quality;
mod tracker;

pub use evaluator::{piece_value, MaterialEvaluator, PositionEvaluator, MATE_SCORE};
pub use quality::QualityThresholds;
pub use tracker::EvaluationTracker;
