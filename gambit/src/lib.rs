//! Chess content analysis: games and commentary in, emotional heatmaps,
//! key moments, narration scripts and social snippets out.
//!
//! [`processing::AnalysisPipeline`] is the entry point. Everything else is
//! usable on its own for callers that only need one stage.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod intelligence;
pub mod models;
pub mod narrative;
pub mod notation;
pub mod processing;
pub mod services;
