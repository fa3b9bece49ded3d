pub mod emotion;
pub mod moments;
pub mod social;
pub mod text;

pub use emotion::{classify, classify_with_context};
pub use moments::extract;
pub use social::summarize;
pub use text::analyze_text;
