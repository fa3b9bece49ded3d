mod movetext;
mod parser;
mod san;

pub use parser::NotationParser;

pub(crate) use san::resolve;
