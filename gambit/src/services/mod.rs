mod sink;
mod voice;

pub use sink::{JsonDirSink, ResultSink};
pub use voice::{LogRenderer, NarrationRequest, VoiceConsumer, VoiceDispatcher, VoiceRenderer};
