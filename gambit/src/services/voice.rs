//! Fire-and-forget hand-off of narration text to a voice-rendering service.
//!
//! The pipeline only ever calls [`VoiceDispatcher::dispatch`], which never
//! blocks. A [`VoiceConsumer`] task drains the channel into a
//! [`VoiceRenderer`] until the channel closes or its token is cancelled.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{Tone, VoiceMode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationRequest {
    pub analysis_id: String,
    pub ply_index: usize,
    pub text: String,
    pub voice_mode: VoiceMode,
    pub tone: Tone,
}

#[async_trait]
pub trait VoiceRenderer: Send + Sync {
    fn name(&self) -> &str;

    async fn render(&self, request: &NarrationRequest) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct VoiceDispatcher {
    tx: mpsc::UnboundedSender<NarrationRequest>,
}

impl VoiceDispatcher {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NarrationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns `false` when nobody is listening any more.
    pub fn dispatch(&self, request: NarrationRequest) -> bool {
        match self.tx.send(request) {
            Ok(()) => true,
            Err(mpsc::error::SendError(dropped)) => {
                tracing::debug!(
                    ply = dropped.ply_index,
                    "Voice consumer is gone, narration dropped"
                );
                false
            }
        }
    }
}

pub struct VoiceConsumer {
    rx: mpsc::UnboundedReceiver<NarrationRequest>,
    renderer: Arc<dyn VoiceRenderer>,
}

impl VoiceConsumer {
    pub fn new(
        rx: mpsc::UnboundedReceiver<NarrationRequest>,
        renderer: Arc<dyn VoiceRenderer>,
    ) -> Self {
        Self { rx, renderer }
    }

    /// Runs until every dispatcher is dropped or `token` is cancelled.
    /// Returns the number of narrations rendered.
    pub async fn run(mut self, token: CancellationToken) -> usize {
        let mut rendered = 0;
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Voice hand-off shutting down...");
                    break;
                }
                next = self.rx.recv() => {
                    let Some(request) = next else { break };
                    match self.renderer.render(&request).await {
                        Ok(()) => rendered += 1,
                        Err(e) => tracing::warn!(
                            renderer = self.renderer.name(),
                            ply = request.ply_index,
                            "Voice rendering failed: {}",
                            e
                        ),
                    }
                }
            }
        }
        rendered
    }
}

/// Logs narration instead of synthesizing audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

#[async_trait]
impl VoiceRenderer for LogRenderer {
    fn name(&self) -> &str {
        "log"
    }

    async fn render(&self, request: &NarrationRequest) -> Result<()> {
        tracing::info!(
            analysis_id = %request.analysis_id,
            ply = request.ply_index,
            voice_mode = %request.voice_mode,
            tone = %request.tone,
            "{}",
            request.text
        );
        Ok(())
    }
}
