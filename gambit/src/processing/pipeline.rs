use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use nanoid::nanoid;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{GambitError, Result};
use crate::evaluation::{EvaluationTracker, MaterialEvaluator, PositionEvaluator};
use crate::intelligence::{analyze_text, classify, extract, summarize};
use crate::models::{
    AnalysisConfig, AnalysisResult, BatchEntry, BatchResult, ContentItem, ContentType,
    GameSummary, Heatmap, HeatmapEntry, KeyMoment, NarrativeAdaptation,
};
use crate::narrative::NarrativeSelector;
use crate::notation::NotationParser;
use crate::services::{NarrationRequest, VoiceDispatcher};

/// Runs content items through parsing, evaluation, classification,
/// key-moment extraction, narration and snippets.
///
/// Holds no per-request state: cloning is cheap and clones can analyze
/// concurrently.
#[derive(Clone)]
pub struct AnalysisPipeline {
    config: Arc<Config>,
    parser: NotationParser,
    tracker: Arc<EvaluationTracker>,
    voice: Option<VoiceDispatcher>,
}

impl AnalysisPipeline {
    pub fn new(config: &Config) -> Result<Self> {
        let evaluator = Arc::new(MaterialEvaluator::new(&config.evaluation));
        Self::with_evaluator(config, evaluator)
    }

    pub fn with_evaluator(config: &Config, evaluator: Arc<dyn PositionEvaluator>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: Arc::new(EvaluationTracker::new(evaluator, &config.evaluation)),
            config: Arc::new(config.clone()),
            parser: NotationParser::new(),
            voice: None,
        })
    }

    /// Hands every selected narration to `dispatcher` without waiting on it.
    pub fn with_voice(mut self, dispatcher: VoiceDispatcher) -> Self {
        self.voice = Some(dispatcher);
        self
    }

    pub async fn analyze(
        &self,
        item: &ContentItem,
        options: &AnalysisConfig,
    ) -> Result<AnalysisResult> {
        options.check()?;
        item.validate(self.config.pipeline.max_content_bytes)?;
        self.run(item, options).await
    }

    pub async fn analyze_with_timeout(
        &self,
        item: &ContentItem,
        options: &AnalysisConfig,
    ) -> Result<AnalysisResult> {
        let limit_ms = self.config.pipeline.item_timeout_ms;
        match tokio::time::timeout(Duration::from_millis(limit_ms), self.analyze(item, options))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(GambitError::Timeout { limit_ms }),
        }
    }

    /// Analyzes every item independently and reports outcomes in input order.
    ///
    /// Invalid options, an empty batch and an oversized batch fail the whole
    /// call. Past that, each item succeeds or fails on its own. Once `cancel`
    /// fires, items that have not started report [`GambitError::Cancelled`]
    /// while items already running finish normally.
    pub async fn analyze_batch(
        &self,
        items: Vec<ContentItem>,
        options: &AnalysisConfig,
        cancel: &CancellationToken,
    ) -> Result<BatchResult> {
        options.check()?;
        if items.is_empty() {
            return Err(GambitError::Validation(
                "Batch must contain at least one item".to_string(),
            ));
        }
        let limit = self.config.pipeline.max_batch_size;
        if items.len() > limit {
            return Err(GambitError::Capacity {
                limit,
                actual: items.len(),
            });
        }

        let started = Instant::now();
        let total = items.len();
        let entries = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                self.clone()
                    .run_entry(index, item, options.clone(), cancel.clone())
            })
            .buffered(self.config.pipeline.batch_concurrency)
            .collect::<Vec<_>>()
            .await;

        let batch = BatchResult {
            entries,
            processing_time_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            items = total,
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            elapsed_ms = batch.processing_time_ms,
            "Batch analysis complete"
        );
        Ok(batch)
    }

    async fn run_entry(
        self,
        index: usize,
        item: ContentItem,
        options: AnalysisConfig,
        cancel: CancellationToken,
    ) -> BatchEntry {
        if cancel.is_cancelled() {
            return BatchEntry {
                index,
                outcome: Err(GambitError::Cancelled),
            };
        }

        let task =
            tokio::spawn(async move { self.analyze_with_timeout(&item, &options).await });
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(GambitError::Internal(format!("analysis task failed: {e}"))),
        };

        if let Err(e) = &outcome {
            tracing::warn!(item_index = index, code = %e.code(), "Batch item failed: {}", e);
        }
        BatchEntry { index, outcome }
    }

    async fn run(&self, item: &ContentItem, options: &AnalysisConfig) -> Result<AnalysisResult> {
        let started = Instant::now();
        let analysis_id = nanoid!();
        let content_digest = format!("{:x}", Sha256::digest(item.content.as_bytes()));

        let (game, heatmap) = match item.content_type {
            ContentType::Notation => self.notation_stages(&item.content, options).await?,
            other => (None, self.text_stage(&item.content, other, options)?),
        };

        let key_moments = match (&heatmap, options.extract_key_moments) {
            (Some(heatmap), true) => Some(extract(
                heatmap,
                options.max_key_moments,
                options.min_moment_gap,
            )),
            _ => {
                tracing::debug!(%analysis_id, "Skipping key-moment extraction");
                None
            }
        };

        let narrative_adaptations = match (&heatmap, options.generate_narrative_adaptations) {
            (Some(heatmap), true) => {
                Some(self.narrate(&analysis_id, heatmap, key_moments.as_deref(), options))
            }
            _ => {
                tracing::debug!(%analysis_id, "Skipping narrative selection");
                None
            }
        };

        let social_snippets = match (&key_moments, options.generate_social_snippets) {
            (Some(moments), true) => Some(summarize(
                moments,
                options.target_audience,
                self.config.snippets.char_budget,
            )),
            _ => {
                tracing::debug!(%analysis_id, "Skipping social snippets");
                None
            }
        };

        let processing_time_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            %analysis_id,
            content_type = %item.content_type,
            heatmap_len = heatmap.as_ref().map_or(0, Vec::len),
            key_moments = key_moments.as_ref().map_or(0, Vec::len),
            elapsed_ms = processing_time_ms,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            analysis_id,
            content_type: item.content_type,
            content_digest,
            game,
            heatmap,
            key_moments,
            narrative_adaptations,
            social_snippets,
            processing_time_ms,
        })
    }

    async fn notation_stages(
        &self,
        content: &str,
        options: &AnalysisConfig,
    ) -> Result<(Option<GameSummary>, Option<Heatmap>)> {
        let parsed = self.parser.parse(content)?;
        let summary = GameSummary {
            headers: parsed.headers.clone(),
            ply_count: parsed.plies.len(),
            outcome: parsed.outcome,
        };

        if !options.include_emotional_analysis {
            tracing::debug!("Emotional analysis disabled, skipping evaluation");
            return Ok((Some(summary), None));
        }

        tracing::debug!(
            evaluator = self.tracker.evaluator_name(),
            plies = parsed.plies.len(),
            "Evaluating positions"
        );
        let evaluated = self.tracker.evaluate(&parsed.plies).await?;
        let heatmap = classify(&evaluated)?;
        Ok((Some(summary), Some(heatmap)))
    }

    fn text_stage(
        &self,
        content: &str,
        content_type: ContentType,
        options: &AnalysisConfig,
    ) -> Result<Option<Heatmap>> {
        if !options.include_emotional_analysis {
            tracing::debug!(%content_type, "Emotional analysis disabled");
            return Ok(None);
        }
        analyze_text(content, content_type).map(Some)
    }

    /// Narrates each key moment, or the single most intense entry when
    /// there are none.
    fn narrate(
        &self,
        analysis_id: &str,
        heatmap: &[HeatmapEntry],
        key_moments: Option<&[KeyMoment]>,
        options: &AnalysisConfig,
    ) -> Vec<NarrativeAdaptation> {
        let selector = NarrativeSelector::new(options.voice_mode, options.target_audience);
        let points: Vec<&HeatmapEntry> = match key_moments {
            Some(moments) if !moments.is_empty() => moments.iter().map(|m| &m.entry).collect(),
            _ => peak(heatmap).into_iter().collect(),
        };

        points
            .into_iter()
            .map(|entry| {
                let template = selector.select(&entry.snapshot());
                if let Some(voice) = &self.voice {
                    voice.dispatch(NarrationRequest {
                        analysis_id: analysis_id.to_string(),
                        ply_index: entry.ply_index,
                        text: template.text.clone(),
                        voice_mode: template.voice_mode,
                        tone: template.tone,
                    });
                }
                NarrativeAdaptation {
                    ply_index: entry.ply_index,
                    template,
                }
            })
            .collect()
    }
}

/// First entry with the highest intensity.
fn peak(heatmap: &[HeatmapEntry]) -> Option<&HeatmapEntry> {
    heatmap.iter().fold(None, |best, entry| match best {
        Some(b) if b.intensity >= entry.intensity => Some(b),
        _ => Some(entry),
    })
}
