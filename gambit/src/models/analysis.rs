use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::content::{ContentType, VoiceMode};
use super::game::{GameOutcome, GameStateSnapshot, MoveQuality, Side};
use crate::error::GambitError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    Tense,
    Brilliant,
    BlunderRecovery,
    Calm,
    Dramatic,
    Mysterious,
    Triumphant,
}

impl Emotion {
    pub fn hashtag(&self) -> &'static str {
        match self {
            Self::Tense => "#Tension",
            Self::Brilliant => "#Brilliancy",
            Self::BlunderRecovery => "#Comeback",
            Self::Calm => "#Positional",
            Self::Dramatic => "#Drama",
            Self::Mysterious => "#Endgame",
            Self::Triumphant => "#Checkmate",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tense => write!(f, "tense"),
            Self::Brilliant => write!(f, "brilliant"),
            Self::BlunderRecovery => write!(f, "blunder-recovery"),
            Self::Calm => write!(f, "calm"),
            Self::Dramatic => write!(f, "dramatic"),
            Self::Mysterious => write!(f, "mysterious"),
            Self::Triumphant => write!(f, "triumphant"),
        }
    }
}

/// Classified emotion for one ply (or one sentence of prose).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapEntry {
    pub ply_index: usize,
    pub move_number: u32,
    pub emotion: Emotion,
    /// Always within `[0, 1]`.
    pub intensity: f64,
    /// SAN for games, a sentence excerpt for prose.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_quality: Option<MoveQuality>,
    pub evaluation: f64,
    pub evaluation_delta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece_count: Option<u32>,
}

impl HeatmapEntry {
    /// Selector input for this entry. Prose entries carry neither side nor
    /// evaluation; their running sentiment total is not a chess score.
    pub fn snapshot(&self) -> GameStateSnapshot {
        if self.side.is_none() {
            return GameStateSnapshot {
                last_move_quality: self.move_quality,
                ..GameStateSnapshot::for_passage(self.move_number)
            };
        }
        GameStateSnapshot {
            move_number: self.move_number,
            evaluation: self.evaluation,
            time_left_seconds: self.time_left_seconds,
            piece_count: self.piece_count,
            last_move_quality: self.move_quality,
            side: self.side,
            prose: false,
        }
    }
}

pub type Heatmap = Vec<HeatmapEntry>;

/// A heatmap entry promoted to a key moment, with the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMoment {
    #[serde(flatten)]
    pub entry: HeatmapEntry,
    pub rationale: String,
}

impl KeyMoment {
    pub fn ply_index(&self) -> usize {
        self.entry.ply_index
    }

    pub fn emotion(&self) -> Emotion {
        self.entry.emotion
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    CriticalMoment,
    TimePressure,
    Endgame,
    Recovery,
    Reflective,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalMoment => write!(f, "critical-moment"),
            Self::TimePressure => write!(f, "time-pressure"),
            Self::Endgame => write!(f, "endgame"),
            Self::Recovery => write!(f, "recovery"),
            Self::Reflective => write!(f, "reflective"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Urgent,
    Suspenseful,
    Contemplative,
    Encouraging,
    Reflective,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Urgent => write!(f, "urgent"),
            Self::Suspenseful => write!(f, "suspenseful"),
            Self::Contemplative => write!(f, "contemplative"),
            Self::Encouraging => write!(f, "encouraging"),
            Self::Reflective => write!(f, "reflective"),
        }
    }
}

/// A catalog template filled in for one decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationTemplate {
    pub kind: TemplateKind,
    /// Narration text with `*emphasis*` and `[pause]` markers.
    pub text: String,
    pub voice_mode: VoiceMode,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeAdaptation {
    pub ply_index: usize,
    #[serde(flatten)]
    pub template: NarrationTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSnippet {
    pub source_ply_index: usize,
    pub excerpt_text: String,
    pub suggested_hashtags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub headers: BTreeMap<String, String>,
    pub ply_count: usize,
    pub outcome: GameOutcome,
}

/// Everything produced for one content item. Stages that were disabled or
/// could not run leave their field as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub content_type: ContentType,
    pub content_digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameSummary>,
    pub heatmap: Option<Heatmap>,
    pub key_moments: Option<Vec<KeyMoment>>,
    pub narrative_adaptations: Option<Vec<NarrativeAdaptation>>,
    pub social_snippets: Option<Vec<SocialSnippet>>,
    pub processing_time_ms: u64,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub index: usize,
    pub outcome: std::result::Result<AnalysisResult, GambitError>,
}

impl BatchEntry {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-item outcomes in input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
    pub processing_time_ms: u64,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_serializes_kebab_case() {
        let json = serde_json::to_string(&Emotion::BlunderRecovery).unwrap();
        assert_eq!(json, "\"blunder-recovery\"");
        assert_eq!(Emotion::BlunderRecovery.to_string(), "blunder-recovery");
    }

    #[test]
    fn test_narrative_adaptation_flattens_template() {
        let adaptation = NarrativeAdaptation {
            ply_index: 12,
            template: NarrationTemplate {
                kind: TemplateKind::TimePressure,
                text: "The clock *bites*.".to_string(),
                voice_mode: VoiceMode::Expressive,
                tone: Tone::Urgent,
            },
        };
        let value = serde_json::to_value(&adaptation).unwrap();
        assert_eq!(value["plyIndex"], 12);
        assert_eq!(value["kind"], "time-pressure");
        assert_eq!(value["voiceMode"], "expressive");
        assert_eq!(value["tone"], "urgent");
    }

    #[test]
    fn test_batch_result_counts() {
        let result = BatchResult {
            entries: vec![
                BatchEntry {
                    index: 0,
                    outcome: Err(GambitError::Cancelled),
                },
                BatchEntry {
                    index: 1,
                    outcome: Err(GambitError::Timeout { limit_ms: 10 }),
                },
            ],
            processing_time_ms: 3,
        };
        assert_eq!(result.len(), 2);
        assert_eq!(result.succeeded(), 0);
        assert_eq!(result.failed(), 2);
    }
}
