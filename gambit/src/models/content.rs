use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{GambitError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Notation,
    Article,
    Video,
    Audio,
}

impl ContentType {
    /// Transcribed media goes through transcript cleanup before scoring.
    pub fn is_transcript(&self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notation => write!(f, "notation"),
            Self::Article => write!(f, "article"),
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "notation" | "pgn" => Ok(Self::Notation),
            "article" => Ok(Self::Article),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(format!("Unknown content type: {s}")),
        }
    }
}

/// One piece of content submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub content: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

impl ContentItem {
    pub fn new(content: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            content: content.into(),
            content_type,
        }
    }

    /// Size is measured in bytes, not characters.
    pub fn validate(&self, max_bytes: usize) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(GambitError::Validation(
                "Content cannot be empty".to_string(),
            ));
        }
        if self.content.len() > max_bytes {
            return Err(GambitError::Validation(format!(
                "Content is {} bytes, exceeding the limit of {max_bytes} bytes",
                self.content.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    Calm,
    Expressive,
    #[default]
    Dramatic,
    Poetic,
    Mysterious,
}

impl std::fmt::Display for VoiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calm => write!(f, "calm"),
            Self::Expressive => write!(f, "expressive"),
            Self::Dramatic => write!(f, "dramatic"),
            Self::Poetic => write!(f, "poetic"),
            Self::Mysterious => write!(f, "mysterious"),
        }
    }
}

impl std::str::FromStr for VoiceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calm" => Ok(Self::Calm),
            "expressive" => Ok(Self::Expressive),
            "dramatic" => Ok(Self::Dramatic),
            "poetic" => Ok(Self::Poetic),
            "mysterious" => Ok(Self::Mysterious),
            _ => Err(format!("Unknown voice mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    Casual,
    #[default]
    Competitive,
    Educational,
}

impl TargetAudience {
    /// Snippet length this audience tolerates, before the global cap.
    pub fn snippet_budget(&self) -> usize {
        match self {
            Self::Casual => 140,
            Self::Competitive | Self::Educational => 280,
        }
    }
}

impl std::fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Casual => write!(f, "casual"),
            Self::Competitive => write!(f, "competitive"),
            Self::Educational => write!(f, "educational"),
        }
    }
}

impl std::str::FromStr for TargetAudience {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "competitive" => Ok(Self::Competitive),
            "educational" => Ok(Self::Educational),
            _ => Err(format!("Unknown target audience: {s}")),
        }
    }
}

/// Per-request switches and tuning for one analysis run.
///
/// Deserialized from camelCase JSON; every field is optional on the wire and
/// falls back to its default. Unknown keys and unknown enum values are
/// rejected so typos surface as configuration errors.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub include_emotional_analysis: bool,
    pub generate_narrative_adaptations: bool,
    pub extract_key_moments: bool,
    pub generate_social_snippets: bool,
    pub voice_mode: VoiceMode,
    pub target_audience: TargetAudience,
    #[validate(range(min = 1, max = 32))]
    pub max_key_moments: usize,
    #[validate(range(max = 40))]
    pub min_moment_gap: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_emotional_analysis: true,
            generate_narrative_adaptations: true,
            extract_key_moments: true,
            generate_social_snippets: true,
            voice_mode: VoiceMode::default(),
            target_audience: TargetAudience::default(),
            max_key_moments: 8,
            min_moment_gap: 3,
        }
    }
}

impl AnalysisConfig {
    pub fn check(&self) -> Result<()> {
        Validate::validate(self)
            .map_err(|e| GambitError::Validation(format!("Invalid analysis config: {e}")))
    }
}

/// Batch manifest accepted by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub config: AnalysisConfig,
}
