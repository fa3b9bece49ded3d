use serde::Deserialize;
use std::env;

use crate::error::{GambitError, Result};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub evaluation: EvaluationConfig,
    pub snippets: SnippetConfig,
    pub logging: LoggingConfig,
}

/// Limits applied by the orchestrator to single items and batches.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_content_bytes: usize,
    pub max_batch_size: usize,
    pub batch_concurrency: usize,
    pub item_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: 100_000,
            max_batch_size: 10,
            batch_concurrency: 10,
            item_timeout_ms: 30_000,
        }
    }
}

/// Move-quality thresholds and evaluator tuning, all in pawn units.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    pub inaccuracy_threshold: f64,
    pub mistake_threshold: f64,
    pub blunder_threshold: f64,
    /// A mover at or below minus this value is considered lost.
    pub losing_threshold: f64,
    /// Lookahead gain a sacrifice must keep to count as brilliant.
    pub brilliant_margin: f64,
    pub quiescence_depth: u8,
    pub mobility_weight: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            inaccuracy_threshold: 0.5,
            mistake_threshold: 1.0,
            blunder_threshold: 2.0,
            losing_threshold: 2.0,
            brilliant_margin: 0.5,
            quiescence_depth: 3,
            mobility_weight: 0.02,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnippetConfig {
    pub char_budget: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self { char_budget: 280 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {s}")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        let evaluation = EvaluationConfig::default();
        Self {
            pipeline: PipelineConfig {
                max_content_bytes: parse_env_or(
                    "GAMBIT_MAX_CONTENT_BYTES",
                    pipeline.max_content_bytes,
                ),
                max_batch_size: parse_env_or("GAMBIT_MAX_BATCH_SIZE", pipeline.max_batch_size),
                batch_concurrency: parse_env_or(
                    "GAMBIT_BATCH_CONCURRENCY",
                    pipeline.batch_concurrency,
                ),
                item_timeout_ms: parse_env_or("GAMBIT_ITEM_TIMEOUT_MS", pipeline.item_timeout_ms),
            },
            evaluation: EvaluationConfig {
                inaccuracy_threshold: parse_env_or(
                    "GAMBIT_INACCURACY_THRESHOLD",
                    evaluation.inaccuracy_threshold,
                ),
                mistake_threshold: parse_env_or(
                    "GAMBIT_MISTAKE_THRESHOLD",
                    evaluation.mistake_threshold,
                ),
                blunder_threshold: parse_env_or(
                    "GAMBIT_BLUNDER_THRESHOLD",
                    evaluation.blunder_threshold,
                ),
                losing_threshold: parse_env_or(
                    "GAMBIT_LOSING_THRESHOLD",
                    evaluation.losing_threshold,
                ),
                brilliant_margin: parse_env_or(
                    "GAMBIT_BRILLIANT_MARGIN",
                    evaluation.brilliant_margin,
                ),
                quiescence_depth: parse_env_or(
                    "GAMBIT_QUIESCENCE_DEPTH",
                    evaluation.quiescence_depth,
                ),
                mobility_weight: parse_env_or("GAMBIT_MOBILITY_WEIGHT", evaluation.mobility_weight),
            },
            snippets: SnippetConfig {
                char_budget: parse_env_or(
                    "GAMBIT_SNIPPET_CHAR_BUDGET",
                    SnippetConfig::default().char_budget,
                ),
            },
            logging: LoggingConfig {
                format: parse_env_or("GAMBIT_LOG_FORMAT", LogFormat::Pretty),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Compiled-in defaults, ignoring the environment.
    pub fn builtin() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            evaluation: EvaluationConfig::default(),
            snippets: SnippetConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let eval = &self.evaluation;
        let thresholds = [
            eval.inaccuracy_threshold,
            eval.mistake_threshold,
            eval.blunder_threshold,
        ];
        if thresholds.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(GambitError::Validation(
                "move-quality thresholds must be finite and non-negative".to_string(),
            ));
        }
        if !(eval.inaccuracy_threshold < eval.mistake_threshold
            && eval.mistake_threshold < eval.blunder_threshold)
        {
            return Err(GambitError::Validation(format!(
                "move-quality thresholds must increase: inaccuracy {} < mistake {} < blunder {}",
                eval.inaccuracy_threshold, eval.mistake_threshold, eval.blunder_threshold
            )));
        }
        if self.pipeline.max_batch_size == 0 {
            return Err(GambitError::Validation(
                "max batch size must be at least 1".to_string(),
            ));
        }
        if self.pipeline.batch_concurrency == 0 {
            return Err(GambitError::Validation(
                "batch concurrency must be at least 1".to_string(),
            ));
        }
        if self.pipeline.max_content_bytes == 0 {
            return Err(GambitError::Validation(
                "max content size must be at least 1 byte".to_string(),
            ));
        }
        if self.snippets.char_budget == 0 {
            return Err(GambitError::Validation(
                "snippet character budget must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
