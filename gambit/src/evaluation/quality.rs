use crate::config::EvaluationConfig;
use crate::models::MoveQuality;

/// Mover-relative cut-offs for grading a ply.
///
/// A loss exactly on a threshold belongs to the less severe class: a loss of
/// 2.0 with a blunder threshold of 2.0 is a mistake, not a blunder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    pub inaccuracy: f64,
    pub mistake: f64,
    pub blunder: f64,
    pub losing: f64,
    pub brilliant_margin: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self::from(&EvaluationConfig::default())
    }
}

impl From<&EvaluationConfig> for QualityThresholds {
    fn from(config: &EvaluationConfig) -> Self {
        Self {
            inaccuracy: config.inaccuracy_threshold,
            mistake: config.mistake_threshold,
            blunder: config.blunder_threshold,
            losing: config.losing_threshold,
            brilliant_margin: config.brilliant_margin,
        }
    }
}

impl QualityThresholds {
    /// Grades an evaluation loss suffered by the mover, in pawns.
    pub fn grade_loss(&self, loss: f64) -> MoveQuality {
        if loss > self.blunder {
            MoveQuality::Blunder
        } else if loss > self.mistake {
            MoveQuality::Mistake
        } else if loss > self.inaccuracy {
            MoveQuality::Inaccuracy
        } else {
            MoveQuality::Good
        }
    }

    /// Mover went from lost to at least level in one ply.
    pub fn is_recovery(&self, before: f64, after: f64) -> bool {
        before <= -self.losing && after >= 0.0
    }

    /// The worst reply still leaves the mover ahead of where they started.
    pub fn sacrifice_holds(&self, before: f64, worst_reply: f64) -> bool {
        worst_reply >= before + self.brilliant_margin
    }
}
