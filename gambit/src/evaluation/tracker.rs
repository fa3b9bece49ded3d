use std::str::FromStr;
use std::sync::Arc;

use chess::{Board, MoveGen};

use super::evaluator::{piece_value, PositionEvaluator};
use super::quality::QualityThresholds;
use crate::config::EvaluationConfig;
use crate::error::{GambitError, Result};
use crate::models::{EvaluatedPly, MoveQuality, Ply};
use crate::notation::resolve;

/// Scores every ply with a [`PositionEvaluator`] and grades the move.
pub struct EvaluationTracker {
    evaluator: Arc<dyn PositionEvaluator>,
    thresholds: QualityThresholds,
}

impl EvaluationTracker {
    pub fn new(evaluator: Arc<dyn PositionEvaluator>, config: &EvaluationConfig) -> Self {
        Self {
            evaluator,
            thresholds: QualityThresholds::from(config),
        }
    }

    pub fn evaluator_name(&self) -> &str {
        self.evaluator.name()
    }

    pub async fn evaluate(&self, plies: &[Ply]) -> Result<Vec<EvaluatedPly>> {
        let Some(first) = plies.first() else {
            return Ok(Vec::new());
        };

        let mut previous = self
            .score(&board_from_fen(&first.fen_before, first.index)?, first.index)
            .await?;
        let mut evaluated = Vec::with_capacity(plies.len());

        for ply in plies {
            let before = board_from_fen(&ply.fen_before, ply.index)?;
            let after = board_from_fen(&ply.fen_after, ply.index)?;
            let evaluation = self.score(&after, ply.index).await?;
            // Centipawn precision keeps threshold comparisons free of float noise
            let evaluation_delta = ((evaluation - previous) * 100.0).round() / 100.0;
            let move_quality = self
                .grade(ply, &before, &after, previous, evaluation_delta)
                .await?;

            evaluated.push(EvaluatedPly {
                ply: ply.clone(),
                evaluation,
                evaluation_delta,
                move_quality,
            });
            previous = evaluation;
        }

        tracing::debug!(
            plies = evaluated.len(),
            evaluator = self.evaluator.name(),
            "Evaluated game"
        );
        Ok(evaluated)
    }

    async fn score(&self, board: &Board, ply: usize) -> Result<f64> {
        let value = self.evaluator.evaluate(board).await?;
        if !value.is_finite() {
            return Err(GambitError::Classification(format!(
                "evaluator '{}' returned {value} at ply {ply}",
                self.evaluator.name()
            )));
        }
        Ok(value)
    }

    async fn grade(
        &self,
        ply: &Ply,
        before: &Board,
        after: &Board,
        previous: f64,
        delta: f64,
    ) -> Result<MoveQuality> {
        if ply.legal_move_count <= 1 {
            return Ok(MoveQuality::Forced);
        }

        let sign = ply.side_to_move.sign();
        let mover_before = previous * sign;
        let mover_gain = delta * sign;

        let quality = self.thresholds.grade_loss(-mover_gain);
        if quality != MoveQuality::Good || mover_gain < 0.0 {
            return Ok(quality);
        }

        if self
            .thresholds
            .is_recovery(mover_before, mover_before + mover_gain)
        {
            return Ok(MoveQuality::Brilliant);
        }

        if is_sacrifice(ply, before, after) {
            if let Some(worst) = self.worst_reply(after, sign).await? {
                if self.thresholds.sacrifice_holds(mover_before, worst) {
                    return Ok(MoveQuality::Brilliant);
                }
            }
        }

        Ok(MoveQuality::Good)
    }

    /// Mover-relative score after the opponent's best reply, one ply deep.
    async fn worst_reply(&self, after: &Board, sign: f64) -> Result<Option<f64>> {
        let mut worst: Option<f64> = None;
        for reply in MoveGen::new_legal(after) {
            let board = after.make_move_new(reply);
            let value = self.evaluator.evaluate(&board).await? * sign;
            if !value.is_finite() {
                return Err(GambitError::Classification(format!(
                    "evaluator '{}' returned {value} during lookahead",
                    self.evaluator.name()
                )));
            }
            worst = Some(worst.map_or(value, |w| w.min(value)));
        }
        Ok(worst)
    }
}

fn board_from_fen(fen: &str, ply: usize) -> Result<Board> {
    Board::from_str(fen)
        .map_err(|e| GambitError::Classification(format!("unreadable position at ply {ply}: {e:?}")))
}

/// The moved piece lands where the opponent can take it and is worth more
/// than whatever it captured.
fn is_sacrifice(ply: &Ply, before: &Board, after: &Board) -> bool {
    let Ok(chess_move) = resolve(before, &ply.san) else {
        return false;
    };
    let dest = chess_move.get_dest();
    let Some(moved) = chess_move
        .get_promotion()
        .or_else(|| before.piece_on(chess_move.get_source()))
    else {
        return false;
    };

    let captured = before.piece_on(dest).map_or(0.0, piece_value);
    if piece_value(moved) <= captured {
        return false;
    }

    MoveGen::new_legal(after).any(|reply| reply.get_dest() == dest)
}
