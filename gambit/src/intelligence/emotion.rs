//! Turns evaluated plies (or scored sentences) into the emotional heatmap.
//!
//! Intensity starts from a min-max scaling of `|evaluationDelta|` over the
//! whole input, capped at [`DELTA_CAP`] pawns so a mate score does not flatten
//! every other swing, then receives small additive boosts for move quality,
//! game phase and clock or material pressure. The result is clamped to
//! `[0, 1]`, so the largest swing always scores exactly 1.0.

use crate::error::{GambitError, Result};
use crate::models::{
    Emotion, EvaluatedPly, GamePhase, GameStateSnapshot, Heatmap, HeatmapEntry, MoveQuality, Side,
};

pub const DELTA_CAP: f64 = 10.0;
pub const TIME_PRESSURE_SECONDS: f64 = 60.0;
pub const LOW_MATERIAL_PIECES: u32 = 10;

const DRAMATIC_BASE: f64 = 0.75;
const TENSE_BASE: f64 = 0.4;

/// Everything the classifier looks at for one heatmap slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Signal {
    pub ply_index: usize,
    pub move_number: u32,
    pub label: String,
    pub side: Option<Side>,
    pub move_quality: Option<MoveQuality>,
    pub evaluation: f64,
    pub evaluation_delta: f64,
    pub annotation: Option<String>,
    pub time_left_seconds: Option<f64>,
    pub piece_count: Option<u32>,
    pub phase: GamePhase,
    pub is_checkmate: bool,
    /// The previous slot was an opponent's mistake and this one answers it.
    pub answers_error: bool,
}

impl Signal {
    fn in_time_pressure(&self) -> bool {
        self.time_left_seconds
            .is_some_and(|t| t < TIME_PRESSURE_SECONDS)
    }

    fn low_material(&self) -> bool {
        self.piece_count.is_some_and(|p| p < LOW_MATERIAL_PIECES)
    }
}

pub fn classify(plies: &[EvaluatedPly]) -> Result<Heatmap> {
    classify_signals(&signals_from_plies(plies, None))
}

/// Like [`classify`], with caller-supplied clock and material context for
/// each ply. `snapshots[i]` belongs to `plies[i]`.
pub fn classify_with_context(
    plies: &[EvaluatedPly],
    snapshots: &[GameStateSnapshot],
) -> Result<Heatmap> {
    if snapshots.len() != plies.len() {
        return Err(GambitError::Classification(format!(
            "{} context snapshots supplied for {} plies",
            snapshots.len(),
            plies.len()
        )));
    }
    classify_signals(&signals_from_plies(plies, Some(snapshots)))
}

fn signals_from_plies(plies: &[EvaluatedPly], snapshots: Option<&[GameStateSnapshot]>) -> Vec<Signal> {
    plies
        .iter()
        .enumerate()
        .map(|(i, evaluated)| {
            let ply = &evaluated.ply;
            let snapshot = snapshots.and_then(|s| s.get(i));

            let time_left_seconds = snapshot
                .and_then(|s| s.time_left_seconds)
                .or(ply.clock_seconds);
            let piece_count = snapshot
                .and_then(|s| s.piece_count)
                .unwrap_or(ply.piece_count);

            let answers_error = i > 0 && {
                let prev = &plies[i - 1];
                prev.move_quality.is_error()
                    && prev.ply.side_to_move != ply.side_to_move
                    && evaluated.move_quality.is_sound()
            };

            Signal {
                ply_index: ply.index,
                move_number: ply.move_number,
                label: ply.san.clone(),
                side: Some(ply.side_to_move),
                move_quality: Some(evaluated.move_quality),
                evaluation: evaluated.evaluation,
                evaluation_delta: evaluated.evaluation_delta,
                annotation: ply.annotation_text.clone(),
                time_left_seconds,
                piece_count: Some(piece_count),
                phase: GamePhase::for_position(ply.move_number, piece_count),
                is_checkmate: ply.is_checkmate,
                answers_error,
            }
        })
        .collect()
}

pub(crate) fn classify_signals(signals: &[Signal]) -> Result<Heatmap> {
    if let Some(bad) = signals
        .iter()
        .find(|s| !s.evaluation.is_finite() || !s.evaluation_delta.is_finite())
    {
        return Err(GambitError::Classification(format!(
            "non-finite evaluation at ply {}",
            bad.ply_index
        )));
    }

    let magnitudes: Vec<f64> = signals
        .iter()
        .map(|s| s.evaluation_delta.abs().min(DELTA_CAP))
        .collect();
    let lo = magnitudes.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = magnitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let heatmap = signals
        .iter()
        .zip(&magnitudes)
        .map(|(signal, &magnitude)| {
            let base = if hi > lo {
                (magnitude - lo) / (hi - lo)
            } else if hi > 0.0 {
                1.0
            } else {
                0.0
            };

            let intensity = if signal.is_checkmate {
                1.0
            } else {
                (base + boost(signal)).clamp(0.0, 1.0)
            };

            HeatmapEntry {
                ply_index: signal.ply_index,
                move_number: signal.move_number,
                emotion: emotion_for(signal, base),
                intensity,
                label: signal.label.clone(),
                side: signal.side,
                move_quality: signal.move_quality,
                evaluation: signal.evaluation,
                evaluation_delta: signal.evaluation_delta,
                annotation: signal.annotation.clone(),
                time_left_seconds: signal.time_left_seconds,
                piece_count: signal.piece_count,
            }
        })
        .collect();

    Ok(heatmap)
}

fn boost(signal: &Signal) -> f64 {
    let quality = match signal.move_quality {
        Some(MoveQuality::Blunder | MoveQuality::Brilliant) => 0.25,
        Some(MoveQuality::Mistake) => 0.15,
        Some(MoveQuality::Inaccuracy | MoveQuality::Forced) => 0.05,
        Some(MoveQuality::Good) | None => 0.0,
    };
    let phase = match signal.phase {
        GamePhase::Opening => 0.0,
        GamePhase::Middlegame => 0.02,
        GamePhase::Endgame => 0.05,
    };
    let clock = if signal.in_time_pressure() { 0.15 } else { 0.0 };
    let material = if signal.low_material() { 0.05 } else { 0.0 };

    quality + phase + clock + material
}

/// First matching rule wins.
fn emotion_for(signal: &Signal, base: f64) -> Emotion {
    let quality = signal.move_quality;

    if signal.is_checkmate {
        Emotion::Triumphant
    } else if quality == Some(MoveQuality::Brilliant) {
        Emotion::Brilliant
    } else if signal.answers_error {
        Emotion::BlunderRecovery
    } else if quality == Some(MoveQuality::Blunder) || base >= DRAMATIC_BASE {
        Emotion::Dramatic
    } else if matches!(
        quality,
        Some(MoveQuality::Mistake | MoveQuality::Inaccuracy | MoveQuality::Forced)
    ) || signal.in_time_pressure()
    {
        Emotion::Tense
    } else if signal.phase == GamePhase::Endgame {
        Emotion::Mysterious
    } else if base >= TENSE_BASE {
        Emotion::Tense
    } else {
        Emotion::Calm
    }
}
