use async_trait::async_trait;
use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, ALL_PIECES};

use crate::config::EvaluationConfig;
use crate::error::{GambitError, Result};

/// Score assigned to a checkmated position, in pawn units.
pub const MATE_SCORE: f64 = 100.0;

/// Position-scoring capability behind the evaluation tracker.
///
/// Scores are in pawn units from white's point of view. Implementations must
/// be deterministic: the same board always yields the same score.
#[async_trait]
pub trait PositionEvaluator: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(&self, board: &Board) -> Result<f64>;
}

pub fn piece_value(piece: Piece) -> f64 {
    match piece {
        Piece::Pawn => 1.0,
        Piece::Knight => 3.0,
        Piece::Bishop => 3.25,
        Piece::Rook => 5.0,
        Piece::Queen => 9.0,
        Piece::King => 0.0,
    }
}

fn color_sign(color: Color) -> f64 {
    match color {
        Color::White => 1.0,
        Color::Black => -1.0,
    }
}

/// Material and mobility with a capture-only quiescence search.
#[derive(Debug, Clone)]
pub struct MaterialEvaluator {
    quiescence_depth: u8,
    mobility_weight: f64,
}

impl MaterialEvaluator {
    pub fn new(config: &EvaluationConfig) -> Self {
        Self {
            quiescence_depth: config.quiescence_depth,
            mobility_weight: config.mobility_weight,
        }
    }

    /// Synchronous scoring, rounded to centipawns.
    pub fn score(&self, board: &Board) -> f64 {
        let relative = self.quiesce(
            board,
            -MATE_SCORE - 1.0,
            MATE_SCORE + 1.0,
            self.quiescence_depth,
        );
        let absolute = relative * color_sign(board.side_to_move());
        (absolute * 100.0).round() / 100.0
    }

    /// Score from the side to move's perspective (negamax).
    fn quiesce(&self, board: &Board, mut alpha: f64, beta: f64, depth: u8) -> f64 {
        match board.status() {
            BoardStatus::Checkmate => return -MATE_SCORE,
            BoardStatus::Stalemate => return 0.0,
            BoardStatus::Ongoing => {}
        }

        let stand_pat = self.static_eval(board) * color_sign(board.side_to_move());
        if depth == 0 || stand_pat >= beta {
            return stand_pat;
        }
        alpha = alpha.max(stand_pat);

        let captures: Vec<ChessMove> = MoveGen::new_legal(board)
            .filter(|m| board.piece_on(m.get_dest()).is_some())
            .collect();

        for capture in captures {
            let next = board.make_move_new(capture);
            let score = -self.quiesce(&next, -beta, -alpha, depth - 1);
            if score >= beta {
                return score;
            }
            alpha = alpha.max(score);
        }
        alpha
    }

    /// White-positive material plus mobility, no search.
    fn static_eval(&self, board: &Board) -> f64 {
        let white = *board.color_combined(Color::White);
        let black = *board.color_combined(Color::Black);

        let material: f64 = ALL_PIECES
            .iter()
            .map(|&piece| {
                let pieces = *board.pieces(piece);
                let diff = (pieces & white).popcnt() as f64 - (pieces & black).popcnt() as f64;
                diff * piece_value(piece)
            })
            .sum();

        // The side not to move is measured on a null-move board; in check it has none.
        let own = MoveGen::new_legal(board).len() as f64;
        let other = board
            .null_move()
            .map_or(0.0, |b| MoveGen::new_legal(&b).len() as f64);
        let mobility = (own - other) * color_sign(board.side_to_move());

        material + mobility * self.mobility_weight
    }
}

impl Default for MaterialEvaluator {
    fn default() -> Self {
        Self::new(&EvaluationConfig::default())
    }
}

#[async_trait]
impl PositionEvaluator for MaterialEvaluator {
    fn name(&self) -> &str {
        "material"
    }

    /// The search is CPU-bound, so it runs on the blocking pool.
    async fn evaluate(&self, board: &Board) -> Result<f64> {
        let evaluator = self.clone();
        let board = *board;
        tokio::task::spawn_blocking(move || evaluator.score(&board))
            .await
            .map_err(|e| GambitError::Evaluation(format!("material search failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_start_position_is_balanced() {
        let evaluator = MaterialEvaluator::default();
        assert_eq!(evaluator.score(&Board::default()), 0.0);
    }

    #[test]
    fn test_extra_queen_favours_its_owner() {
        let evaluator = MaterialEvaluator::default();
        let white_up = Board::from_str("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let black_up = Board::from_str("3qk3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(evaluator.score(&white_up) > 8.0);
        assert!(evaluator.score(&black_up) < -8.0);
    }

    #[test]
    fn test_checkmate_and_stalemate_scores() {
        let evaluator = MaterialEvaluator::default();
        // Fool's mate, white to move and mated
        let mated =
            Board::from_str("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(evaluator.score(&mated), -MATE_SCORE);

        let stalemate = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(evaluator.score(&stalemate), 0.0);
    }

    #[test]
    fn test_quiescence_sees_hanging_piece() {
        let evaluator = MaterialEvaluator::default();
        // White to move can take the undefended black rook on d5
        let board = Board::from_str("4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        assert!(evaluator.score(&board) > 8.0);

        let shallow = MaterialEvaluator::new(&EvaluationConfig {
            quiescence_depth: 0,
            ..EvaluationConfig::default()
        });
        assert!(shallow.score(&board) < 5.0);
    }

    #[tokio::test]
    async fn test_evaluate_is_deterministic() {
        let evaluator = MaterialEvaluator::default();
        let board =
            Board::from_str("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
                .unwrap();
        let first = evaluator.evaluate(&board).await.unwrap();
        let second = evaluator.evaluate(&board).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(evaluator.name(), "material");
    }
}
