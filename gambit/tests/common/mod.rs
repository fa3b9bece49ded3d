#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chess::{Board, Piece, Square};

use gambit::config::Config;
use gambit::error::Result;
use gambit::evaluation::PositionEvaluator;
use gambit::models::{ContentItem, ContentType};
use gambit::processing::AnalysisPipeline;

pub const SCHOLARS_MATE: &str = "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6?? 4. Qxf7# 1-0";

pub const FOOLS_MATE: &str = "1. f3 e5 2. g4 Qh4# 0-1";

/// Morphy vs. Duke of Brunswick and Count Isouard, Paris 1858.
pub const OPERA_GAME: &str = r#"[Event "Paris"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 7. Qb3 Qe7
8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7
14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8# 1-0"#;

pub const QUIET_GAMES: &[&str] = &[
    "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *",
    "1. d4 d5 2. c4 e6 3. Nc3 Nf6 *",
    "1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 a6 *",
    "1. c4 e5 2. Nc3 Nf6 3. g3 d5 4. cxd5 Nxd5 *",
    "1. Nf3 d5 2. g3 Nf6 3. Bg2 e6 4. O-O Be7 *",
];

pub const ILLEGAL_GAME: &str = "1. e4 e5 2. Ke3 *";

/// Start position with the white king missing.
pub const KINGLESS_GAME: &str =
    "[FEN \"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR w kq - 0 1\"]\n\n1. e4 *";

pub fn notation(content: &str) -> ContentItem {
    ContentItem::new(content, ContentType::Notation)
}

/// Ten legal games with an illegal one at `illegal_at`, if given.
pub fn batch_of_ten(illegal_at: Option<usize>) -> Vec<ContentItem> {
    (0..10)
        .map(|i| {
            if Some(i) == illegal_at {
                notation(ILLEGAL_GAME)
            } else {
                notation(QUIET_GAMES[i % QUIET_GAMES.len()])
            }
        })
        .collect()
}

/// Scores every position as dead level.
pub struct LevelEvaluator;

#[async_trait]
impl PositionEvaluator for LevelEvaluator {
    fn name(&self) -> &str {
        "level"
    }

    async fn evaluate(&self, _board: &Board) -> Result<f64> {
        Ok(0.0)
    }
}

/// Sleeps before every evaluation and counts how many it started.
pub struct SlowEvaluator {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowEvaluator {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PositionEvaluator for SlowEvaluator {
    fn name(&self) -> &str {
        "slow"
    }

    async fn evaluate(&self, _board: &Board) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(0.0)
    }
}

/// Stalls only on positions where white has castled short, so in
/// `QUIET_GAMES` just the last game is slow.
pub struct CastledStallEvaluator {
    pub delay: Duration,
}

#[async_trait]
impl PositionEvaluator for CastledStallEvaluator {
    fn name(&self) -> &str {
        "castled-stall"
    }

    async fn evaluate(&self, board: &Board) -> Result<f64> {
        if board.piece_on(Square::G1) == Some(Piece::King) {
            tokio::time::sleep(self.delay).await;
        }
        Ok(0.0)
    }
}

pub fn pipeline_with(
    evaluator: Arc<dyn PositionEvaluator>,
    tune: impl FnOnce(&mut Config),
) -> AnalysisPipeline {
    let mut config = Config::builtin();
    tune(&mut config);
    AnalysisPipeline::with_evaluator(&config, evaluator).unwrap()
}

pub fn material_pipeline() -> AnalysisPipeline {
    AnalysisPipeline::new(&Config::builtin()).unwrap()
}
