use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// +1 for white, -1 for black; converts white-positive scores to the mover's view.
    pub fn sign(&self) -> f64 {
        match self {
            Self::White => 1.0,
            Self::Black => -1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }
}

impl From<chess::Color> for Side {
    fn from(color: chess::Color) -> Self {
        match color {
            chess::Color::White => Self::White,
            chess::Color::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MoveQuality {
    Brilliant,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
    Forced,
}

impl MoveQuality {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Mistake | Self::Blunder)
    }

    pub fn is_sound(&self) -> bool {
        matches!(self, Self::Brilliant | Self::Good | Self::Forced)
    }

    pub fn hashtag(&self) -> Option<&'static str> {
        match self {
            Self::Brilliant => Some("#BrilliantMove"),
            Self::Blunder => Some("#Blunder"),
            Self::Mistake => Some("#Mistake"),
            Self::Inaccuracy => Some("#Inaccuracy"),
            Self::Forced => Some("#OnlyMove"),
            Self::Good => None,
        }
    }
}

impl std::fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brilliant => write!(f, "brilliant"),
            Self::Good => write!(f, "good"),
            Self::Inaccuracy => write!(f, "inaccuracy"),
            Self::Mistake => write!(f, "mistake"),
            Self::Blunder => write!(f, "blunder"),
            Self::Forced => write!(f, "forced"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[serde(rename = "*")]
    Unfinished,
}

impl GameOutcome {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" | "½-½" => Some(Self::Draw),
            "*" => Some(Self::Unfinished),
            _ => None,
        }
    }
}

/// One half-move with the board before and after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ply {
    /// 1-based position in the game.
    pub index: usize,
    pub move_number: u32,
    pub san: String,
    /// The side that played this ply.
    pub side_to_move: Side,
    pub board_hash: u64,
    pub fen_before: String,
    pub fen_after: String,
    /// Legal moves the mover had to choose from.
    pub legal_move_count: usize,
    /// Pieces of both colours left after the move, kings and pawns included.
    pub piece_count: u32,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedGame {
    pub headers: BTreeMap<String, String>,
    pub start_fen: String,
    pub plies: Vec<Ply>,
    pub outcome: GameOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedPly {
    #[serde(flatten)]
    pub ply: Ply,
    /// Pawn units, positive favours white.
    pub evaluation: f64,
    pub evaluation_delta: f64,
    pub move_quality: MoveQuality,
}

impl EvaluatedPly {
    /// Change in evaluation seen from the side that moved.
    pub fn mover_delta(&self) -> f64 {
        self.evaluation_delta * self.ply.side_to_move.sign()
    }
}

/// Game state at one decision point, as seen by the narrative selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    pub move_number: u32,
    pub evaluation: f64,
    pub time_left_seconds: Option<f64>,
    pub piece_count: Option<u32>,
    pub last_move_quality: Option<MoveQuality>,
    #[serde(default)]
    pub side: Option<Side>,
    /// Set for prose passages, which have no board, clock or evaluation.
    #[serde(default)]
    pub prose: bool,
}

impl GameStateSnapshot {
    pub fn new(move_number: u32, evaluation: f64) -> Self {
        Self {
            move_number,
            evaluation,
            time_left_seconds: None,
            piece_count: None,
            last_move_quality: None,
            side: None,
            prose: false,
        }
    }

    /// Snapshot for the `index`-th passage of a prose document.
    pub fn for_passage(index: u32) -> Self {
        Self {
            prose: true,
            ..Self::new(index, 0.0)
        }
    }

    pub fn with_time_left(mut self, seconds: f64) -> Self {
        self.time_left_seconds = Some(seconds);
        self
    }

    pub fn with_piece_count(mut self, count: u32) -> Self {
        self.piece_count = Some(count);
        self
    }

    pub fn with_last_move_quality(mut self, quality: MoveQuality) -> Self {
        self.last_move_quality = Some(quality);
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    pub fn for_position(move_number: u32, piece_count: u32) -> Self {
        if piece_count <= 14 {
            Self::Endgame
        } else if move_number <= 12 && piece_count >= 28 {
            Self::Opening
        } else {
            Self::Middlegame
        }
    }

    /// Phase by relative position in a document, for prose content.
    pub fn for_fraction(fraction: f64) -> Self {
        if fraction < 0.2 {
            Self::Opening
        } else if fraction >= 0.75 {
            Self::Endgame
        } else {
            Self::Middlegame
        }
    }
}
