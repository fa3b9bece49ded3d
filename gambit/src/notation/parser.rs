use chess::{Board, BoardBuilder, BoardStatus, MoveGen};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

use super::movetext::{tokenize, RawMove};
use super::san::{is_capture, resolve};
use crate::error::{GambitError, Result};
use crate::models::{GameOutcome, ParsedGame, Ply, Side};

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%clk\s+(?:(\d+):)?(\d{1,2}):(\d{1,2}(?:\.\d+)?)\s*\]").unwrap()
});

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[%[^\]]*\]").unwrap());

/// Decodes PGN movetext into plies, replaying every move on a board.
///
/// Parsing stops at the first move that is not a legal continuation and
/// reports that ply's index; nothing after it is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotationParser;

impl NotationParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> Result<ParsedGame> {
        let movetext = tokenize(content)?;

        let mut board = match movetext.headers.get("FEN") {
            Some(fen) => board_from_fen(fen)
                .map_err(|reason| GambitError::parse(1, format!("invalid FEN header '{fen}': {reason}")))?,
            None => Board::default(),
        };
        let start_fen = board.to_string();
        let mut move_number = movetext
            .headers
            .get("FEN")
            .and_then(|fen| fen.split_whitespace().nth(5))
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(1);

        let mut plies = Vec::with_capacity(movetext.moves.len());
        for (offset, raw) in movetext.moves.iter().enumerate() {
            let index = offset + 1;
            let ply = self.play(&mut board, raw, index, move_number)?;
            if ply.side_to_move == Side::Black {
                move_number += 1;
            }
            plies.push(ply);
        }

        let outcome = match board.status() {
            BoardStatus::Checkmate => match board.side_to_move() {
                chess::Color::White => GameOutcome::BlackWins,
                chess::Color::Black => GameOutcome::WhiteWins,
            },
            BoardStatus::Stalemate => GameOutcome::Draw,
            BoardStatus::Ongoing => movetext.result.unwrap_or(GameOutcome::Unfinished),
        };

        tracing::debug!(
            plies = plies.len(),
            outcome = ?outcome,
            "Parsed notation game"
        );

        Ok(ParsedGame {
            headers: movetext.headers,
            start_fen,
            plies,
            outcome,
        })
    }

    fn play(&self, board: &mut Board, raw: &RawMove, index: usize, move_number: u32) -> Result<Ply> {
        if board.status() != BoardStatus::Ongoing {
            return Err(GambitError::parse(
                index,
                format!("move '{}' played after the game ended", raw.text),
            ));
        }

        let chess_move =
            resolve(board, &raw.text).map_err(|e| GambitError::parse(index, e.describe(&raw.text)))?;

        let before = *board;
        let after = before.make_move_new(chess_move);
        let (annotation_text, clock_seconds) = split_comments(&raw.comments);

        let ply = Ply {
            index,
            move_number,
            san: raw.text.clone(),
            side_to_move: Side::from(before.side_to_move()),
            board_hash: after.get_hash(),
            fen_before: before.to_string(),
            fen_after: after.to_string(),
            legal_move_count: MoveGen::new_legal(&before).len(),
            piece_count: after.combined().popcnt(),
            is_capture: is_capture(&before, &chess_move),
            is_check: after.checkers().popcnt() > 0,
            is_checkmate: after.status() == BoardStatus::Checkmate,
            annotation_text,
            glyph: raw.glyph.clone(),
            clock_seconds,
        };

        *board = after;
        Ok(ply)
    }
}

/// Builds the start position from a `[FEN]` header.
///
/// The piece placement is checked for eight ranks of eight files and one
/// king per colour before the board is built: `chess` accepts some
/// misshapen placements and cannot build a board without both kings.
fn board_from_fen(fen: &str) -> std::result::Result<Board, String> {
    let placement = fen.split_whitespace().next().ok_or("empty FEN")?;

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!("expected 8 ranks, found {}", ranks.len()));
    }
    for (i, rank) in ranks.iter().enumerate() {
        let mut files = 0u32;
        for c in rank.chars() {
            files += match c {
                '1'..='8' => c.to_digit(10).unwrap_or(0),
                'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => 1,
                other => return Err(format!("unexpected '{other}' in piece placement")),
            };
        }
        if files != 8 {
            return Err(format!("rank {} covers {files} files, expected 8", 8 - i));
        }
    }

    for (king, colour) in [('K', "white"), ('k', "black")] {
        let count = placement.chars().filter(|&c| c == king).count();
        if count != 1 {
            return Err(format!("expected one {colour} king, found {count}"));
        }
    }

    let builder = BoardBuilder::from_str(fen).map_err(|e| format!("{e:?}"))?;
    Board::try_from(builder).map_err(|e| format!("{e:?}"))
}

/// Separates human commentary from embedded `[%...]` commands.
fn split_comments(comments: &[String]) -> (Option<String>, Option<f64>) {
    let mut clock = None;
    let mut texts = Vec::new();

    for comment in comments {
        if let Some(caps) = CLOCK_RE.captures(comment) {
            let hours: f64 = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0);
            let minutes: f64 = caps[2].parse().unwrap_or(0.0);
            let seconds: f64 = caps[3].parse().unwrap_or(0.0);
            clock = Some(hours * 3600.0 + minutes * 60.0 + seconds);
        }
        let text = COMMAND_RE.replace_all(comment, "");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            texts.push(text);
        }
    }

    let annotation = (!texts.is_empty()).then(|| texts.join(" "));
    (annotation, clock)
}
