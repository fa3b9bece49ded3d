//! Lexical pass over PGN text: tag pairs, move tokens, comments, NAGs,
//! variations and the termination marker. No board knowledge lives here.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::{GambitError, Result};
use crate::models::GameOutcome;

static TAG_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]$"#).unwrap()
});

static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(\.+)(.*)$").unwrap());

const FIGURINES: &[char] = &[
    '♔', '♕', '♖', '♗', '♘', '♙', '♚', '♛', '♜', '♝', '♞', '♟',
];

const TOKEN_BREAKS: &[char] = &['{', '}', '(', ')', ';', '[', ']', '$'];

/// A move token as written, before it is resolved against a board.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RawMove {
    pub text: String,
    pub glyph: Option<String>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Movetext {
    pub headers: BTreeMap<String, String>,
    pub moves: Vec<RawMove>,
    pub result: Option<GameOutcome>,
}

fn nag_glyph(code: u32) -> String {
    match code {
        1 => "!".to_string(),
        2 => "?".to_string(),
        3 => "!!".to_string(),
        4 => "??".to_string(),
        5 => "!?".to_string(),
        6 => "?!".to_string(),
        other => format!("${other}"),
    }
}

pub(crate) fn tokenize(content: &str) -> Result<Movetext> {
    let chars: Vec<char> = content.chars().collect();
    let mut text = Movetext::default();
    let mut dangling_number = false;
    let mut i = 0;

    while i < chars.len() {
        let next_ply = text.moves.len() + 1;
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '[' => {
                let end = tag_pair_end(&chars, i).ok_or_else(|| {
                    GambitError::parse(next_ply, "unterminated tag pair")
                })?;
                let raw: String = chars[i..=end].iter().collect();
                if !text.moves.is_empty() {
                    return Err(GambitError::parse(
                        next_ply,
                        format!("tag pair {raw} inside movetext"),
                    ));
                }
                let caps = TAG_PAIR_RE.captures(&raw).ok_or_else(|| {
                    GambitError::parse(next_ply, format!("malformed tag pair {raw}"))
                })?;
                text.headers
                    .insert(caps[1].to_string(), caps[2].replace("\\\"", "\""));
                i = end + 1;
            }
            '{' => {
                let end = find_from(&chars, i, '}').ok_or_else(|| {
                    GambitError::parse(next_ply, "unterminated game: comment is never closed")
                })?;
                let comment: String = chars[i + 1..end].iter().collect();
                attach_comment(&mut text, comment);
                i = end + 1;
            }
            ';' => {
                let end = find_from(&chars, i, '\n').unwrap_or(chars.len());
                let comment: String = chars[i + 1..end].iter().collect();
                attach_comment(&mut text, comment);
                i = end;
            }
            '(' => {
                i = skip_variation(&chars, i).ok_or_else(|| {
                    GambitError::parse(next_ply, "unterminated game: variation is never closed")
                })?;
            }
            ')' | '}' | ']' => {
                return Err(GambitError::parse(
                    next_ply,
                    format!("unbalanced '{c}' in movetext"),
                ));
            }
            '$' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].is_ascii_digit() {
                    end += 1;
                }
                let digits: String = chars[start..end].iter().collect();
                let code: u32 = digits.parse().map_err(|_| {
                    GambitError::parse(next_ply, "NAG marker '$' without a number")
                })?;
                if let Some(last) = text.moves.last_mut() {
                    last.glyph = Some(nag_glyph(code));
                }
                i = end;
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !TOKEN_BREAKS.contains(&chars[i])
                {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                dangling_number = push_token(&mut text, &token, dangling_number)?;
            }
        }
    }

    if dangling_number {
        return Err(GambitError::parse(
            text.moves.len() + 1,
            "unterminated game: move number without a move",
        ));
    }
    if text.moves.is_empty() {
        return Err(GambitError::parse(1, "no moves found"));
    }

    Ok(text)
}

/// Returns whether a move number is still waiting for its move.
fn push_token(text: &mut Movetext, token: &str, dangling_number: bool) -> Result<bool> {
    let next_ply = text.moves.len() + 1;

    if text.result.is_some() {
        return Err(GambitError::parse(
            next_ply,
            format!("'{token}' after the game termination marker"),
        ));
    }

    if let Some(outcome) = GameOutcome::from_token(token) {
        text.result = Some(outcome);
        return Ok(dangling_number);
    }

    let mut token = token;
    if let Some(caps) = MOVE_NUMBER_RE.captures(token) {
        let rest = caps.get(3).map_or("", |m| m.as_str());
        if rest.is_empty() {
            return Ok(true);
        }
        token = rest;
    }

    let body = token.trim_end_matches(['!', '?']);
    let glyph = &token[body.len()..];
    if body.is_empty() {
        // Bare glyph separated from its move by whitespace
        if let Some(last) = text.moves.last_mut() {
            last.glyph = Some(glyph.to_string());
        }
        return Ok(dangling_number);
    }

    check_dialect(body, next_ply)?;

    text.moves.push(RawMove {
        text: body.to_string(),
        glyph: (!glyph.is_empty()).then(|| glyph.to_string()),
        comments: Vec::new(),
    });
    Ok(false)
}

fn check_dialect(token: &str, ply: usize) -> Result<()> {
    if token.chars().any(|c| FIGURINES.contains(&c)) {
        return Err(GambitError::parse(
            ply,
            format!("unsupported notation dialect: figurine move '{token}'"),
        ));
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return Err(GambitError::parse(
            ply,
            format!("unsupported notation dialect: numeric move '{token}'"),
        ));
    }
    if let Some(first) = token.chars().next() {
        if first.is_ascii_uppercase() && !"NBRQKO".contains(first) {
            return Err(GambitError::parse(
                ply,
                format!("unsupported notation dialect: piece letter '{first}' in '{token}'"),
            ));
        }
    }
    Ok(())
}

fn attach_comment(text: &mut Movetext, comment: String) {
    let comment = comment.trim();
    if comment.is_empty() {
        return;
    }
    // Comments before the first move describe the game, not a ply
    if let Some(last) = text.moves.last_mut() {
        last.comments.push(comment.to_string());
    }
}

fn find_from(chars: &[char], start: usize, target: char) -> Option<usize> {
    chars[start..]
        .iter()
        .position(|&c| c == target)
        .map(|offset| start + offset)
}

/// Index of the ']' closing the tag pair opened at `start`. Brackets inside
/// the quoted value, escaped quotes included, do not close it.
fn tag_pair_end(chars: &[char], start: usize) -> Option<usize> {
    let mut in_value = false;
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if in_value => i += 1,
            '"' => in_value = !in_value,
            ']' if !in_value => return Some(i),
            '\n' => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index just past the ')' closing the variation opened at `start`.
fn skip_variation(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            '{' => {
                i = find_from(chars, i, '}')?;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_headers_and_moves() {
        let pgn = "[Event \"Casual\"]\n[White \"Morphy\"]\n\n1. e4 e5 2. Nf3 d6 1-0";
        let text = tokenize(pgn).unwrap();
        assert_eq!(text.headers.get("White").map(String::as_str), Some("Morphy"));
        let moves: Vec<&str> = text.moves.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "d6"]);
        assert_eq!(text.result, Some(GameOutcome::WhiteWins));
    }

    #[test]
    fn test_tag_value_may_contain_brackets() {
        let pgn = "[Event \"Blitz [3+2]\"]\n[Annotator \"\\\"Ed]\\\"\"]\n\n1. e4 *";
        let text = tokenize(pgn).unwrap();
        assert_eq!(text.headers.get("Event").map(String::as_str), Some("Blitz [3+2]"));
        assert_eq!(text.headers.get("Annotator").map(String::as_str), Some("\"Ed]\""));
        assert_eq!(text.moves.len(), 1);
    }

    #[test]
    fn test_unterminated_tag_value_is_rejected() {
        let err = tokenize("[Event \"Blitz]\n1. e4 *").unwrap_err();
        assert!(err.to_string().contains("unterminated tag pair"));
    }

    #[test]
    fn test_tokenize_attaches_comments_and_glyphs() {
        let pgn = "1. e4 {best by test} e5?! 2. Nf3 $1 Nc6";
        let text = tokenize(pgn).unwrap();
        assert_eq!(text.moves[0].comments, vec!["best by test".to_string()]);
        assert_eq!(text.moves[1].glyph.as_deref(), Some("?!"));
        assert_eq!(text.moves[2].glyph.as_deref(), Some("!"));
        assert!(text.moves[3].glyph.is_none());
    }

    #[test]
    fn test_tokenize_skips_nested_variations() {
        let pgn = "1. e4 (1. d4 d5 (1... Nf6 {Indian}) 2. c4) e5 *";
        let text = tokenize(pgn).unwrap();
        assert_eq!(text.moves.len(), 2);
        assert_eq!(text.moves[1].text, "e5");
    }

    #[test]
    fn test_tokenize_black_move_number_prefix() {
        let text = tokenize("12...Qxd5 13.Rxd5").unwrap();
        assert_eq!(text.moves[0].text, "Qxd5");
        assert_eq!(text.moves[1].text, "Rxd5");
    }

    #[test]
    fn test_unterminated_comment_is_rejected() {
        let err = tokenize("1. e4 e5 {never closed").unwrap_err();
        assert!(matches!(err, GambitError::Parse { ply: 3, .. }));
    }

    #[test]
    fn test_unterminated_variation_is_rejected() {
        assert!(tokenize("1. e4 (1. d4 d5 e5").is_err());
    }

    #[test]
    fn test_dangling_move_number_is_rejected() {
        let err = tokenize("1. e4 e5 2.").unwrap_err();
        assert!(err.to_string().contains("move number without a move"));
    }

    #[test]
    fn test_moves_after_result_are_rejected() {
        let err = tokenize("1. e4 e5 1-0 2. Nf3").unwrap_err();
        assert!(matches!(err, GambitError::Parse { ply: 3, .. }));
    }

    #[test]
    fn test_unsupported_dialects() {
        assert!(tokenize("1. ♘f3 d5").unwrap_err().to_string().contains("figurine"));
        assert!(tokenize("1. 5254 5755").unwrap_err().to_string().contains("numeric"));
        assert!(tokenize("1. e4 e5 2. Sf3").unwrap_err().to_string().contains("piece letter"));
    }

    #[test]
    fn test_empty_movetext_is_rejected() {
        assert!(tokenize("[Event \"Nothing\"]\n*").is_err());
    }
}
