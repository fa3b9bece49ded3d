//! Lexicon scoring for prose and transcripts.
//!
//! Each sentence becomes one heatmap slot. Its score acts as the evaluation
//! swing, and the running total as the evaluation, so the classifier treats
//! an article like a game whose moves are sentences.

use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

use super::emotion::{classify_signals, Signal};
use crate::error::{GambitError, Result};
use crate::models::{ContentType, GamePhase, Heatmap, MoveQuality};

static TIMING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^.*-->.*$|^[ \t]*\d+[ \t]*$").unwrap());

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[(]?\b\d{1,2}:\d{2}(?::\d{2})?(?:[.,]\d+)?\b[\])]?").unwrap()
});

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:music|applause|laughter|inaudible|crosstalk)\]").unwrap()
});

static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[A-Z][A-Za-z0-9 .'\-]{0,30}:[ \t]+").unwrap());

static MOVE_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[NBRQK][a-h1-8]?x?[a-h][1-8]|[a-h]x[a-h][1-8]|[a-h][1-8])\b|O-O(?:-O)?").unwrap()
});

const POSITIVE: &[&str] = &[
    "strong", "excellent", "winning", "advantage", "good", "great", "best", "accurate", "solid",
    "initiative", "powerful", "beautiful", "clever", "precise", "dominant", "wins",
];

const NEGATIVE: &[&str] = &[
    "weak", "losing", "bad", "poor", "dubious", "worse", "passive", "collapse", "collapses",
    "lost", "loses", "struggling", "helpless", "desperate",
];

const TENSION: &[&str] = &[
    "attack", "attacking", "threat", "threatens", "pressure", "sacrifice", "sacrifices", "check",
    "tension", "critical", "danger", "dangerous", "complicated", "sharp", "zeitnot", "clock",
    "scramble", "race",
];

const BRILLIANCE: &[&str] = &[
    "brilliant", "brilliancy", "stunning", "genius", "masterpiece", "incredible", "spectacular",
    "immortal",
];

const BLUNDER: &[&str] = &[
    "blunder", "blunders", "blundered", "mistake", "oversight", "howler", "error", "hangs",
    "hung", "disaster",
];

const ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sr.", "Jr.", "vs.", "etc.", "i.e.", "e.g.", "No.",
    "GM.", "IM.", "St.", "approx.", "Fig.", "Ch.",
];

const MAX_EXCLAMATIONS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
struct SentenceScore {
    polarity: f64,
    arousal: f64,
    blunder: bool,
    brilliance: bool,
    checkmate: bool,
}

impl SentenceScore {
    fn swing(&self) -> f64 {
        let magnitude = self.polarity.abs() + self.arousal;
        if self.polarity < 0.0 {
            -magnitude
        } else {
            magnitude
        }
    }

    fn quality(&self) -> Option<MoveQuality> {
        if self.blunder {
            Some(MoveQuality::Blunder)
        } else if self.brilliance {
            Some(MoveQuality::Brilliant)
        } else {
            None
        }
    }
}

/// Heatmap for article, video or audio content.
pub fn analyze_text(content: &str, content_type: ContentType) -> Result<Heatmap> {
    let text = if content_type.is_transcript() {
        clean_transcript(content)
    } else {
        content.to_string()
    };

    let scored: Vec<(String, SentenceScore)> = split_sentences(&text)
        .into_iter()
        .filter(|s| s.unicode_words().any(|w| w.chars().any(char::is_alphabetic)))
        .map(|s| {
            let score = score_sentence(&s);
            (s, score)
        })
        .collect();

    if scored.is_empty() {
        return Err(GambitError::Validation(format!(
            "{content_type} content has no analyzable sentences"
        )));
    }

    let total = scored.len();
    let mut evaluation = 0.0;
    let mut signals = Vec::with_capacity(total);
    let mut previous_blunder = false;

    for (i, (sentence, score)) in scored.into_iter().enumerate() {
        let swing = score.swing();
        evaluation += swing;

        signals.push(Signal {
            ply_index: i + 1,
            move_number: (i + 1) as u32,
            label: sentence,
            side: None,
            move_quality: score.quality(),
            evaluation,
            evaluation_delta: swing,
            annotation: None,
            time_left_seconds: None,
            piece_count: None,
            phase: GamePhase::for_fraction(i as f64 / total as f64),
            is_checkmate: score.checkmate,
            answers_error: previous_blunder && !score.blunder && score.polarity > 0.0,
        });
        previous_blunder = score.blunder;
    }

    tracing::debug!(
        sentences = signals.len(),
        content_type = %content_type,
        "Scored text content"
    );
    classify_signals(&signals)
}

/// Drops cue numbers, timing lines, timestamps, noise tags and speaker labels.
pub fn clean_transcript(raw: &str) -> String {
    let text = TIMING_LINE_RE.replace_all(raw, "");
    let text = TIMESTAMP_RE.replace_all(&text, "");
    let text = NOISE_RE.replace_all(&text, "");
    let text = SPEAKER_RE.replace_all(&text, "");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn score_sentence(sentence: &str) -> SentenceScore {
    let mut score = SentenceScore::default();

    for word in sentence.unicode_words() {
        let word = word.to_lowercase();
        let word = word.as_str();
        if POSITIVE.contains(&word) {
            score.polarity += 1.0;
        } else if NEGATIVE.contains(&word) {
            score.polarity -= 1.0;
        } else if BRILLIANCE.contains(&word) {
            score.polarity += 2.0;
            score.brilliance = true;
        } else if BLUNDER.contains(&word) {
            score.polarity -= 2.0;
            score.blunder = true;
        } else if TENSION.contains(&word) {
            score.arousal += 0.5;
        } else if word == "checkmate" {
            score.checkmate = true;
            score.arousal += 1.0;
        }
    }

    let exclamations = sentence.matches('!').count().min(MAX_EXCLAMATIONS);
    score.arousal += 0.5 * exclamations as f64;
    score.arousal += 0.25 * MOVE_MENTION_RE.find_iter(sentence).count() as f64;
    score
}

/// Grapheme-based splitter. Closing punctuation stays with its sentence and
/// line breaks always end one.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut pending = false;

    for grapheme in text.graphemes(true) {
        let is_space = grapheme.chars().all(char::is_whitespace);

        if grapheme == "\n" || grapheme == "\r\n" {
            push_sentence(&mut sentences, &mut current);
            pending = false;
            continue;
        }

        if pending {
            if is_space {
                push_sentence(&mut sentences, &mut current);
                pending = false;
                continue;
            }
            if !is_closing(grapheme) {
                pending = false;
            }
        }

        current.push_str(grapheme);
        if matches!(grapheme, "." | "!" | "?" | "…") && is_sentence_boundary(&current) {
            pending = true;
        }
    }

    push_sentence(&mut sentences, &mut current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

fn is_closing(grapheme: &str) -> bool {
    matches!(
        grapheme,
        "." | "!" | "?" | "…" | "\"" | "'" | "”" | "’" | ")"
    )
}

fn is_sentence_boundary(text: &str) -> bool {
    let Some(last_word) = text.split_whitespace().last() else {
        return false;
    };

    if ABBREVIATIONS.contains(&last_word) {
        return false;
    }

    // Move numbers such as "12." or "12..." in quoted games
    let number = last_word.trim_end_matches('.');
    !(!number.is_empty() && number.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Emotion;

    #[test]
    fn test_split_keeps_move_numbers_and_abbreviations() {
        let sentences =
            split_sentences("After 1. e4 e5 the game began. Dr. Lasker smiled! Was it over?");
        assert_eq!(
            sentences,
            vec![
                "After 1. e4 e5 the game began.",
                "Dr. Lasker smiled!",
                "Was it over?",
            ]
        );
    }

    #[test]
    fn test_split_keeps_double_glyphs_together() {
        let sentences = split_sentences("Then came Nf6!! What a shot.");
        assert_eq!(sentences, vec!["Then came Nf6!!", "What a shot."]);
    }

    #[test]
    fn test_clean_transcript_strips_timestamps_and_speakers() {
        let raw = "[00:00:12] HOST: Welcome back!\n00:14 Magnus: The attack is strong.\n[Music]";
        let cleaned = clean_transcript(raw);
        assert_eq!(cleaned, "Welcome back!\nThe attack is strong.");
    }

    #[test]
    fn test_clean_transcript_drops_subtitle_cues() {
        let raw = "1\n00:00:01,000 --> 00:00:04,000\nWhat a blunder.\n";
        assert_eq!(clean_transcript(raw), "What a blunder.");
    }

    #[test]
    fn test_article_heatmap_has_one_entry_per_sentence() {
        let article = "The opening was quiet. Then a stunning sacrifice on h7! \
                       White's attack looked winning. But a terrible blunder followed.";
        let heatmap = analyze_text(article, ContentType::Article).unwrap();
        assert_eq!(heatmap.len(), 4);
        assert_eq!(heatmap[1].emotion, Emotion::Brilliant);
        assert_eq!(heatmap[3].move_quality, Some(MoveQuality::Blunder));
        assert!(heatmap.iter().all(|e| (0.0..=1.0).contains(&e.intensity)));
        assert!(heatmap.iter().any(|e| e.intensity == 1.0));
    }

    #[test]
    fn test_content_without_sentences_is_rejected() {
        let err = analyze_text("[00:01] ... [00:02]", ContentType::Video).unwrap_err();
        assert!(matches!(err, GambitError::Validation(_)));
    }

    #[test]
    fn test_scoring_counts_vocabulary_and_moves() {
        let score = score_sentence("A brilliant attack with Qxh7+ and Rd8!");
        assert!(score.brilliance);
        assert_eq!(score.polarity, 2.0);
        // attack 0.5, one exclamation 0.5, two move mentions 0.5
        assert_eq!(score.arousal, 1.5);
    }
}
