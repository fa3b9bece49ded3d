use unicode_segmentation::UnicodeSegmentation;

use crate::models::{KeyMoment, Side, SocialSnippet, TargetAudience};

pub const BASE_HASHTAG: &str = "#chess";
const ELLIPSIS: char = '…';

/// One snippet per key moment, plus an annotation snippet for educational
/// audiences when the moment carries annotator text.
///
/// `char_budget` caps the audience budget; lengths are counted in `char`s.
pub fn summarize(
    key_moments: &[KeyMoment],
    audience: TargetAudience,
    char_budget: usize,
) -> Vec<SocialSnippet> {
    let budget = audience.snippet_budget().min(char_budget);
    let mut snippets = Vec::with_capacity(key_moments.len());

    for moment in key_moments {
        let hashtags = hashtags_for(moment);
        snippets.push(SocialSnippet {
            source_ply_index: moment.ply_index(),
            excerpt_text: truncate(&excerpt(moment), budget),
            suggested_hashtags: hashtags.clone(),
        });

        if audience == TargetAudience::Educational {
            if let Some(note) = &moment.entry.annotation {
                let text = format!("Annotator on {}: \"{note}\"", moment.entry.label);
                snippets.push(SocialSnippet {
                    source_ply_index: moment.ply_index(),
                    excerpt_text: truncate(&text, budget),
                    suggested_hashtags: hashtags,
                });
            }
        }
    }

    snippets
}

fn excerpt(moment: &KeyMoment) -> String {
    let entry = &moment.entry;
    match entry.side {
        Some(Side::White) => format!("{}. {}", entry.move_number, moment.rationale),
        Some(Side::Black) => format!("{}... {}", entry.move_number, moment.rationale),
        None => entry.label.clone(),
    }
}

fn hashtags_for(moment: &KeyMoment) -> Vec<String> {
    let mut tags = vec![BASE_HASHTAG.to_string()];
    let candidates = [
        Some(moment.emotion().hashtag()),
        moment.entry.move_quality.and_then(|q| q.hashtag()),
    ];
    for tag in candidates.into_iter().flatten() {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Cuts `text` to at most `budget` chars, preferring a word boundary and
/// never splitting a grapheme cluster. Truncated text ends with `…`.
pub fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    if budget == 0 {
        return String::new();
    }

    let limit = budget - 1;
    let mut out = String::new();
    let mut used = 0;
    let mut last_break = None;

    for grapheme in text.graphemes(true) {
        let width = grapheme.chars().count();
        if used + width > limit {
            break;
        }
        if grapheme.chars().all(char::is_whitespace) {
            last_break = Some(out.len());
        }
        out.push_str(grapheme);
        used += width;
    }

    if let Some(cut) = last_break.filter(|&cut| cut > 0) {
        out.truncate(cut);
    }
    let mut out = out.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

impl SocialSnippet {
    /// Excerpt followed by as many hashtags as fit in `budget` chars.
    pub fn render(&self, budget: usize) -> String {
        let mut text = self.excerpt_text.clone();
        let mut used = text.chars().count();
        for tag in &self.suggested_hashtags {
            let extra = tag.chars().count() + 1;
            if used + extra > budget {
                continue;
            }
            text.push(' ');
            text.push_str(tag);
            used += extra;
        }
        text
    }
}
