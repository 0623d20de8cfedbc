//! Defensive parsing of suggestion lists from free-form model output.

use crate::models::{Category, SuggestionCandidate};
use tracing::debug;

/// Extracts `category|suggestion|duration` lines from `raw`.
///
/// Each line with a `|` is split on its first two pipes, so a duration may
/// itself contain `|`. Lines with fewer than three fields, an unknown
/// category or empty suggestion text are skipped. The result keeps line
/// order and is empty when nothing matches.
pub fn parse_suggestions(raw: &str) -> Vec<SuggestionCandidate> {
    raw.lines()
        .filter(|line| line.contains('|'))
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<SuggestionCandidate> {
    let mut fields = line.splitn(3, '|');
    let (Some(category), Some(text), Some(duration)) = (fields.next(), fields.next(), fields.next())
    else {
        debug!("Skipping suggestion line without three fields: {:?}", line);
        return None;
    };

    let token = category.trim().to_lowercase();
    let Some(category) = Category::from_token(&token) else {
        debug!("Skipping suggestion with unknown category {:?}", token);
        return None;
    };

    let text = text.trim();
    if text.is_empty() {
        debug!("Skipping {} suggestion with empty text", category);
        return None;
    }

    Some(SuggestionCandidate {
        category,
        text: text.to_string(),
        duration: duration.trim().to_string(),
    })
}
