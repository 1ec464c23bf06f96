//! Text helpers for article content: slugs, read time and excerpts.

use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::{MAX_READ_TIME_MINUTES, WORDS_PER_MINUTE};

lazy_static! {
    static ref HTML_TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Fold the Latin accents that show up in French titles to plain ASCII
fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

/// Build a URL slug from a title.
///
/// Lowercases, folds accents, drops anything outside `[a-z0-9 -]`, turns
/// whitespace into dashes and collapses repeated dashes. An input with no
/// usable characters yields `"untitled"`.
pub fn slugify(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    for c in title.trim().to_lowercase().chars() {
        if let Some(folded) = fold_accent(c) {
            cleaned.push_str(folded);
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            cleaned.push(c);
        } else if c.is_whitespace() {
            cleaned.push('-');
        }
    }

    let slug = cleaned
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Strip HTML tags and collapse whitespace
pub fn plain_text(content: &str) -> String {
    let without_tags = HTML_TAG_REGEX.replace_all(content, " ");
    WHITESPACE_REGEX
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Estimated reading time in whole minutes, between 1 and the configured cap
pub fn read_time_minutes(content: &str) -> i32 {
    let words = plain_text(content).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    (minutes as i32).min(MAX_READ_TIME_MINUTES)
}

/// First `max_chars` characters of the plain text, cut on a word boundary
pub fn excerpt_from(content: &str, max_chars: usize) -> String {
    let text = plain_text(content);
    if text.chars().count() <= max_chars {
        return text;
    }

    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", trimmed.trim_end_matches(&[',', ';', ':', '.'][..]))
}

/// `%term%` pattern for ILIKE with the wildcard characters of `term` escaped
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Trim tags, drop empty ones and remove duplicates, keeping first occurrences
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}
