//! Near-duplicate detection for generated prompts. All comparisons run on
//! lowercased, trimmed English text.

use regex::Regex;
use std::sync::OnceLock;

const PREFIX_WORDS: usize = 6;
const MEANINGFUL_WORD_LEN: usize = 3;
const MIN_MEANINGFUL_WORDS: usize = 4;
const WORD_OVERLAP_LIMIT: f64 = 0.5;
const KEYWORD_OVERLAP_LIMIT: f64 = 0.45;
const LOOSE_OVERLAP_LIMIT: f64 = 0.7;

const STOPWORDS: &[&str] = &[
    "what", "when", "where", "how", "which", "who", "why", "the", "a", "an", "is", "are", "was",
    "were", "do", "does", "did", "have", "has", "had", "you", "your", "yourself", "to", "from",
    "in", "on", "at", "for", "with", "about", "that", "this", "and", "or", "but", "if", "most",
    "more", "than", "been", "being", "would", "could", "should",
];

const KEY_PHRASES: &[&str] = &[
    r"version of (you|yourself).*memories",
    r"others.*memories.*differ",
    r"truth about yourself.*avoiding",
    r"contradiction.*yourself.*accept",
    r"relationship.*influenced.*years later",
    r"kept to yourself.*uncertain",
];

pub trait DuplicateCheck: Send + Sync {
    /// `existing` must already be lowercased and trimmed.
    fn is_near_duplicate(&self, candidate: &str, existing: &[String]) -> bool;
}

/// Cheap screen applied to a whole template pool before selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefilterCheck;

impl DuplicateCheck for PrefilterCheck {
    fn is_near_duplicate(&self, candidate: &str, existing: &[String]) -> bool {
        let candidate = normalize(candidate);
        existing.iter().any(|text| {
            candidate == *text
                || same_opening(&candidate, text)
                || meaningful_overlap(&candidate, text) > WORD_OVERLAP_LIMIT
        })
    }
}

/// Stricter check applied to the selected prompt, adding phrase patterns and
/// keyword overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictCheck;

impl DuplicateCheck for StrictCheck {
    fn is_near_duplicate(&self, candidate: &str, existing: &[String]) -> bool {
        let candidate = normalize(candidate);
        existing.iter().any(|text| {
            candidate == *text
                || shares_key_phrase(&candidate, text)
                || (memories_differ_pattern(&candidate) && memories_differ_pattern(text))
                || meaningful_overlap(&candidate, text) > WORD_OVERLAP_LIMIT
                || keyword_overlap(&candidate, text) > KEYWORD_OVERLAP_LIMIT
                || same_opening(&candidate, text)
        })
    }
}

/// Last check after a lexical rewrite: raw word overlap across all words.
pub fn loosely_similar(candidate: &str, existing: &[String]) -> bool {
    let candidate = normalize(candidate);
    let words: Vec<&str> = candidate.split_whitespace().collect();
    existing.iter().any(|text| {
        let other: Vec<&str> = text.split_whitespace().collect();
        overlap_ratio(&words, &other) > LOOSE_OVERLAP_LIMIT
    })
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn opening(text: &str) -> Vec<&str> {
    text.split_whitespace().take(PREFIX_WORDS).collect()
}

fn same_opening(a: &str, b: &str) -> bool {
    opening(a) == opening(b)
}

fn meaningful_words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > MEANINGFUL_WORD_LEN)
        .collect()
}

fn meaningful_overlap(a: &str, b: &str) -> f64 {
    let left = meaningful_words(a);
    let right = meaningful_words(b);
    if left.len() <= MIN_MEANINGFUL_WORDS || right.len() <= MIN_MEANINGFUL_WORDS {
        return 0.0;
    }
    overlap_ratio(&left, &right)
}

fn keywords(text: &str) -> Vec<&str> {
    meaningful_words(text)
        .into_iter()
        .filter(|word| !STOPWORDS.contains(word))
        .collect()
}

fn keyword_overlap(a: &str, b: &str) -> f64 {
    let left = keywords(a);
    let right = keywords(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    overlap_ratio(&left, &right)
}

/// Words of `left` found in `right`, over the longer length.
fn overlap_ratio(left: &[&str], right: &[&str]) -> f64 {
    let longest = left.len().max(right.len());
    if longest == 0 {
        return 0.0;
    }
    let common = left.iter().filter(|word| right.contains(*word)).count();
    common as f64 / longest as f64
}

fn key_phrases() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        KEY_PHRASES
            .iter()
            .map(|pattern| Regex::new(pattern).expect("key phrase pattern is valid"))
            .collect()
    })
}

fn shares_key_phrase(a: &str, b: &str) -> bool {
    key_phrases()
        .iter()
        .any(|pattern| pattern.is_match(a) && pattern.is_match(b))
}

fn memories_differ_pattern(text: &str) -> bool {
    static KNOW_YOURSELF: OnceLock<Regex> = OnceLock::new();
    let know_yourself =
        KNOW_YOURSELF.get_or_init(|| Regex::new(r"know.*yourself").expect("pattern is valid"));
    text.contains("memories") && text.contains("differ") && know_yourself.is_match(text)
}
