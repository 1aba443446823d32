//! Question-detection heuristics.
//!
//! A text run is worth annotating when it reads like a compliance
//! questionnaire item: long enough to be a sentence, carries a question
//! mark, and matches one of a fixed set of phrasings combining
//! process/policy/control vocabulary with interrogative openers. Matching
//! stops at the first satisfied pattern — a node gets at most one label.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

/// Minimum trimmed length before a text run is considered at all.
pub const DEFAULT_MIN_TEXT_LEN: usize = 20;

/// The fixed phrasing heuristics, in priority order.
const PATTERN_SOURCES: &[&str] = &[
    r"\b(describe|explain|provide|list|identify|document)\b.*\b(process|procedure|policy|control|measure|approach)\b",
    r"\bhow (does|do|did|will)\b.*\b(your organization|your company|you)\b",
    r"\bwhat (are|is)\b.*\b(implemented|established|documented|maintained)\b",
    r"\bdo you (have|maintain|document|implement)\b",
    r"\bdoes your organization (have|maintain|use|implement)\b",
];

fn patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PATTERN_SOURCES
            .iter()
            .map(|src| {
                RegexBuilder::new(src)
                    .case_insensitive(true)
                    .build()
                    .expect("question pattern is valid")
            })
            .collect()
    })
}

/// Test trimmed text against the heuristics. Returns the index of the first
/// matching pattern, or `None` when the text doesn't qualify.
pub fn match_question(text: &str, min_len: usize) -> Option<usize> {
    if text.len() <= min_len || !text.contains('?') {
        return None;
    }
    patterns().iter().position(|re| re.is_match(text))
}
