//! Recommendation cache.
//!
//! Keyed by exact question text; one entry per unique question, no eviction.
//! The cache lives for a single scan session (one page view), so unbounded
//! growth is bounded by the page itself. A hit must never cost a second
//! network call — the scanner checks here before touching the client.

use std::collections::HashMap;

use crate::api::Recommendation;

#[derive(Debug, Default)]
pub struct RecommendationCache {
    entries: HashMap<String, Recommendation>,
}

impl RecommendationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question: &str) -> Option<&Recommendation> {
        self.entries.get(question)
    }

    pub fn insert(&mut self, question: &str, recommendation: Recommendation) {
        self.entries.insert(question.to_string(), recommendation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
