//! Page scanner — detects compliance questions and deduplicates work.
//!
//! Walks every text run of a parsed page (script/style already excluded by
//! the HTML layer), applies the question heuristics, and yields at most one
//! [`ScanMatch`] per element. A session-owned membership set keyed by
//! element identity makes repeated scans idempotent: re-scanning the same
//! page (watch mode re-fetches, partial page updates) never re-yields an
//! element that already matched. Scanning reads the document only — it
//! never mutates anything.

pub mod cache;
pub mod patterns;

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::html::{self, Document, Element};
use crate::rules;

/// Stable identity for an element across re-parses of the same page:
/// a fingerprint of tag, id, class, and the matched text.
pub type ElementKey = u64;

/// A detected compliance question anchored to a page element.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    /// Trimmed, entity-decoded question text.
    pub text: String,
    /// Index of the anchor element in the scanned document.
    pub element: usize,
    /// Cross-scan identity of the anchor.
    pub key: ElementKey,
    /// Which heuristic fired (first match wins).
    pub pattern: usize,
}

/// One page-view's worth of scanning state. Dropped on teardown, taking the
/// dedup set with it.
#[derive(Debug)]
pub struct ScanSession {
    min_text_len: usize,
    seen: HashSet<ElementKey>,
}

impl ScanSession {
    pub fn new(min_text_len: usize) -> Self {
        Self {
            min_text_len,
            seen: HashSet::new(),
        }
    }

    /// Scan a document, yielding matches not seen by this session before.
    pub fn scan(&mut self, doc: &Document) -> Vec<ScanMatch> {
        let mut matches = Vec::new();
        let mut matched_elements: HashSet<usize> = HashSet::new();

        for run in doc.text_runs() {
            let decoded = html::decode_entities(doc.text(run));
            let trimmed = decoded.trim();
            let Some(pattern) = patterns::match_question(trimmed, self.min_text_len) else {
                continue;
            };
            // A match needs an element to anchor the annotation to.
            let Some(el_idx) = run.element else {
                continue;
            };
            // One label per element, even when it holds several text runs.
            if matched_elements.contains(&el_idx) {
                continue;
            }
            let key = element_key(doc.element(el_idx), trimmed);
            if !self.seen.insert(key) {
                continue;
            }
            matched_elements.insert(el_idx);
            matches.push(ScanMatch {
                text: trimmed.to_string(),
                element: el_idx,
                key,
                pattern,
            });
        }

        matches
    }

    /// Number of distinct elements this session has ever matched.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Gate for inline annotation: only pages whose visible text mentions
/// compliance vocabulary are worth scanning.
pub fn is_compliance_page(doc: &Document) -> bool {
    rules::is_compliance_text(&doc.visible_text().to_lowercase())
}

/// Fingerprint an element plus its matched text. The browser original keyed
/// dedup on live node identity; across re-parses the closest stable stand-in
/// is the element's addressable attributes plus the text that matched.
pub fn element_key(element: &Element, text: &str) -> ElementKey {
    let mut hasher = DefaultHasher::new();
    element.tag.hash(&mut hasher);
    element.id.hash(&mut hasher);
    element.classes.hash(&mut hasher);
    text.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1>Vendor security audit</h1>
          <p id="q1">Do you have a documented incident response plan in place?</p>
          <p id="q2">Describe the process used to rotate encryption keys yearly?</p>
          <p>Just a statement, nothing interrogative about it.</p>
          <script>var s = "Do you have a policy? This must not match.";</script>
        </body></html>
    "#;

    #[test]
    fn finds_questions_and_skips_prose_and_scripts() {
        let doc = Document::parse(PAGE);
        let mut session = ScanSession::new(patterns::DEFAULT_MIN_TEXT_LEN);
        let matches = session.scan(&doc);

        assert_eq!(matches.len(), 2);
        assert!(matches[0].text.starts_with("Do you have"));
        assert!(matches[1].text.starts_with("Describe the process"));
        assert_eq!(doc.element(matches[0].element).id, "q1");
    }

    #[test]
    fn repeated_scans_are_idempotent() {
        let doc = Document::parse(PAGE);
        let mut session = ScanSession::new(patterns::DEFAULT_MIN_TEXT_LEN);

        let first = session.scan(&doc);
        let second = session.scan(&doc);

        assert_eq!(first.len(), 2);
        assert!(second.is_empty(), "same elements must not match twice");
        assert_eq!(session.seen_count(), 2);
    }

    #[test]
    fn rescan_after_page_growth_yields_only_new_elements() {
        let mut session = ScanSession::new(patterns::DEFAULT_MIN_TEXT_LEN);
        let doc = Document::parse(PAGE);
        assert_eq!(session.scan(&doc).len(), 2);

        let grown = PAGE.replace(
            "</body>",
            "<p id=\"q3\">Does your organization maintain a vendor risk register?</p></body>",
        );
        let doc2 = Document::parse(grown);
        let fresh = session.scan(&doc2);

        assert_eq!(fresh.len(), 1);
        assert!(fresh[0].text.contains("vendor risk register"));
    }

    #[test]
    fn one_match_per_element() {
        let doc = Document::parse(
            "<p>Do you have a documented backup policy for production data? \
             <br>Do you maintain an offsite copy of critical system backups?</p>",
        );
        let mut session = ScanSession::new(patterns::DEFAULT_MIN_TEXT_LEN);
        // Both runs sit under the same <p>; only the first annotates it.
        assert_eq!(session.scan(&doc).len(), 1);
    }

    #[test]
    fn new_session_starts_clean() {
        let doc = Document::parse(PAGE);
        let mut a = ScanSession::new(patterns::DEFAULT_MIN_TEXT_LEN);
        a.scan(&doc);
        drop(a);

        let mut b = ScanSession::new(patterns::DEFAULT_MIN_TEXT_LEN);
        assert_eq!(b.scan(&doc).len(), 2, "dedup state dies with its session");
    }

    #[test]
    fn compliance_page_gate() {
        assert!(is_compliance_page(&Document::parse(
            "<p>Quarterly security audit checklist</p>"
        )));
        assert!(!is_compliance_page(&Document::parse(
            "<p>Our favourite sourdough recipes</p>"
        )));
    }
}
