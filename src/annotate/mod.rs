//! Annotation rendering — turns API results into HTML cards.
//!
//! Given an anchor's element type and a validation result (or a question
//! recommendation), picks the matching card template and fills it in,
//! defaulting missing fields to neutral placeholders. The [`Annotator`]
//! owns the per-page annotation table: re-annotating the same anchor
//! replaces the prior card, never stacks a second one.

pub mod classify;

use std::collections::HashMap;

pub use classify::{ElementType, classify};

use crate::api::{ApiError, Recommendation, ValidationResult};
use crate::rules::Band;
use crate::scanner::ElementKey;

/// Placeholder when the backend sends no explanation.
const NO_EXPLANATION: &str = "No explanation provided";

/// Placeholder when a recommendation carries no answer.
const NO_ANSWER: &str = "No specific recommendation available";

// ---------------------------------------------------------------------------
// Annotator
// ---------------------------------------------------------------------------

/// A rendered annotation bound to an anchor element.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub key: ElementKey,
    pub html: String,
}

/// Component-owned annotation state for one page session.
#[derive(Debug, Default)]
pub struct Annotator {
    cards: HashMap<ElementKey, String>,
    /// First-annotation order, for stable report output.
    order: Vec<ElementKey>,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the card for an anchor. Re-invocation on the same
    /// anchor swaps the content in place — the anchor keeps its position in
    /// the output and never carries two cards.
    pub fn annotate(&mut self, key: ElementKey, html: String) {
        if self.cards.insert(key, html).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, key: ElementKey) -> Option<&str> {
        self.cards.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Annotations in first-annotation order.
    pub fn iter(&self) -> impl Iterator<Item = Annotation> + '_ {
        self.order.iter().map(|key| Annotation {
            key: *key,
            html: self.cards[key].clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Card templates
// ---------------------------------------------------------------------------

/// Render the validation card for an anchor of the given type.
pub fn render_validation_card(result: &ValidationResult, element_type: ElementType) -> String {
    let score = result.effective_score();
    let band = Band::from_score(score);
    let verdict = result.verdict;
    let explanation = escape_html(
        result
            .explanation
            .as_deref()
            .unwrap_or(NO_EXPLANATION),
    );
    let recommendation = result
        .recommendation
        .as_deref()
        .or(result.guidance.as_deref())
        .map(escape_html);

    let body = match element_type {
        ElementType::Status => {
            let mut html = format!(
                "<div class=\"attest-card-header\">Status Analysis\
                 <span class=\"attest-badge attest-{}\">{} — {}%</span></div>",
                band.css_class(),
                verdict,
                fmt_score(score),
            );
            if let Some(ref rec) = recommendation {
                html.push_str(&format!(
                    "<div class=\"attest-rec\"><div class=\"attest-rec-title\">Recommendation</div>{rec}</div>"
                ));
            }
            if !result.matched_keywords.is_empty() {
                let keywords = escape_html(&result.matched_keywords.join(", "));
                html.push_str(&format!(
                    "<div class=\"attest-rec\"><div class=\"attest-rec-title\">Keywords Found</div>{keywords}</div>"
                ));
            }
            html
        }
        ElementType::Score => {
            let model = fmt_score(result.score);
            let coverage = result
                .rule_coverage
                .map(fmt_score)
                .unwrap_or_else(|| "—".to_string());
            format!(
                "<div class=\"attest-card-header\">Score Details\
                 <span class=\"attest-badge attest-{}\">{}%</span></div>\
                 <div class=\"attest-body\"><strong>Model score:</strong> {model}%<br>\
                 <strong>Rule coverage:</strong> {coverage}%<br>\
                 <strong>Final score:</strong> {}%</div>\
                 <div class=\"attest-body\">{explanation}</div>",
                band.css_class(),
                fmt_score(score),
                fmt_score(score),
            )
        }
        ElementType::Evidence => {
            let mut html = format!(
                "<div class=\"attest-card-header\">Evidence Validation\
                 <span class=\"attest-badge attest-{}\">Score: {}%</span></div>\
                 <div class=\"attest-body\">{explanation}</div>",
                band.css_class(),
                fmt_score(score),
            );
            if let Some(ref rec) = recommendation {
                html.push_str(&format!(
                    "<div class=\"attest-rec\"><div class=\"attest-rec-title\">Improvement Tip</div>{rec}</div>"
                ));
            }
            html
        }
        ElementType::Emissions => {
            let kg = result
                .emissions
                .map(|e| format!("{e}"))
                .unwrap_or_else(|| "0.00001".to_string());
            format!(
                "<div class=\"attest-card-header attest-green\">Carbon Footprint Analysis</div>\
                 <div class=\"attest-emissions\"><div class=\"attest-emissions-value\">{kg} kg CO₂</div>\
                 This validation consumed minimal energy with sustainable AI practices.</div>"
            )
        }
        ElementType::Recommendation => {
            let text = recommendation.unwrap_or(explanation);
            format!(
                "<div class=\"attest-card-header\">AI Recommendation</div>\
                 <div class=\"attest-rec\">{text}</div>"
            )
        }
        ElementType::General => {
            let mut html = format!(
                "<div class=\"attest-card-header\">AI Analysis\
                 <span class=\"attest-badge attest-{}\">Score: {}% — {}</span></div>\
                 <div class=\"attest-body\">{explanation}</div>",
                band.css_class(),
                fmt_score(score),
                verdict,
            );
            if let Some(ref rec) = recommendation {
                html.push_str(&format!(
                    "<div class=\"attest-rec\"><div class=\"attest-rec-title\">Recommendation</div>{rec}</div>"
                ));
            }
            if let Some(emissions) = result.emissions {
                html.push_str(&format!(
                    "<div class=\"attest-rec attest-green\">This validation used <strong>{emissions} kg CO₂</strong></div>"
                ));
            }
            html
        }
    };

    format!("<div class=\"attest-card\">{body}</div>")
}

/// Render the recommendation tooltip for a detected question.
pub fn render_recommendation_card(question: &str, rec: &Recommendation) -> String {
    let band = Band::from_confidence(rec.confidence);
    let answer = escape_html(rec.recommended_answer.as_deref().unwrap_or(NO_ANSWER));
    let pct = (rec.confidence * 100.0).round();

    let mut html = format!(
        "<div class=\"attest-card\" data-question=\"{}\">\
         <div class=\"attest-card-header\"><span class=\"attest-dot\" style=\"background:{}\"></span>\
         AI Recommendation<span class=\"attest-confidence\">{pct:.0}% confident</span></div>\
         <div class=\"attest-body\">{answer}</div>",
        escape_html(question),
        band.color(),
    );
    if !rec.clause_references.is_empty() {
        html.push_str(&format!(
            "<div class=\"attest-clauses\"><div class=\"attest-rec-title\">Referenced Clauses</div>{}</div>",
            escape_html(&rec.clause_references.join(", ")),
        ));
    }
    html.push_str("</div>");
    html
}

/// Render the inline error card for a failed call. Carries the status code
/// for HTTP errors; never replaces any prior successful card.
pub fn render_error_card(err: &ApiError) -> String {
    format!(
        "<div class=\"attest-card attest-error\"><div class=\"attest-card-header\">Error</div>\
         <div class=\"attest-body\">Failed to fetch AI insight: {}. Please try again.</div></div>",
        escape_html(&err.to_string()),
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Display a score without a fractional tail (92.0 → "92").
fn fmt_score(score: f64) -> String {
    format!("{}", score.round() as i64)
}

/// Escape text for interpolation into card HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Verdict;

    fn pass_result() -> ValidationResult {
        ValidationResult {
            verdict: Verdict::Pass,
            score: 92.0,
            explanation: Some("AES-256 encryption verified".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn pass_card_shows_verdict_score_and_green_band() {
        let html = render_validation_card(&pass_result(), ElementType::General);
        assert!(html.contains("Pass"));
        assert!(html.contains("92%"));
        assert!(html.contains("attest-high"));
        assert!(html.contains("AES-256 encryption verified"));
    }

    #[test]
    fn medium_and_low_bands_render() {
        let mut result = pass_result();
        result.score = 67.0;
        result.verdict = Verdict::Partial;
        assert!(render_validation_card(&result, ElementType::General).contains("attest-medium"));

        result.score = 45.0;
        result.verdict = Verdict::Fail;
        assert!(render_validation_card(&result, ElementType::General).contains("attest-low"));
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let result = ValidationResult::default();
        let html = render_validation_card(&result, ElementType::General);
        assert!(html.contains("Unknown"));
        assert!(html.contains(NO_EXPLANATION));
    }

    #[test]
    fn guidance_substitutes_for_missing_recommendation() {
        let mut result = pass_result();
        result.guidance = Some("Rotate keys every 6 months".to_string());
        let html = render_validation_card(&result, ElementType::Evidence);
        assert!(html.contains("Rotate keys every 6 months"));
    }

    #[test]
    fn score_card_shows_rule_coverage_breakdown() {
        let mut result = pass_result();
        result.final_score = Some(88.0);
        result.rule_coverage = Some(84.0);
        let html = render_validation_card(&result, ElementType::Score);
        assert!(html.contains("Rule coverage:</strong> 84%"));
        assert!(html.contains("Final score:</strong> 88%"));
    }

    #[test]
    fn error_card_carries_http_status() {
        let err = ApiError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        let html = render_error_card(&err);
        assert!(html.contains("500"));
        assert!(html.contains("attest-error"));
    }

    #[test]
    fn reannotation_replaces_without_stacking() {
        let mut annotator = Annotator::new();
        annotator.annotate(42, "<div>first</div>".to_string());
        annotator.annotate(42, "<div>second</div>".to_string());

        assert_eq!(annotator.len(), 1);
        assert_eq!(annotator.get(42), Some("<div>second</div>"));
    }

    #[test]
    fn error_does_not_disturb_prior_success() {
        let mut annotator = Annotator::new();
        annotator.annotate(1, render_validation_card(&pass_result(), ElementType::General));
        annotator.annotate(
            2,
            render_error_card(&ApiError::Network("timed out".to_string())),
        );

        assert!(annotator.get(1).unwrap().contains("92%"));
        assert!(annotator.get(2).unwrap().contains("timed out"));
    }

    #[test]
    fn recommendation_card_bands_confidence() {
        let rec = Recommendation {
            confidence: 0.85,
            recommended_answer: Some("Yes, with annual review.".to_string()),
            clause_references: vec!["A.12.3".to_string(), "A.12.4".to_string()],
        };
        let html = render_recommendation_card("Do you have a policy?", &rec);
        assert!(html.contains("85% confident"));
        assert!(html.contains("#10b981"));
        assert!(html.contains("A.12.3, A.12.4"));
    }

    #[test]
    fn escapes_untrusted_text() {
        let mut result = pass_result();
        result.explanation = Some("<script>alert(1)</script>".to_string());
        let html = render_validation_card(&result, ElementType::General);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
