//! Annotation rendering tests: banding, templates, error cards.
//!
//! Covers the score-to-color contract (inclusive lower bounds), the
//! element-type template dispatch, and the failure behaviors: an HTTP error
//! renders inline with its status code and never disturbs prior results.

use attest::annotate::{
    self, Annotator, ElementType, classify, render_error_card, render_validation_card,
};
use attest::api::{ApiError, ValidationResult};
use attest::rules::{Band, Verdict};

fn result(verdict: Verdict, score: f64) -> ValidationResult {
    ValidationResult {
        verdict,
        score,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Banding
// ---------------------------------------------------------------------------

#[test]
fn banding_boundaries_are_inclusive_on_the_lower_bound() {
    for (score, band) in [
        (100.0, Band::High),
        (80.0, Band::High),
        (79.999, Band::Medium),
        (60.0, Band::Medium),
        (59.999, Band::Low),
        (0.0, Band::Low),
    ] {
        assert_eq!(Band::from_score(score), band, "score {score}");
    }
}

#[test]
fn band_colors_are_the_shared_palette() {
    assert_eq!(Band::High.color(), "#10b981");
    assert_eq!(Band::Medium.color(), "#f59e0b");
    assert_eq!(Band::Low.color(), "#ef4444");
}

// ---------------------------------------------------------------------------
// The validated-pass scenario
// ---------------------------------------------------------------------------

#[test]
fn pass_92_renders_green_card_with_verdict_and_score() {
    // Server response {data: {verdict: "Pass", score: 92}} for evidence
    // "We encrypt all data with AES-256".
    let payload = attest::api::unwrap_envelope(serde_json::json!({
        "status": "ok",
        "message": "validated",
        "data": { "verdict": "Pass", "score": 92 }
    }));
    let result: ValidationResult = serde_json::from_value(payload).unwrap();

    let html = render_validation_card(&result, ElementType::General);
    assert!(html.contains("Pass"));
    assert!(html.contains("92%"));
    assert!(html.contains("attest-high"));
}

// ---------------------------------------------------------------------------
// Template dispatch
// ---------------------------------------------------------------------------

#[test]
fn each_element_type_gets_its_template() {
    let mut full = result(Verdict::Partial, 67.0);
    full.explanation = Some("Retention clause missing".to_string());
    full.recommendation = Some("Add retention timelines".to_string());
    full.rule_coverage = Some(64.0);
    full.emissions = Some(0.0012);
    full.matched_keywords = vec!["retention".to_string()];

    let cases = [
        (ElementType::Status, "Status Analysis"),
        (ElementType::Score, "Score Details"),
        (ElementType::Evidence, "Evidence Validation"),
        (ElementType::Recommendation, "AI Recommendation"),
        (ElementType::Emissions, "Carbon Footprint Analysis"),
        (ElementType::General, "AI Analysis"),
    ];
    for (element_type, header) in cases {
        let html = render_validation_card(&full, element_type);
        assert!(
            html.contains(header),
            "{element_type:?} should render {header:?}"
        );
    }
}

#[test]
fn classifier_follows_class_and_tag_heuristics() {
    assert_eq!(classify("td", "status-cell", ""), ElementType::Status);
    assert_eq!(classify("span", "final-score", ""), ElementType::Score);
    assert_eq!(classify("input", "", ""), ElementType::Evidence);
    assert_eq!(classify("div", "", "totals in kg co2"), ElementType::Emissions);
    assert_eq!(classify("p", "", "anything else"), ElementType::General);
}

#[test]
fn status_card_lists_matched_keywords() {
    let mut r = result(Verdict::Pass, 88.0);
    r.matched_keywords = vec!["encryption".to_string(), "aes-256".to_string()];
    let html = render_validation_card(&r, ElementType::Status);
    assert!(html.contains("Keywords Found"));
    assert!(html.contains("encryption, aes-256"));
}

// ---------------------------------------------------------------------------
// Error behavior
// ---------------------------------------------------------------------------

#[test]
fn http_500_renders_inline_error_and_keeps_prior_result() {
    let mut annotator = Annotator::new();

    // A successful validation lands first.
    annotator.annotate(
        7,
        render_validation_card(&result(Verdict::Pass, 92.0), ElementType::General),
    );

    // A later call fails with HTTP 500; it renders on its own anchor.
    let err = ApiError::Http {
        status: 500,
        status_text: "Internal Server Error".to_string(),
    };
    annotator.annotate(8, render_error_card(&err));

    let error_html = annotator.get(8).unwrap();
    assert!(error_html.contains("500"));
    assert!(error_html.contains("attest-error"));

    // Prior success untouched.
    let ok_html = annotator.get(7).unwrap();
    assert!(ok_html.contains("92%"));
    assert!(!ok_html.contains("attest-error"));
}

#[test]
fn network_error_card_has_no_status_but_shows_cause() {
    let err = ApiError::Network("connection refused".to_string());
    let html = render_error_card(&err);
    assert!(html.contains("connection refused"));
    assert_eq!(err.status(), None);
}

#[test]
fn reannotating_an_anchor_replaces_the_card() {
    let mut annotator = Annotator::new();
    annotator.annotate(
        1,
        render_validation_card(&result(Verdict::Fail, 45.0), ElementType::General),
    );
    annotator.annotate(
        1,
        render_validation_card(&result(Verdict::Pass, 95.0), ElementType::General),
    );

    assert_eq!(annotator.len(), 1);
    let html = annotator.get(1).unwrap();
    assert!(html.contains("95%"));
    assert!(!html.contains("45%"));
}

#[test]
fn unknown_fields_default_to_neutral_placeholders() {
    let html = render_validation_card(&ValidationResult::default(), ElementType::Evidence);
    assert!(html.contains("No explanation provided"));
    // Score 0 is in the low band.
    assert!(html.contains("attest-low"));
}

#[test]
fn remote_text_is_escaped_into_cards() {
    let mut r = result(Verdict::Pass, 90.0);
    r.recommendation = Some("<img onerror=x src=y> rotate keys".to_string());
    let html = render_validation_card(&r, ElementType::General);
    assert!(!html.contains("<img"));
    assert!(html.contains("&lt;img"));
    let _ = annotate::escape_html("&"); // exported helper stays callable
}
