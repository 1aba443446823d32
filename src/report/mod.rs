//! Report generation.
//!
//! Two outputs live here: the annotated copy of a scanned page (the original
//! markup re-emitted byte for byte with annotation cards injected after
//! their anchor elements), and the standalone results report the dashboard
//! serves as a download.

use std::collections::HashMap;

use crate::annotate::Annotator;
use crate::api::EmissionsSummary;
use crate::html::{self, Document};
use crate::rules::{Band, Verdict};
use crate::scanner::{self, ElementKey};
use crate::store::StoredValidation;

/// Stylesheet injected into annotated pages. Matches the card classes the
/// annotation templates emit.
const OVERLAY_STYLE: &str = r#"<style id="attest-overlay-styles">
.attest-card { background: #f5f8ff; border-left: 4px solid #6a5acd; border-radius: 6px;
  padding: 12px 16px; margin: 8px 0; font-family: -apple-system, "Segoe UI", sans-serif;
  font-size: 13px; line-height: 1.6; color: #374151; }
.attest-card-header { font-weight: 700; font-size: 14px; color: #6a5acd; margin-bottom: 8px;
  display: flex; align-items: center; gap: 8px; }
.attest-card-header.attest-green { color: #166534; }
.attest-badge { display: inline-block; padding: 3px 10px; border-radius: 12px;
  font-weight: 600; font-size: 12px; margin-left: auto; }
.attest-badge.attest-high { background: #d1fae5; color: #065f46; }
.attest-badge.attest-medium { background: #fef3c7; color: #92400e; }
.attest-badge.attest-low { background: #fee2e2; color: #991b1b; }
.attest-rec { margin-top: 10px; padding: 10px 12px; background: #eff6ff; border-radius: 6px;
  font-size: 12px; }
.attest-rec.attest-green { background: #f0fdf4; color: #166534; }
.attest-rec-title { font-weight: 600; color: #1e40af; margin-bottom: 4px; }
.attest-emissions { margin-top: 8px; padding: 12px; background: #f0fdf4; border-radius: 6px;
  color: #166534; }
.attest-emissions-value { font-size: 22px; font-weight: 700; margin-bottom: 6px; }
.attest-dot { width: 8px; height: 8px; border-radius: 50%; display: inline-block; }
.attest-confidence { margin-left: auto; font-size: 12px; color: #94a3b8; font-weight: 500; }
.attest-clauses { margin-top: 10px; padding-top: 10px; border-top: 1px solid #dbeafe;
  font-size: 12px; }
.attest-card.attest-error { background: #fef2f2; border-left-color: #ef4444; }
.attest-card.attest-error .attest-card-header { color: #991b1b; }
</style>"#;

// ---------------------------------------------------------------------------
// Annotated page
// ---------------------------------------------------------------------------

/// Fingerprint every (element, text-run) pair of a document so annotations
/// keyed on a previous parse can be re-anchored in this one.
pub fn locate_anchors(doc: &Document) -> HashMap<ElementKey, usize> {
    let mut anchors = HashMap::new();
    for run in doc.text_runs() {
        let Some(el_idx) = run.element else { continue };
        let decoded = html::decode_entities(doc.text(run));
        let trimmed = decoded.trim();
        if trimmed.is_empty() {
            continue;
        }
        anchors
            .entry(scanner::element_key(doc.element(el_idx), trimmed))
            .or_insert(el_idx);
    }
    anchors
}

/// Re-emit the page with annotation cards injected after their anchors.
///
/// An annotation whose anchor is no longer present in this document is
/// dropped silently — a result arriving after the page moved on must never
/// corrupt the output. The source markup itself is preserved unchanged.
pub fn render_annotated_page(doc: &Document, annotator: &Annotator) -> String {
    let anchors = locate_anchors(doc);

    // Injection offset for each surviving annotation, in annotation order.
    let mut injections: Vec<(usize, String)> = annotator
        .iter()
        .filter_map(|annotation| {
            let el_idx = *anchors.get(&annotation.key)?;
            Some((doc.element(el_idx).end, annotation.html))
        })
        .collect();
    injections.sort_by_key(|(offset, _)| *offset);

    let source = doc.source();
    let mut out = String::with_capacity(source.len() + 4096);
    out.push_str(OVERLAY_STYLE);

    let mut cursor = 0;
    for (offset, card) in injections {
        let offset = offset.min(source.len());
        out.push_str(&source[cursor..offset]);
        out.push_str(&card);
        cursor = offset;
    }
    out.push_str(&source[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Downloadable results report
// ---------------------------------------------------------------------------

/// Build the self-contained HTML report served by `GET /report/download`.
pub fn results_report(controls: &[StoredValidation], emissions: &EmissionsSummary) -> String {
    let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    let avg = crate::store::average_score(controls);

    let mut rows = String::new();
    for control in controls {
        let verdict = control.result.verdict;
        let score = control.result.effective_score();
        let band = Band::from_score(score);
        rows.push_str(&format!(
            "<tr><td>{}</td><td style=\"color:{}\">{} {}</td>\
             <td style=\"color:{}\">{:.0}%</td><td>{}</td><td>{}</td></tr>\n",
            crate::annotate::escape_html(&control.control_text),
            verdict.color(),
            verdict.icon(),
            verdict,
            band.color(),
            score,
            crate::annotate::escape_html(
                control.result.explanation.as_deref().unwrap_or("—")
            ),
            crate::annotate::escape_html(
                control.result.recommendation.as_deref().unwrap_or("—")
            ),
        ));
    }

    let verdict_counts = |v: Verdict| {
        controls
            .iter()
            .filter(|c| c.result.verdict == v)
            .count()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Compliance Report</title>
<style>
body {{ font-family: -apple-system, "Segoe UI", sans-serif; margin: 40px; color: #1f2937; }}
h1 {{ font-size: 22px; }} .meta {{ color: #6b7280; font-size: 13px; margin-bottom: 24px; }}
.summary {{ display: flex; gap: 24px; margin-bottom: 24px; font-size: 14px; }}
.summary b {{ font-size: 20px; display: block; }}
table {{ border-collapse: collapse; width: 100%; font-size: 13px; }}
th, td {{ border: 1px solid #e5e7eb; padding: 8px 12px; text-align: left; vertical-align: top; }}
th {{ background: #f9fafb; }}
</style>
</head>
<body>
<h1>Compliance Validation Report</h1>
<div class="meta">Generated {generated} · {count} control(s)</div>
<div class="summary">
  <div><b>{avg:.0}%</b>Average score</div>
  <div><b>{pass}</b>Pass</div>
  <div><b>{partial}</b>Partial</div>
  <div><b>{fail}</b>Fail</div>
  <div><b>{total_emissions:.4} kg</b>Total CO₂</div>
</div>
<table>
<thead><tr><th>Control</th><th>Verdict</th><th>Score</th><th>Explanation</th><th>Recommendation</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        count = controls.len(),
        pass = verdict_counts(Verdict::Pass),
        partial = verdict_counts(Verdict::Partial),
        fail = verdict_counts(Verdict::Fail),
        total_emissions = emissions.total_emissions,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{self, ElementType};
    use crate::api::ValidationResult;
    use crate::rules::Verdict;
    use crate::scanner::ScanSession;
    use crate::scanner::patterns::DEFAULT_MIN_TEXT_LEN;

    const PAGE: &str = "<html><body>\
        <p id=\"q1\">Do you have a documented incident response plan in place?</p>\
        <p id=\"q2\">Unrelated text without any question in it at all.</p>\
        </body></html>";

    fn annotated() -> (Document, Annotator) {
        let doc = Document::parse(PAGE);
        let mut session = ScanSession::new(DEFAULT_MIN_TEXT_LEN);
        let matches = session.scan(&doc);
        assert_eq!(matches.len(), 1);

        let mut annotator = Annotator::new();
        let result = ValidationResult {
            verdict: Verdict::Pass,
            score: 92.0,
            ..Default::default()
        };
        annotator.annotate(
            matches[0].key,
            annotate::render_validation_card(&result, ElementType::General),
        );
        (doc, annotator)
    }

    #[test]
    fn card_lands_after_its_anchor() {
        let (doc, annotator) = annotated();
        let out = render_annotated_page(&doc, &annotator);

        let anchor_end = out.find("plan in place?</p>").unwrap() + "plan in place?</p>".len();
        let card_at = out.find("<div class=\"attest-card\"").unwrap();
        assert!(card_at >= anchor_end, "card must follow the anchor subtree");
        assert!(out.contains(OVERLAY_STYLE));
        // Original markup is intact.
        assert!(out.contains("<p id=\"q2\">Unrelated text"));
    }

    #[test]
    fn vanished_anchor_is_skipped_silently() {
        let (_, annotator) = annotated();
        // The anchor paragraph is gone from the re-fetched page.
        let shrunk = Document::parse("<html><body><p>only this left</p></body></html>");
        let out = render_annotated_page(&shrunk, &annotator);

        assert!(!out.contains("attest-card\">"));
        assert!(out.contains("only this left"));
    }

    #[test]
    fn results_report_contains_summary_and_rows() {
        let controls = crate::store::demo::demo_controls();
        let emissions = crate::store::demo::demo_emissions();
        let html = results_report(&controls, &emissions);

        assert!(html.contains("Data Encryption Policy"));
        assert!(html.contains("Average score"));
        assert!(html.contains("0.0085 kg"));
    }

    #[test]
    fn results_report_for_empty_store_shows_zero_average() {
        let html = results_report(&[], &EmissionsSummary::default());
        assert!(html.contains("<b>0%</b>"));
    }
}
