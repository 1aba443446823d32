//! HTML layer tests against a realistic audit-portal fixture: tolerant
//! parsing, element context, and byte-exact re-emission guarantees the
//! report writer depends on.

use attest::html::{Document, collapse_whitespace, decode_entities};

/// Messy but realistic markup: unclosed <td>, attribute soup, entities,
/// inline script, a self-closing input.
const PORTAL: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Controls &amp; Evidence</title>
  <script type="text/javascript">
    function noop() { return "<td>not markup</td>"; }
  </script>
</head>
<body>
  <table class="audit-table">
    <tr class="control-row" data-control-id="C-001">
      <td CLASS="Status">Pending
      <td class='score'>72%</td>
      <td class="evidence"><input type="file" name="upload"/></td>
    </tr>
  </table>
  <div class="footer">Last reviewed:&nbsp;2025</div>
</body>
</html>"#;

#[test]
fn parses_the_portal_without_losing_text() {
    let doc = Document::parse(PORTAL);
    let text = doc.visible_text();

    assert!(text.contains("Controls & Evidence"));
    assert!(text.contains("Pending"));
    assert!(text.contains("72%"));
    assert!(text.contains("Last reviewed: 2025"));
    assert!(!text.contains("not markup"), "script bodies are not text");
}

#[test]
fn element_context_includes_lowercased_classes() {
    let doc = Document::parse(PORTAL);

    let status = doc
        .elements()
        .iter()
        .find(|e| e.classes == "status")
        .expect("uppercase CLASS attribute still parses");
    assert_eq!(status.tag, "td");

    let score = doc
        .elements()
        .iter()
        .find(|e| e.classes == "score")
        .expect("single-quoted class parses");
    assert_eq!(score.tag, "td");
}

#[test]
fn text_runs_know_their_enclosing_element() {
    let doc = Document::parse(PORTAL);
    let run = doc
        .text_runs()
        .iter()
        .find(|r| doc.text(r).contains("72%"))
        .unwrap();
    let element = doc.element(run.element.unwrap());
    assert_eq!(element.tag, "td");
    assert_eq!(element.classes, "score");
}

#[test]
fn source_is_preserved_byte_for_byte() {
    let doc = Document::parse(PORTAL);
    assert_eq!(doc.source(), PORTAL);
}

#[test]
fn unclosed_td_is_closed_by_the_next_close_tag() {
    // "<td CLASS="Status">Pending" has no </td>; the sibling's </td>
    // terminates it without dropping any text.
    let doc = Document::parse(PORTAL);
    let text = doc.visible_text();
    assert!(text.contains("Pending"));
    assert!(text.contains("72%"));
}

#[test]
fn entity_decoding_covers_the_common_set() {
    assert_eq!(decode_entities("a &amp; b"), "a & b");
    assert_eq!(decode_entities("&lt;ok&gt;"), "<ok>");
    assert_eq!(decode_entities("&quot;x&quot; &#39;y&#39;"), "\"x\" 'y'");
    assert_eq!(decode_entities("no entities"), "no entities");
}

#[test]
fn whitespace_collapse_is_stable() {
    assert_eq!(collapse_whitespace("  a\n\n  b\t c  "), "a b c");
    assert_eq!(collapse_whitespace("single"), "single");
    assert_eq!(collapse_whitespace("   "), "");
}

#[test]
fn empty_and_degenerate_inputs_do_not_panic() {
    for src in ["", "<", "<>", "</div>", "<p", "text only", "<!---->", "<!doctype html>"] {
        let doc = Document::parse(src);
        let _ = doc.visible_text();
        let _ = doc.elements();
    }
}
