//! Coarse element classification for annotation templates.
//!
//! The card rendered for a result depends on what kind of page element it
//! anchors to, derived from class-name substrings and the tag name. The
//! class check runs in a fixed order; the first hit wins.

use serde::Serialize;

/// What an anchor element appears to represent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Status,
    Score,
    Evidence,
    Recommendation,
    Emissions,
    #[default]
    General,
}

/// Classify an element by tag name, lowercased class attribute, and visible
/// text. `input`/`textarea` elements are evidence fields regardless of
/// class; `co2` in the text marks an emissions cell even without a class.
pub fn classify(tag: &str, classes: &str, text: &str) -> ElementType {
    if classes.contains("status") || classes.contains("verdict") {
        return ElementType::Status;
    }
    if classes.contains("score") {
        return ElementType::Score;
    }
    if classes.contains("evidence") || tag == "input" || tag == "textarea" {
        return ElementType::Evidence;
    }
    if classes.contains("recommendation") {
        return ElementType::Recommendation;
    }
    if classes.contains("emission") || text.to_lowercase().contains("co2") {
        return ElementType::Emissions;
    }
    ElementType::General
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Score => "score",
            Self::Evidence => "evidence",
            Self::Recommendation => "recommendation",
            Self::Emissions => "emissions",
            Self::General => "general",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_substrings_drive_classification() {
        assert_eq!(classify("td", "row-status ok", ""), ElementType::Status);
        assert_eq!(classify("td", "verdict-cell", ""), ElementType::Status);
        assert_eq!(classify("span", "score-badge", ""), ElementType::Score);
        assert_eq!(classify("div", "evidence-box", ""), ElementType::Evidence);
        assert_eq!(
            classify("div", "ai-recommendation", ""),
            ElementType::Recommendation
        );
        assert_eq!(classify("td", "emission-col", ""), ElementType::Emissions);
    }

    #[test]
    fn status_outranks_score_when_both_present() {
        assert_eq!(classify("td", "status score", ""), ElementType::Status);
    }

    #[test]
    fn form_fields_are_evidence_regardless_of_class() {
        assert_eq!(classify("input", "", ""), ElementType::Evidence);
        assert_eq!(classify("textarea", "notes", ""), ElementType::Evidence);
    }

    #[test]
    fn co2_text_marks_emissions() {
        assert_eq!(classify("td", "", "0.002 kg CO2"), ElementType::Emissions);
    }

    #[test]
    fn default_is_general() {
        assert_eq!(classify("p", "", "plain paragraph"), ElementType::General);
    }
}
