//! Shared business rules for the whole system.
//!
//! Score banding, verdict presentation, compliance-page keywords, and the
//! canned chat replies all live here exactly once. The annotator, the CLI
//! renderers, the chat fallback, and the dashboard frontend (which receives
//! these values serialized into the page) consume the same tables — there is
//! no second copy to drift.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Score banding
// ---------------------------------------------------------------------------

/// Lower bound (inclusive) of the high band on the 0–100 score scale.
pub const SCORE_HIGH_MIN: f64 = 80.0;

/// Lower bound (inclusive) of the medium band on the 0–100 score scale.
pub const SCORE_MEDIUM_MIN: f64 = 60.0;

/// Lower bound (inclusive) of the high band on the 0–1 confidence scale.
pub const CONFIDENCE_HIGH_MIN: f64 = 0.8;

/// Lower bound (inclusive) of the medium band on the 0–1 confidence scale.
pub const CONFIDENCE_MEDIUM_MIN: f64 = 0.6;

/// Color band for a score or confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    High,
    Medium,
    Low,
}

impl Band {
    /// Band a 0–100 score. Boundaries are inclusive on the lower bound.
    pub fn from_score(score: f64) -> Self {
        if score >= SCORE_HIGH_MIN {
            Self::High
        } else if score >= SCORE_MEDIUM_MIN {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Band a 0–1 recommendation confidence.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= CONFIDENCE_HIGH_MIN {
            Self::High
        } else if confidence >= CONFIDENCE_MEDIUM_MIN {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Hex color used in annotation cards and the report stylesheet.
    pub fn color(self) -> &'static str {
        match self {
            Self::High => "#10b981",
            Self::Medium => "#f59e0b",
            Self::Low => "#ef4444",
        }
    }

    /// CSS class suffix used by the card templates (`high`/`medium`/`low`).
    pub fn css_class(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// Categorical outcome of a compliance check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Pass,
    Partial,
    Fail,
    #[default]
    Unknown,
}

// Hand-written so any unrecognized verdict string ("Pending", "N/A", a
// future backend value) degrades to Unknown instead of failing the parse.
impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Pass" => Self::Pass,
            "Partial" => Self::Partial,
            "Fail" => Self::Fail,
            _ => Self::Unknown,
        })
    }
}

impl Verdict {
    pub fn color(self) -> &'static str {
        match self {
            Self::Pass => "#10b981",
            Self::Partial => "#f59e0b",
            Self::Fail => "#ef4444",
            Self::Unknown => "#64748b",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Partial => "⚠️",
            Self::Fail => "❌",
            Self::Unknown => "❓",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Partial => "Partial",
            Self::Fail => "Fail",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Compliance-page detection
// ---------------------------------------------------------------------------

/// A page qualifies for inline annotation when its visible text contains any
/// of these (lowercase substring match).
pub const COMPLIANCE_KEYWORDS: &[&str] = &[
    "compliance",
    "audit",
    "security",
    "policy",
    "iso",
    "control",
    "checklist",
    "evidence",
    "validation",
];

/// Check whether lowercased page text looks compliance-related.
pub fn is_compliance_text(lower_text: &str) -> bool {
    COMPLIANCE_KEYWORDS.iter().any(|kw| lower_text.contains(kw))
}

// ---------------------------------------------------------------------------
// Canned chat replies
// ---------------------------------------------------------------------------

/// One canned reply: any of `keywords` (lowercase substring) selects `reply`.
pub struct CannedReply {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

/// Ordered fallback table for the chat module. First match wins, so more
/// specific topics must precede broader ones (e.g. `fail` before `score`).
pub const CANNED_REPLIES: &[CannedReply] = &[
    CannedReply {
        keywords: &["encryption", "encrypt"],
        reply: "Based on the compliance analysis, the Data Encryption Policy received a Pass verdict with a score of 92%. The AES-256 encryption has been properly verified. However, I recommend implementing a key rotation schedule every 6 months to maintain security best practices.",
    },
    CannedReply {
        keywords: &["fail", "failed"],
        reply: "The Regular Security Audits control failed with a score of 45% because there is missing evidence of regular security audits. To resolve this, please upload audit reports from the past 12 months and ensure quarterly security assessments are documented.",
    },
    CannedReply {
        keywords: &["partial"],
        reply: "The Data Retention Policy received a Partial verdict (67%) because it's missing a retention duration clause for archived data. I recommend adding specific retention timelines for all data categories to achieve full compliance.",
    },
    CannedReply {
        keywords: &["improve", "score"],
        reply: "To improve your compliance score, focus on these areas:\n\n1. Upload missing documentation for failed controls\n2. Add specific timelines and procedures to partial controls\n3. Ensure all documents include: implementation dates, responsible parties, review schedules, and approval signatures\n4. Schedule regular compliance reviews\n\nYour current average score is strong, but addressing the failed and partial controls will bring you to full compliance.",
    },
    CannedReply {
        keywords: &["retention", "data retention"],
        reply: "The Data Retention Policy needs improvement. While the basic policy exists, it lacks specific retention duration clauses for archived data. Add clear timelines for how long different data categories should be retained, and specify deletion procedures for data that exceeds retention periods.",
    },
    CannedReply {
        keywords: &["access control"],
        reply: "The Access Control Policy is performing well with an 88% score and Pass verdict. The role-based access control (RBAC) is properly implemented. Continue maintaining current standards and conduct quarterly reviews to ensure ongoing compliance.",
    },
    CannedReply {
        keywords: &["incident", "response"],
        reply: "The Incident Response Plan is excellent with a 95% score! The comprehensive incident response procedures are well-documented. Continue conducting regular drills and keep the documentation updated as your systems evolve.",
    },
    CannedReply {
        keywords: &["audit"],
        reply: "Regular Security Audits are currently failing. The system couldn't find evidence of regular security audits in the uploaded documentation. Please provide:\n\n1. Audit reports from the past 12 months\n2. Evidence of quarterly security assessments\n3. Documentation of remediation actions taken\n\nThis will significantly improve your compliance score.",
    },
    CannedReply {
        keywords: &["co2", "emission", "carbon"],
        reply: "Our sustainable AI approach has achieved impressive results:\n\n• Total CO₂ emissions: 8.5g\n• Energy saved: 18% compared to traditional AI models\n• Average per validation: 1.7g CO₂\n\nThis represents a 70% reduction in energy consumption compared to larger language models, while maintaining high accuracy in compliance validation.",
    },
    CannedReply {
        keywords: &["sustainable", "energy"],
        reply: "The validator runs on an energy-efficient model that requires 70% less compute power than larger alternatives. All emissions are tracked per run, and the optimized inference pipeline minimizes environmental impact while maintaining high accuracy. You're saving 18% energy compared to traditional compliance validation methods!",
    },
    CannedReply {
        keywords: &["help", "how"],
        reply: "I can help you with:\n\n• Explaining why specific controls passed, failed, or received partial verdicts\n• Providing recommendations to improve compliance scores\n• Answering questions about missing documentation\n• Clarifying compliance requirements\n• Explaining the sustainable AI approach\n\nJust ask me about any control or aspect of your compliance validation!",
    },
];

/// Generic line when no keyword matches.
pub const CANNED_DEFAULT: &str = "I'm your compliance assistant. I can help explain verdicts, suggest improvements, and answer questions about your compliance validation results. Try asking about specific controls like 'Why did encryption fail?' or 'How can I improve my score?'";

/// Pick the canned reply for a user message. Scans the lowercased message
/// against the ordered table; first matching entry wins.
pub fn canned_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    for entry in CANNED_REPLIES {
        if entry.keywords.iter().any(|kw| lower.contains(kw)) {
            return entry.reply;
        }
    }
    CANNED_DEFAULT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_band_boundaries_inclusive_on_lower_bound() {
        assert_eq!(Band::from_score(100.0), Band::High);
        assert_eq!(Band::from_score(80.0), Band::High);
        assert_eq!(Band::from_score(79.9), Band::Medium);
        assert_eq!(Band::from_score(60.0), Band::Medium);
        assert_eq!(Band::from_score(59.9), Band::Low);
        assert_eq!(Band::from_score(0.0), Band::Low);
    }

    #[test]
    fn confidence_band_boundaries() {
        assert_eq!(Band::from_confidence(0.8), Band::High);
        assert_eq!(Band::from_confidence(0.79), Band::Medium);
        assert_eq!(Band::from_confidence(0.6), Band::Medium);
        assert_eq!(Band::from_confidence(0.59), Band::Low);
    }

    #[test]
    fn verdict_round_trips_through_serde() {
        let json = serde_json::to_string(&Verdict::Partial).unwrap();
        assert_eq!(json, "\"Partial\"");
        let back: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Verdict::Partial);
    }

    #[test]
    fn unrecognized_verdict_falls_back_to_unknown() {
        let v: Verdict = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(v, Verdict::Unknown);
    }

    #[test]
    fn canned_reply_first_match_wins() {
        // "failed" appears before "audit" in the table, so a message with
        // both selects the fail reply.
        let reply = canned_reply("Why did the audit control fail?");
        assert!(reply.contains("Regular Security Audits control failed"));
    }

    #[test]
    fn canned_reply_matches_encryption() {
        let reply = canned_reply("Tell me about ENCRYPTION keys");
        assert!(reply.contains("AES-256"));
    }

    #[test]
    fn canned_reply_defaults_when_no_keyword() {
        assert_eq!(canned_reply("bonjour"), CANNED_DEFAULT);
    }

    #[test]
    fn compliance_text_detection() {
        assert!(is_compliance_text("annual security audit checklist"));
        assert!(!is_compliance_text("recipe for banana bread"));
    }
}
