//! HTTP client shim for the remote compliance validation service.
//!
//! Wraps the validate / chat / recommendations / emissions endpoints behind
//! one synchronous `ureq` client. Every call is single-attempt with no retry;
//! failures surface as an [`ApiError`] carrying the status code and text.
//!
//! Some endpoints wrap their payload in an envelope `{status, message,
//! data}` and some return the payload bare. [`unwrap_envelope`] normalizes
//! both shapes exactly once, at this boundary, so downstream consumers only
//! ever see the payload.

pub mod error;
pub mod multipart;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::schema::ApiConfig;
use crate::rules::Verdict;
pub use error::ApiError;
use multipart::MultipartForm;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Result of validating one control's evidence. Produced by the remote
/// service; read-only on this side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(default)]
    pub score: f64,
    /// Blended score when the backend combines model score and rule
    /// coverage. Takes precedence over `score` for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
    /// kg CO₂ consumed by this validation run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_coverage: Option<f64>,
}

impl ValidationResult {
    /// The score to display: `final_score` when present, else `score`.
    pub fn effective_score(&self) -> f64 {
        self.final_score.unwrap_or(self.score)
    }
}

/// AI answer recommendation for a detected compliance question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clause_references: Vec<String>,
}

/// Aggregate emissions figures for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionsSummary {
    #[serde(default)]
    pub total_emissions: f64,
    #[serde(default)]
    pub energy_saved: f64,
    #[serde(default)]
    pub avg_per_run: f64,
    #[serde(default)]
    pub history: Vec<EmissionEntry>,
}

/// One point in the emissions time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionEntry {
    pub timestamp: String,
    pub emissions: f64,
}

// ---------------------------------------------------------------------------
// Validate request
// ---------------------------------------------------------------------------

/// Evidence supporting a control: inline text or an uploaded file.
#[derive(Debug, Clone)]
pub enum Evidence {
    Text(String),
    File { name: String, bytes: Vec<u8> },
}

/// Input to [`ApiClient::validate`].
#[derive(Debug, Clone)]
pub struct ValidateRequest {
    pub checklist_id: Option<String>,
    pub control_text: Option<String>,
    pub evidence: Evidence,
}

// ---------------------------------------------------------------------------
// Envelope normalization
// ---------------------------------------------------------------------------

/// Unwrap the `{status, message, data}` envelope some endpoints use.
///
/// Contract: if the body is a JSON object with a `data` key, the payload is
/// that key's value; otherwise the body *is* the payload. This is the only
/// place the envelope is handled — callers never see it.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the compliance backend.
///
/// Built from the `[api]` config section and reused for the lifetime of one
/// command (or one dashboard server). Carries no mutable state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Base URL without a trailing slash, for display in `health`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit evidence for one control. Multipart form per the backend
    /// contract: `checklist_id` and `control_text` as text fields, evidence
    /// as either `evidence_text` or an `evidence_file` part.
    pub fn validate(&self, request: &ValidateRequest) -> Result<ValidationResult, ApiError> {
        let mut form = MultipartForm::new();
        if let Some(ref id) = request.checklist_id {
            form = form.text("checklist_id", id);
        }
        if let Some(ref control) = request.control_text {
            form = form.text("control_text", control);
        }
        form = match request.evidence {
            Evidence::Text(ref text) => form.text("evidence_text", text),
            Evidence::File { ref name, ref bytes } => form.file("evidence_file", name, bytes),
        };
        let (content_type, body) = form.finish();

        let response = ureq::post(&format!("{}/api/validate", self.base_url))
            .timeout(self.timeout)
            .set("Content-Type", &content_type)
            .send_bytes(&body)?;

        let payload = unwrap_envelope(read_json(response)?);
        serde_json::from_value(payload).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Ask the assistant a question, optionally with the latest validation
    /// result as context. Returns the reply text.
    pub fn chat(&self, query: &str, context: Option<&Value>) -> Result<String, ApiError> {
        let response = ureq::post(&format!("{}/api/chat", self.base_url))
            .timeout(self.timeout)
            .send_json(serde_json::json!({
                "query": query,
                "context": context,
            }))?;

        let payload = unwrap_envelope(read_json(response)?);
        // Deployed backends have answered under several field names.
        for key in ["reply", "response", "message"] {
            if let Some(reply) = payload.get(key).and_then(Value::as_str) {
                return Ok(reply.to_string());
            }
        }
        Err(ApiError::Parse("chat response carries no reply field".to_string()))
    }

    /// Fetch the answer recommendation for a detected question.
    pub fn recommend(&self, question_text: &str) -> Result<Recommendation, ApiError> {
        let response = ureq::post(&format!("{}/api/recommendations", self.base_url))
            .timeout(self.timeout)
            .send_json(serde_json::json!({ "question_text": question_text }))?;

        let payload = unwrap_envelope(read_json(response)?);
        serde_json::from_value(payload).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Fetch the aggregate emissions summary.
    pub fn emissions(&self) -> Result<EmissionsSummary, ApiError> {
        let response = ureq::get(&format!("{}/api/emissions", self.base_url))
            .timeout(self.timeout)
            .call()?;

        let payload = unwrap_envelope(read_json(response)?);
        serde_json::from_value(payload).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Fetch a page to scan. Plain GET, body returned as text.
    pub fn fetch_page(&self, url: &str) -> Result<String, ApiError> {
        let response = ureq::get(url).timeout(self.timeout).call()?;
        response
            .into_string()
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Check whether the backend is reachable. Short timeout so `health`
    /// never stalls on a dead tunnel.
    pub fn is_healthy(&self) -> bool {
        ureq::get(&format!("{}/api/emissions", self.base_url))
            .timeout(Duration::from_secs(5))
            .call()
            .is_ok()
    }
}

/// Parse a response body as JSON, mapping failure to [`ApiError::Parse`].
fn read_json(response: ureq::Response) -> Result<Value, ApiError> {
    response
        .into_json::<Value>()
        .map_err(|e| ApiError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_is_unwrapped_when_present() {
        let body = serde_json::json!({
            "status": "ok",
            "message": "validated",
            "data": { "verdict": "Pass", "score": 92 }
        });
        let payload = unwrap_envelope(body);
        assert_eq!(payload["verdict"], "Pass");
        assert_eq!(payload["score"], 92);
    }

    #[test]
    fn bare_payload_passes_through() {
        let body = serde_json::json!({ "verdict": "Fail", "score": 45 });
        let payload = unwrap_envelope(body);
        assert_eq!(payload["verdict"], "Fail");
    }

    #[test]
    fn validation_result_parses_minimal_body() {
        let result: ValidationResult =
            serde_json::from_value(serde_json::json!({ "verdict": "Pass", "score": 92 })).unwrap();
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.effective_score(), 92.0);
        assert!(result.explanation.is_none());
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn final_score_takes_precedence_over_score() {
        let result: ValidationResult = serde_json::from_value(serde_json::json!({
            "verdict": "Partial",
            "score": 70,
            "final_score": 67,
            "rule_coverage": 64,
        }))
        .unwrap();
        assert_eq!(result.effective_score(), 67.0);
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:8000/".to_string(),
            ..ApiConfig::default()
        };
        let client = ApiClient::from_config(&config);
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn recommendation_defaults_missing_fields() {
        let rec: Recommendation =
            serde_json::from_value(serde_json::json!({ "confidence": 0.85 })).unwrap();
        assert_eq!(rec.confidence, 0.85);
        assert!(rec.recommended_answer.is_none());
        assert!(rec.clause_references.is_empty());
    }
}
