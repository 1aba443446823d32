//! JSON API handlers for the dashboard.
//!
//! Each handler returns a `Response<Cursor<Vec<u8>>>` with JSON content.
//! The results and emissions handlers apply the demo fallback **as a unit**:
//! both consult the same store emptiness check, so the dashboard never mixes
//! demo controls with live emissions or vice versa.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Response, StatusCode};

use crate::api::{Evidence, ValidateRequest, ValidationResult};
use crate::rules;
use crate::store::{self, StoredValidation, demo};

use super::{ServerContext, content_type_json};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// One row of the dashboard results table.
#[derive(Debug, Serialize)]
pub struct ControlRow {
    pub control: String,
    pub verdict: String,
    pub score: f64,
    pub explanation: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissions: Option<f64>,
}

impl ControlRow {
    pub fn from_stored(entry: &StoredValidation) -> Self {
        Self {
            control: entry.control_text.clone(),
            verdict: entry.result.verdict.to_string(),
            score: entry.result.effective_score(),
            explanation: entry
                .result
                .explanation
                .clone()
                .unwrap_or_else(|| "No explanation provided".to_string()),
            recommendation: entry
                .result
                .recommendation
                .clone()
                .or_else(|| entry.result.guidance.clone())
                .unwrap_or_default(),
            emissions: entry.result.emissions,
        }
    }
}

/// Results API response.
#[derive(Serialize)]
struct ResultsResponse {
    controls: Vec<ControlRow>,
    average_score: f64,
    /// True when the built-in demo dataset was served.
    demo: bool,
}

/// Store request — a validation result pushed from the panel.
#[derive(Deserialize)]
struct StoreRequest {
    checklist_id: String,
    #[serde(default)]
    control_text: String,
    #[serde(default)]
    evidence_text: Option<String>,
    result: ValidationResult,
    #[serde(default)]
    source: Option<String>,
}

/// Validate proxy request from the panel's validate tab.
#[derive(Deserialize)]
struct ValidateProxyRequest {
    #[serde(default)]
    checklist_id: Option<String>,
    #[serde(default)]
    control_text: Option<String>,
    evidence_text: String,
}

/// Chat proxy request.
#[derive(Deserialize)]
struct ChatProxyRequest {
    query: String,
    #[serde(default)]
    context: Option<serde_json::Value>,
}

/// Recommendation proxy request.
#[derive(Deserialize)]
struct RecommendProxyRequest {
    question_text: String,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    backend_url: String,
    backend_reachable: bool,
    store_exists: bool,
    stored_controls: usize,
    config_exists: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Stored entries, or `None` when the demo dataset should be served. One
/// decision point so controls and emissions fall back together.
fn live_entries(ctx: &ServerContext) -> Option<Vec<StoredValidation>> {
    let entries = ctx.store.read_all();
    if entries.is_empty() { None } else { Some(entries) }
}

// ---------------------------------------------------------------------------
// API handlers — stored data
// ---------------------------------------------------------------------------

/// `GET /api/results` — the controls table.
pub fn get_results(ctx: &ServerContext) -> Result<Response<Cursor<Vec<u8>>>> {
    let (entries, is_demo) = match live_entries(ctx) {
        Some(entries) => (entries, false),
        None => (demo::demo_controls(), true),
    };

    let resp = ResultsResponse {
        average_score: store::average_score(&entries),
        controls: entries.iter().map(ControlRow::from_stored).collect(),
        demo: is_demo,
    };
    json_response(&resp)
}

/// `GET /api/emissions` — summary + history for the line chart.
pub fn get_emissions(ctx: &ServerContext) -> Result<Response<Cursor<Vec<u8>>>> {
    let summary = match live_entries(ctx) {
        Some(entries) => store::emissions_summary(&entries),
        None => demo::demo_emissions(),
    };
    json_response(&summary)
}

/// `POST /api/validation/store` — persist a validation result.
///
/// Best-effort by contract: a store failure is reported in the response but
/// the panel treats it as non-fatal.
pub fn post_store(ctx: &ServerContext, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: StoreRequest =
        serde_json::from_str(body).context("invalid JSON in store request")?;

    let entry = StoredValidation {
        checklist_id: req.checklist_id,
        control_text: req.control_text,
        evidence_text: req.evidence_text,
        result: req.result,
        timestamp: chrono::Utc::now().to_rfc3339(),
        source: req.source.unwrap_or_else(|| "dashboard".to_string()),
    };
    ctx.store
        .upsert(entry)
        .context("failed to persist validation")?;

    json_response(&serde_json::json!({ "success": true }))
}

// ---------------------------------------------------------------------------
// API handlers — remote proxies
// ---------------------------------------------------------------------------

/// `POST /api/validate` — proxy the panel's validate request to the backend.
///
/// On success the result is also persisted best-effort (failures logged,
/// never surfaced). On backend failure the error text — including the
/// upstream status code — reaches the panel for its inline error card.
pub fn post_validate(ctx: &ServerContext, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ValidateProxyRequest =
        serde_json::from_str(body).context("invalid JSON in validate request")?;

    let result = ctx
        .client
        .validate(&ValidateRequest {
            checklist_id: req.checklist_id.clone(),
            control_text: req.control_text.clone(),
            evidence: Evidence::Text(req.evidence_text.clone()),
        })
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(id) = req.checklist_id {
        let entry = StoredValidation {
            checklist_id: id,
            control_text: req.control_text.unwrap_or_default(),
            evidence_text: Some(req.evidence_text),
            result: result.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: "panel".to_string(),
        };
        if let Err(e) = ctx.store.upsert(entry) {
            eprintln!("warning: could not store validation: {e}");
        }
    }

    json_response(&result)
}

/// `POST /api/chat` — proxy to the backend, falling back to the shared
/// canned-reply table when it is unreachable. The panel applies the fallback
/// delay before rendering (a sequential server must not sleep per-request).
pub fn post_chat(ctx: &ServerContext, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ChatProxyRequest =
        serde_json::from_str(body).context("invalid JSON in chat request")?;

    let (reply, fallback) = match ctx.client.chat(&req.query, req.context.as_ref()) {
        Ok(reply) => (reply, false),
        Err(_) => (rules::canned_reply(&req.query).to_string(), true),
    };

    json_response(&serde_json::json!({ "reply": reply, "fallback": fallback }))
}

/// `POST /api/recommendations` — proxy for question recommendations.
pub fn post_recommend(ctx: &ServerContext, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: RecommendProxyRequest =
        serde_json::from_str(body).context("invalid JSON in recommendation request")?;

    let rec = ctx
        .client
        .recommend(&req.question_text)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    json_response(&rec)
}

// ---------------------------------------------------------------------------
// API handlers — misc
// ---------------------------------------------------------------------------

/// `GET /api/health` — backend/store/config status for the header badges.
pub fn get_health(ctx: &ServerContext) -> Result<Response<Cursor<Vec<u8>>>> {
    let config_exists = crate::config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        backend_url: ctx.client.base_url().to_string(),
        backend_reachable: ctx.client.is_healthy(),
        store_exists: ctx.store.exists(),
        stored_controls: ctx.store.read_all().len(),
        config_exists,
    };
    json_response(&resp)
}

/// `GET /report/download` — the generated results report as an attachment.
pub fn get_report(ctx: &ServerContext) -> Result<Response<Cursor<Vec<u8>>>> {
    let (entries, summary) = match live_entries(ctx) {
        Some(entries) => {
            let summary = store::emissions_summary(&entries);
            (entries, summary)
        }
        None => (demo::demo_controls(), demo::demo_emissions()),
    };

    let html = crate::report::results_report(&entries, &summary);
    let filename = format!(
        "compliance-report-{}.html",
        chrono::Utc::now().format("%Y-%m-%d")
    );
    let disposition = Header::from_bytes(
        "Content-Disposition",
        format!("attachment; filename=\"{filename}\""),
    )
    .map_err(|_| anyhow::anyhow!("invalid header"))?;

    Ok(Response::from_data(html.into_bytes())
        .with_header(super::content_type_html())
        .with_header(disposition)
        .with_status_code(StatusCode(200)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
