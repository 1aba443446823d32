//! Local validation store.
//!
//! One JSON file under `~/.attest/` holding a mapping from control id to the
//! last validation result (last-write-wins, no versioning) plus the last
//! submitted form fields for re-population. All writes are best-effort:
//! callers log failures and move on — a broken store must never fail a
//! validation that already succeeded remotely.

pub mod demo;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{EmissionEntry, EmissionsSummary, ValidationResult};
use crate::rules::Verdict;

/// Fixed energy-efficiency figure reported alongside emissions, relative to
/// running validation on a conventional large model.
pub const ENERGY_SAVED_PCT: f64 = 18.0;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A persisted validation outcome for one control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredValidation {
    pub checklist_id: String,
    pub control_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_text: Option<String>,
    pub result: ValidationResult,
    /// RFC 3339 time of the validation.
    pub timestamp: String,
    /// Where the validation came from: `cli`, `panel`, or `dashboard`.
    #[serde(default)]
    pub source: String,
}

/// Last-used form fields, re-populated into `attest validate` when flags are
/// omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormState {
    #[serde(default)]
    pub checklist_id: String,
    #[serde(default)]
    pub control_text: String,
    #[serde(default)]
    pub evidence_text: String,
}

/// On-disk shape of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// Control id → last validation. `BTreeMap` keeps the file diffable.
    #[serde(default)]
    validations: BTreeMap<String, StoredValidation>,
    #[serde(default)]
    form: Option<FormState>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Handle on the store file.
#[derive(Debug, Clone)]
pub struct ValidationStore {
    path: PathBuf,
}

impl ValidationStore {
    /// Store at the default location (`~/.attest/store.json`).
    pub fn open() -> Self {
        Self {
            path: default_store_path().unwrap_or_else(|| PathBuf::from(".attest-store.json")),
        }
    }

    /// Store at an explicit path (tests, alternate data dirs).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All stored validations, oldest first. An unreadable or malformed file
    /// reads as empty — the dashboard falls back to demo data instead.
    pub fn read_all(&self) -> Vec<StoredValidation> {
        let mut entries: Vec<StoredValidation> =
            self.read_file().validations.into_values().collect();
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        entries
    }

    /// Insert or replace the entry for its control id.
    pub fn upsert(&self, entry: StoredValidation) -> Result<()> {
        let mut file = self.read_file();
        file.validations.insert(entry.checklist_id.clone(), entry);
        self.write_file(&file)
    }

    /// Last-used form fields, if any were saved.
    pub fn form_state(&self) -> Option<FormState> {
        self.read_file().form
    }

    /// Persist the form fields for the next run.
    pub fn save_form_state(&self, form: FormState) -> Result<()> {
        let mut file = self.read_file();
        file.form = Some(form);
        self.write_file(&file)
    }

    fn read_file(&self) -> StoreFile {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_file(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

/// Default store file path.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".attest").join("store.json"))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Arithmetic mean of effective scores; `0` for an empty list, never NaN.
pub fn average_score(controls: &[StoredValidation]) -> f64 {
    if controls.is_empty() {
        return 0.0;
    }
    let sum: f64 = controls.iter().map(|c| c.result.effective_score()).sum();
    sum / controls.len() as f64
}

/// Counts of (pass, partial, fail) verdicts.
pub fn verdict_distribution(controls: &[StoredValidation]) -> (usize, usize, usize) {
    let count = |v: Verdict| controls.iter().filter(|c| c.result.verdict == v).count();
    (
        count(Verdict::Pass),
        count(Verdict::Partial),
        count(Verdict::Fail),
    )
}

/// Emissions summary derived from stored validations, oldest first.
pub fn emissions_summary(controls: &[StoredValidation]) -> EmissionsSummary {
    let history: Vec<EmissionEntry> = controls
        .iter()
        .filter_map(|c| {
            c.result.emissions.map(|emissions| EmissionEntry {
                timestamp: c.timestamp.clone(),
                emissions,
            })
        })
        .collect();

    let total: f64 = history.iter().map(|e| e.emissions).sum();
    let avg = if history.is_empty() {
        0.0
    } else {
        total / history.len() as f64
    };

    EmissionsSummary {
        total_emissions: total,
        energy_saved: ENERGY_SAVED_PCT,
        avg_per_run: avg,
        history,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
