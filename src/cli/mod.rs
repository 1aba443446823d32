//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `attest scan` — detect compliance questions on a page, annotate a report
//! - `attest validate` — submit one control's evidence to the backend
//! - `attest chat` — one-shot assistant chat with canned fallback
//! - `attest results` — stored validation results and aggregates
//! - `attest dash` — launch the embedded dashboard
//! - `attest health` — config, store, and backend checks
//! - `attest config show|init|set|reset` — configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::annotate::{self, Annotator};
use crate::api::{ApiClient, Evidence, ValidateRequest, ValidationResult};
use crate::chat::ChatSession;
use crate::config;
use crate::html::Document;
use crate::report;
use crate::rules::{Band, Verdict};
use crate::scanner::{ScanSession, cache::RecommendationCache, is_compliance_page};
use crate::store::{self, FormState, StoredValidation, ValidationStore};
use crate::web::{self, ServerContext};

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// attest scan
// ---------------------------------------------------------------------------

/// Scan a page (URL or local file) for compliance questions, fetch AI
/// recommendations for each, and write an annotated copy of the page.
pub fn run_scan(
    target: &str,
    out: Option<PathBuf>,
    watch: bool,
    interval_ms: Option<u64>,
) -> Result<()> {
    let cfg = config::load();
    let client = ApiClient::from_config(&cfg.api);
    let out_path = out.unwrap_or_else(|| PathBuf::from("attest-report.html"));
    let interval = Duration::from_millis(interval_ms.unwrap_or(cfg.scanner.watch_interval_ms));

    let mut session = ScanSession::new(cfg.scanner.min_text_len);
    let mut cache = RecommendationCache::new();
    let mut annotator = Annotator::new();

    println!("{}", "attest Page Scan".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Target:".bold(), target);

    let mut pass = 0u32;
    loop {
        pass += 1;
        let doc = load_page(&client, target)?;

        if pass == 1 && !is_compliance_page(&doc) {
            println!(
                "  {}",
                "Note: page text does not look compliance-related; scanning anyway.".dimmed()
            );
        }

        let matches = session.scan(&doc);
        if watch && pass > 1 && !matches.is_empty() {
            println!(
                "  {} {} new question(s) on re-scan",
                "+".green().bold(),
                matches.len()
            );
        }

        for m in &matches {
            // Cache hit: no second network call for a repeated question.
            if let Some(hit) = cache.get(&m.text) {
                annotator.annotate(m.key, annotate::render_recommendation_card(&m.text, hit));
                print_question_line(&m.text, Some(hit.confidence));
                continue;
            }
            match client.recommend(&m.text) {
                Ok(rec) => {
                    annotator.annotate(m.key, annotate::render_recommendation_card(&m.text, &rec));
                    print_question_line(&m.text, Some(rec.confidence));
                    cache.insert(&m.text, rec);
                }
                Err(e) => {
                    annotator.annotate(m.key, annotate::render_error_card(&e));
                    println!("  {} {} — {}", "✗".red().bold(), truncate(&m.text, 56), e);
                }
            }
        }

        let annotated = report::render_annotated_page(&doc, &annotator);
        std::fs::write(&out_path, annotated)
            .with_context(|| format!("writing {}", out_path.display()))?;

        if !watch {
            break;
        }
        std::thread::sleep(interval);
    }

    println!();
    println!(
        "  {} {} question(s) annotated, report written to {}",
        "✓".green().bold(),
        annotator.len(),
        out_path.display().to_string().bold()
    );
    Ok(())
}

/// Fetch a URL or read a local file.
fn load_page(client: &ApiClient, target: &str) -> Result<Document> {
    let source = if target.starts_with("http://") || target.starts_with("https://") {
        client
            .fetch_page(target)
            .map_err(|e| anyhow::anyhow!("fetching {target}: {e}"))?
    } else {
        std::fs::read_to_string(target).with_context(|| format!("reading {target}"))?
    };
    Ok(Document::parse(source))
}

fn print_question_line(question: &str, confidence: Option<f64>) {
    let dot = match confidence.map(Band::from_confidence) {
        Some(Band::High) => "●".green(),
        Some(Band::Medium) => "●".yellow(),
        Some(Band::Low) => "●".red(),
        None => "○".normal(),
    };
    let pct = confidence
        .map(|c| format!("{:>3.0}%", c * 100.0))
        .unwrap_or_else(|| "  —".to_string());
    println!("  {dot} {} {}", pct.dimmed(), truncate(question, 64));
}

// ---------------------------------------------------------------------------
// attest validate
// ---------------------------------------------------------------------------

/// Validate one control's evidence and render the result card. Evidence can
/// be inline text, a file upload, or a whole page's scraped text; omitted
/// flags re-populate from the last submitted form.
pub fn run_validate(
    control_id: Option<String>,
    control_text: Option<String>,
    evidence_text: Option<String>,
    evidence_file: Option<PathBuf>,
    evidence_page: Option<String>,
) -> Result<()> {
    let cfg = config::load();
    let client = ApiClient::from_config(&cfg.api);
    let store = ValidationStore::open();
    let saved = store.form_state().unwrap_or_default();

    let control_id = control_id.or(non_empty(saved.checklist_id.clone()));
    let control_text = control_text.or(non_empty(saved.control_text.clone()));

    let evidence = if let Some(path) = evidence_file {
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "evidence".to_string());
        Evidence::File { name, bytes }
    } else if let Some(target) = evidence_page {
        // Scrape the page's visible text, capped like the overlay did.
        let doc = load_page(&client, &target)?;
        let mut text = doc.visible_text();
        text.truncate(
            text.char_indices()
                .nth(cfg.scanner.max_scrape_chars)
                .map(|(i, _)| i)
                .unwrap_or(text.len()),
        );
        if text.is_empty() {
            bail!("{target} has no visible text to submit as evidence");
        }
        Evidence::Text(text)
    } else {
        let text = evidence_text
            .or(non_empty(saved.evidence_text.clone()))
            .unwrap_or_default();
        if text.is_empty() {
            bail!("no evidence given — pass --evidence-text, --evidence-file, or --evidence-page");
        }
        Evidence::Text(text)
    };

    // Remember the form for the next invocation, like the popup did.
    let form = FormState {
        checklist_id: control_id.clone().unwrap_or_default(),
        control_text: control_text.clone().unwrap_or_default(),
        evidence_text: match &evidence {
            Evidence::Text(t) => t.clone(),
            Evidence::File { .. } => saved.evidence_text,
        },
    };
    if let Err(e) = store.save_form_state(form) {
        eprintln!("{}", format!("warning: could not save form state: {e}").dimmed());
    }

    println!("{}", "attest Evidence Validation".bold().cyan());
    println!("{}", "=".repeat(50));

    let request = ValidateRequest {
        checklist_id: control_id.clone(),
        control_text: control_text.clone(),
        evidence,
    };

    match client.validate(&request) {
        Ok(result) => {
            print_result_card(&result);

            // Best-effort persistence — a dead store never fails the command.
            if let Some(id) = control_id {
                let entry = StoredValidation {
                    checklist_id: id,
                    control_text: control_text.unwrap_or_default(),
                    evidence_text: match &request.evidence {
                        Evidence::Text(t) => Some(t.clone()),
                        Evidence::File { .. } => None,
                    },
                    result,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    source: "cli".to_string(),
                };
                if let Err(e) = store.upsert(entry) {
                    eprintln!(
                        "{}",
                        format!("warning: could not store validation: {e}").dimmed()
                    );
                }
            }
        }
        Err(e) => {
            // Inline error with the status embedded; prior stored results
            // are left untouched.
            println!("  {} Validation failed: {}", "✗".red().bold(), e);
        }
    }

    Ok(())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Render a validation result as a terminal card.
fn print_result_card(result: &ValidationResult) {
    let score = result.effective_score();
    let score_text = format!("{:.0}%", score);
    let colored_score = match Band::from_score(score) {
        Band::High => score_text.green().bold(),
        Band::Medium => score_text.yellow().bold(),
        Band::Low => score_text.red().bold(),
    };

    println!(
        "  {} {} {}",
        "Verdict:".bold(),
        result.verdict.icon(),
        colorize_verdict(result.verdict)
    );
    println!("  {} {}", "Score:  ".bold(), colored_score);
    if let Some(coverage) = result.rule_coverage {
        println!("  {} {:.0}%", "Rule coverage:".bold(), coverage);
    }
    println!();
    println!(
        "  {} {}",
        "Explanation:".bold(),
        result
            .explanation
            .as_deref()
            .unwrap_or("No explanation provided")
    );
    if let Some(rec) = result.recommendation.as_deref().or(result.guidance.as_deref()) {
        println!("  {} {}", "Recommendation:".bold(), rec);
    }
    if !result.matched_keywords.is_empty() {
        println!(
            "  {} {}",
            "Keywords:".bold(),
            result.matched_keywords.join(", ").dimmed()
        );
    }
    if let Some(emissions) = result.emissions {
        println!("  {} {emissions} kg CO₂", "Emissions:".bold());
    }
}

fn colorize_verdict(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Pass => "Pass".green().bold(),
        Verdict::Partial => "Partial".yellow().bold(),
        Verdict::Fail => "Fail".red().bold(),
        Verdict::Unknown => "Unknown".dimmed(),
    }
}

// ---------------------------------------------------------------------------
// attest chat
// ---------------------------------------------------------------------------

/// One-shot chat. With `--context`, the most recent stored validation rides
/// along as conversation context.
pub fn run_chat(message: &str, with_context: bool) -> Result<()> {
    let cfg = config::load();
    let client = ApiClient::from_config(&cfg.api);

    let context = if with_context {
        ValidationStore::open()
            .read_all()
            .last()
            .and_then(|entry| serde_json::to_value(&entry.result).ok())
    } else {
        None
    };

    let mut session = ChatSession::new(
        client,
        Duration::from_millis(cfg.chat.fallback_delay_ms),
    );
    let outcome = session.send(message, context.as_ref());

    println!("{}", "attest Assistant".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("{}", outcome.reply);
    if outcome.fallback {
        println!();
        println!(
            "  {}",
            "(backend unreachable — canned reply based on your question)".dimmed()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// attest results
// ---------------------------------------------------------------------------

/// Show stored validation results and aggregates.
pub fn run_results(format: OutputFormat) -> Result<()> {
    let store = ValidationStore::open();
    let entries = store.read_all();

    if entries.is_empty() {
        println!(
            "{}",
            "No validations stored yet. Run `attest validate` to add one.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_results_json(&entries)?,
        OutputFormat::Csv => print_results_csv(&entries),
        OutputFormat::Table => print_results_table(&entries),
    }
    Ok(())
}

fn print_results_table(entries: &[StoredValidation]) {
    println!("{}", "attest Validation Results".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    let avg = store::average_score(entries);
    let (pass, partial, fail) = store::verdict_distribution(entries);
    println!("  {} {:.0}%", "Average score:".bold(), avg);
    println!(
        "  {} {} pass / {} partial / {} fail",
        "Verdicts:     ".bold(),
        pass,
        partial,
        fail
    );
    let emissions = store::emissions_summary(entries);
    println!(
        "  {} {:.4} kg CO₂ over {} run(s)",
        "Emissions:    ".bold(),
        emissions.total_emissions,
        emissions.history.len()
    );
    println!();

    println!(
        "  {:<12} {:<10} {:>6}  {:<34} Validated",
        "Control", "Verdict", "Score", "Text"
    );
    println!("  {}", "-".repeat(78));
    for (i, entry) in entries.iter().enumerate() {
        let line = format!(
            "  {:<12} {:<10} {:>5.0}%  {:<34} {}",
            truncate(&entry.checklist_id, 12),
            entry.result.verdict.as_str(),
            entry.result.effective_score(),
            truncate(&entry.control_text, 34),
            entry.timestamp.get(..10).unwrap_or(""),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_results_json(entries: &[StoredValidation]) -> Result<()> {
    let value = serde_json::json!({
        "average_score": store::average_score(entries),
        "controls": entries,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_results_csv(entries: &[StoredValidation]) {
    println!("checklist_id,verdict,score,control_text,timestamp");
    for entry in entries {
        println!(
            "{},{},{:.0},{},{}",
            entry.checklist_id,
            entry.result.verdict,
            entry.result.effective_score(),
            entry.control_text.replace(',', ";"),
            entry.timestamp,
        );
    }
}

// ---------------------------------------------------------------------------
// attest dash
// ---------------------------------------------------------------------------

/// Launch the embedded dashboard server (blocks until interrupted).
pub fn run_dash(addr: Option<String>, no_open: bool) -> Result<()> {
    let cfg = config::load();
    let addr = addr.unwrap_or(cfg.dashboard.addr.clone());
    let open = cfg.dashboard.open_browser && !no_open;

    let ctx = ServerContext {
        client: ApiClient::from_config(&cfg.api),
        store: ValidationStore::open(),
    };
    web::serve(&addr, open, ctx)
}

// ---------------------------------------------------------------------------
// attest health
// ---------------------------------------------------------------------------

/// Check config, store, and backend reachability.
pub fn run_health() -> Result<()> {
    println!("{}", "attest Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.attest/config.toml found"
        } else {
            "not found (run `attest config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".attest.toml found"
        } else {
            "none (optional)"
        },
    );

    let cfg = config::load();
    let client = ApiClient::from_config(&cfg.api);
    let backend_ok = client.is_healthy();
    print_health_item(
        "Backend",
        backend_ok,
        &if backend_ok {
            format!("reachable at {}", client.base_url())
        } else {
            format!("not reachable at {}", client.base_url())
        },
    );

    let store = ValidationStore::open();
    let count = store.read_all().len();
    print_health_item(
        "Validation store",
        store.exists(),
        &if store.exists() {
            format!("{count} control(s) stored")
        } else {
            "no store file yet (dashboard serves demo data)".to_string()
        },
    );

    print_health_item(
        "Dashboard",
        true,
        &format!("configured for {}", cfg.dashboard.addr),
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// attest config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective attest Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.attest/config.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), "~/.attest/config.toml (not found)".dimmed());
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".attest.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".attest.toml (not found)".dimmed());
    }
    println!("  {} {}", "·".dimmed(), "ATTEST_* environment variables".dimmed());
    Ok(())
}

/// Initialize a default config file at `~/.attest/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to customize attest behavior.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("x")), OutputFormat::Table);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("x".to_string()).as_deref(), Some("x"));
    }
}
