//! Configuration system.
//!
//! Layered hierarchy, later layers override earlier ones at the field level:
//!
//! 1. **Built-in defaults** — [`schema::AttestConfig::default()`]
//! 2. **User global config** — `~/.attest/config.toml`
//! 3. **Project local config** — `.attest.toml` in the working directory
//! 4. **Environment variables** — `ATTEST_*` (highest precedence)
//!
//! Malformed files are silently ignored rather than failing the command —
//! a broken config must never take the tool down with it.

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

pub use schema::AttestConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration. Primary entry point for every
/// command.
pub fn load() -> AttestConfig {
    let mut config = AttestConfig::default();

    // Layer 2: user global config (~/.attest/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    // Layer 3: project local config (.attest.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file if it exists and parses. Each file deserializes
/// with `serde(default)`, so only explicitly-set keys differ from defaults.
fn load_toml_file(path: Option<PathBuf>) -> Option<AttestConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".attest").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".attest.toml"))
}

/// Path to the global config file, for display and health checks.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file, for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply `ATTEST_*` overrides (highest precedence layer).
///
/// - `ATTEST_API_URL` — backend base URL
/// - `ATTEST_API_TIMEOUT_MS` — request timeout
/// - `ATTEST_MIN_TEXT_LEN` — scanner minimum question length
/// - `ATTEST_DASH_ADDR` — dashboard listen address
/// - `ATTEST_NO_OPEN` — suppress browser auto-open (`1`/`true`)
fn apply_env_overrides(config: &mut AttestConfig) {
    if let Ok(val) = std::env::var("ATTEST_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("ATTEST_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("ATTEST_MIN_TEXT_LEN")
        && let Ok(len) = val.parse::<usize>()
    {
        config.scanner.min_text_len = len;
    }
    if let Ok(val) = std::env::var("ATTEST_DASH_ADDR")
        && !val.is_empty()
    {
        config.dashboard.addr = val;
    }
    if let Ok(val) = std::env::var("ATTEST_NO_OPEN") {
        config.dashboard.open_browser = !is_truthy(&val);
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

// ---------------------------------------------------------------------------
// Config management (show / init / set / reset)
// ---------------------------------------------------------------------------

/// Render the effective merged configuration as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("serializing effective config")
}

/// Write a default config file to `~/.attest/config.toml`. Refuses to
/// overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("cannot resolve home directory")?;
    if path.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml_text = toml::to_string_pretty(&AttestConfig::default())?;
    fs::write(&path, toml_text)?;
    Ok(path)
}

/// Set a single `section.key` value in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("cannot resolve home directory")?;
    let mut config = load_toml_file(Some(path.clone())).unwrap_or_default();

    apply_config_value(&mut config, key, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml_text = toml::to_string_pretty(&config)?;
    fs::write(&path, toml_text)?;
    Ok(())
}

fn apply_config_value(config: &mut AttestConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "api.base_url" => config.api.base_url = value.to_string(),
        "api.timeout_ms" => config.api.timeout_ms = parse_num(key, value)?,
        "scanner.min_text_len" => config.scanner.min_text_len = parse_num(key, value)?,
        "scanner.max_scrape_chars" => config.scanner.max_scrape_chars = parse_num(key, value)?,
        "scanner.watch_interval_ms" => config.scanner.watch_interval_ms = parse_num(key, value)?,
        "dashboard.addr" => config.dashboard.addr = value.to_string(),
        "dashboard.open_browser" => config.dashboard.open_browser = parse_bool(key, value)?,
        "chat.fallback_delay_ms" => config.chat.fallback_delay_ms = parse_num(key, value)?,
        _ => bail!("unknown config key: {key}"),
    }
    Ok(())
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{key} expects a number, got {value:?}"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} expects a boolean, got {value:?}"),
    }
}

/// Reset the global config to built-in defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
