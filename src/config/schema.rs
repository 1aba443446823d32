//! Configuration schema and defaults.
//!
//! TOML-serializable configuration with sections `[api]`, `[scanner]`,
//! `[dashboard]`, and `[chat]`. Every field has a built-in default; users
//! only set what they want to override.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level attest configuration, mapping to `~/.attest/config.toml` and
/// `.attest.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttestConfig {
    pub api: ApiConfig,
    pub scanner: ScannerConfig,
    pub dashboard: DashboardConfig,
    pub chat: ChatConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote validation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the compliance backend.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [scanner]
// ---------------------------------------------------------------------------

/// Page scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Minimum trimmed text length before a run is considered a question.
    pub min_text_len: usize,
    /// Cap on scraped page text submitted as evidence.
    pub max_scrape_chars: usize,
    /// Poll interval for `scan --watch`, in milliseconds.
    pub watch_interval_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_text_len: 20,
            max_scrape_chars: 10_000,
            watch_interval_ms: 2_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Local dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listen address for `attest dash`.
    pub addr: String,
    /// Open the dashboard in the default browser on startup.
    pub open_browser: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9610".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [chat]
// ---------------------------------------------------------------------------

/// Chat behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Delay before the canned fallback reply when the backend is down, in
    /// milliseconds.
    pub fallback_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_delay_ms: 1_500,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AttestConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.scanner.min_text_len, 20);
        assert_eq!(config.scanner.max_scrape_chars, 10_000);
        assert_eq!(config.dashboard.addr, "127.0.0.1:9610");
        assert!(config.dashboard.open_browser);
        assert_eq!(config.chat.fallback_delay_ms, 1_500);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_src = r#"
            [api]
            base_url = "https://validator.example.com"
        "#;
        let config: AttestConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.api.base_url, "https://validator.example.com");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.scanner.min_text_len, 20);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config: AttestConfig = toml::from_str("").unwrap();
        assert_eq!(config.dashboard.addr, "127.0.0.1:9610");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AttestConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AttestConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.api.base_url, config.api.base_url);
        assert_eq!(back.scanner.watch_interval_ms, config.scanner.watch_interval_ms);
    }
}
