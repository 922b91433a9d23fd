//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default so the service runs without a config file;
//! the file only needs to name what it overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Primary quote API base URL.
    pub primary_base: String,
    /// Fallback base tried when the primary errors, times out,
    /// or returns a non-success status.
    pub fallback_base: String,
    /// Per-attempt request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            primary_base: "https://query1.finance.yahoo.com".to_string(),
            fallback_base: "https://query2.finance.yahoo.com".to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Peak concurrent per-symbol fetches (one batch).
    pub batch_size: usize,
    /// Candidate pool cap after dedupe and filtering.
    pub max_pool_size: usize,
    /// Scan report cache TTL in seconds.
    pub scan_ttl_secs: u64,
    /// Quote/summary/index/trending cache TTL in seconds.
    pub quote_ttl_secs: u64,
    /// History cache TTL in seconds.
    pub history_ttl_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 15,
            max_pool_size: 150,
            scan_ttl_secs: 60,
            quote_ttl_secs: 30,
            history_ttl_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    /// A present-but-malformed file is still an error.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
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
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.provider.timeout_ms, 5_000);
        assert_eq!(cfg.scan.batch_size, 15);
        assert_eq!(cfg.scan.max_pool_size, 150);
        assert_eq!(cfg.scan.scan_ttl_secs, 60);
        assert_eq!(cfg.scan.quote_ttl_secs, 30);
        assert_eq!(cfg.scan.history_ttl_secs, 60);
        assert!(cfg.provider.primary_base.starts_with("https://"));
        assert_ne!(cfg.provider.primary_base, cfg.provider.fallback_base);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [scan]
            batch_size = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.scan.batch_size, 5);
        // Untouched sections keep defaults
        assert_eq!(cfg.scan.max_pool_size, 150);
        assert_eq!(cfg.provider.timeout_ms, 5_000);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let cfg = AppConfig::load_or_default("definitely-not-here.toml").unwrap();
        assert_eq!(cfg.server.port, 8080);
    }
}
