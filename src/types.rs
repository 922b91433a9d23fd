//! Shared types for the SURGE scanner.
//!
//! These types form the data model used across all modules.
//! Provider, engine, and server modules depend on them without
//! circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Price history
// ---------------------------------------------------------------------------

/// A single daily (or intraday) bar: close price plus traded volume.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
}

/// Ordered price/volume history, non-decreasing in timestamp.
/// Built once per fetch and never mutated afterwards.
pub type PriceSeries = Vec<Candle>;

/// Quote metadata attached to a chart response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    pub short_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub currency: Option<String>,
}

impl ChartMeta {
    /// Display name, falling back to the raw symbol.
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.symbol)
    }

    /// Last traded price, 0.0 when the provider omitted it.
    pub fn price(&self) -> f64 {
        self.regular_market_price.unwrap_or(0.0)
    }

    /// Previous session close, falling back to the live price.
    pub fn previous_close(&self) -> f64 {
        self.chart_previous_close
            .or(self.regular_market_price)
            .unwrap_or(0.0)
    }

    /// Quote currency, defaulting to USD.
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or("USD")
    }
}

/// A chart response for one symbol: quote metadata plus price history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub meta: ChartMeta,
    pub series: PriceSeries,
}

// ---------------------------------------------------------------------------
// Scan mode
// ---------------------------------------------------------------------------

/// Risk appetite for a scan. Controls the minimum score a symbol
/// must reach to appear in the shortlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Conservative,
    Balanced,
    Aggressive,
    Ultra,
}

impl ScanMode {
    /// Parse a mode string. Unrecognized values fall back to `Balanced`.
    pub fn parse(s: &str) -> Self {
        match s {
            "conservative" => ScanMode::Conservative,
            "balanced" => ScanMode::Balanced,
            "aggressive" => ScanMode::Aggressive,
            "ultra" => ScanMode::Ultra,
            _ => ScanMode::Balanced,
        }
    }

    /// Minimum accumulated score for a symbol to make the shortlist.
    pub fn min_score(&self) -> u32 {
        match self {
            ScanMode::Conservative => 55,
            ScanMode::Balanced => 45,
            ScanMode::Aggressive => 35,
            ScanMode::Ultra => 25,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanMode::Conservative => "conservative",
            ScanMode::Balanced => "balanced",
            ScanMode::Aggressive => "aggressive",
            ScanMode::Ultra => "ultra",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Scan results
// ---------------------------------------------------------------------------

/// A low/high price band derived from the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub low: f64,
    pub high: f64,
}

/// Scored candidate produced by the analyzer.
///
/// Immutable once constructed. `reasons` is ordered by heuristic
/// evaluation order and is rendered verbatim by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub score: u32,
    pub reasons: Vec<String>,
    pub buy_zone: Zone,
    pub target_zone: Zone,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ ${:.2} (score {}, {} signals)",
            self.symbol,
            self.price,
            self.score,
            self.reasons.len(),
        )
    }
}

/// Final output of one scan invocation, ranked by score descending.
///
/// Invariant: `count == results.len() <= total_scanned`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Echo of the requested mode string.
    pub mode: String,
    pub total_scanned: usize,
    pub count: usize,
    pub results: Vec<ScoreResult>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SURGE.
#[derive(Debug, thiserror::Error)]
pub enum SurgeError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Both primary and fallback endpoints failed: {0}")]
    BothEndpointsFailed(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
