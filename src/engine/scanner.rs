//! Scan orchestrator.
//!
//! Builds the candidate symbol pool from the provider's "most actives"
//! and "trending" lists, filters it down to plain equities, scores the
//! pool in fixed-size concurrent batches, and returns a ranked report.
//! The whole flow is gated by the TTL cache: a fresh report is replayed
//! with zero upstream traffic.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cache::{fingerprint, TtlCache};
use crate::config::ScanConfig;
use crate::engine::analyzer;
use crate::provider::MarketData;
use crate::types::{ScanMode, ScanReport};

/// Cache path component for scan fingerprints. Matches the route the
/// handlers serve so both converge on the same entry.
const SCAN_CACHE_PATH: &str = "/api/scan";

// ---------------------------------------------------------------------------
// Pool construction
// ---------------------------------------------------------------------------

/// Merge, dedupe, and filter the raw symbol lists into the candidate pool.
///
/// Symbols containing `-` (crypto pairs), containing `=` (FX pairs), or
/// ending in `X` (funds/indices) are excluded. First-seen order is kept
/// so a fixed input yields a deterministic pool; the pool is capped at
/// `max_pool_size`.
fn build_candidate_pool(
    most_active: Vec<String>,
    trending: Vec<String>,
    max_pool_size: usize,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pool = Vec::new();

    for symbol in most_active.into_iter().chain(trending) {
        if pool.len() >= max_pool_size {
            break;
        }
        if symbol.is_empty() {
            continue;
        }
        if symbol.contains('-') || symbol.contains('=') || symbol.ends_with('X') {
            continue;
        }
        if seen.insert(symbol.clone()) {
            pool.push(symbol);
        }
    }

    pool
}

// ---------------------------------------------------------------------------
// Scan engine
// ---------------------------------------------------------------------------

/// Orchestrates a full market scan: pool → batches → ranking → cache.
pub struct ScanEngine {
    provider: Arc<dyn MarketData>,
    cache: Arc<TtlCache>,
    batch_size: usize,
    max_pool_size: usize,
    scan_ttl: Duration,
}

impl ScanEngine {
    pub fn new(provider: Arc<dyn MarketData>, cache: Arc<TtlCache>, cfg: &ScanConfig) -> Self {
        Self {
            provider,
            cache,
            batch_size: cfg.batch_size.max(1),
            max_pool_size: cfg.max_pool_size,
            scan_ttl: Duration::from_secs(cfg.scan_ttl_secs),
        }
    }

    /// Run a scan for the given mode string (echoed in the report).
    ///
    /// A cached report within its TTL is replayed without any network
    /// activity. Per-symbol failures are absorbed by the analyzer;
    /// pool-building failures fail the whole scan.
    pub async fn scan(&self, mode_raw: &str) -> Result<ScanReport> {
        let key = fingerprint(
            SCAN_CACHE_PATH,
            &[("mode".to_string(), mode_raw.to_string())],
        );

        if let Some(cached) = self.cache.get(&key) {
            if let Ok(report) = serde_json::from_value::<ScanReport>(cached) {
                debug!(mode = mode_raw, "Scan served from cache");
                return Ok(report);
            }
        }

        let mode = ScanMode::parse(mode_raw);
        let min_score = mode.min_score();

        info!(mode = %mode, min_score, "Starting market scan");

        let pool = self.build_pool().await?;
        let total_scanned = pool.len();

        info!(pool_size = total_scanned, "Candidate pool built");

        let mut results = Vec::new();

        // Batches run sequentially; symbols within a batch concurrently.
        // Peak outbound requests are therefore bounded by the batch size,
        // and each batch fully resolves before the next starts.
        for batch in pool.chunks(self.batch_size) {
            let analyses = batch
                .iter()
                .map(|symbol| analyzer::analyze(self.provider.as_ref(), symbol, min_score));
            let batch_results = join_all(analyses).await;

            let hits_before = results.len();
            results.extend(batch_results.into_iter().flatten());
            debug!(
                batch_len = batch.len(),
                hits = results.len() - hits_before,
                "Batch complete"
            );
        }

        // Stable sort: equal scores keep discovery order.
        results.sort_by(|a, b| b.score.cmp(&a.score));

        let report = ScanReport {
            mode: mode_raw.to_string(),
            total_scanned,
            count: results.len(),
            results,
        };

        info!(
            mode = %mode,
            scanned = report.total_scanned,
            matched = report.count,
            "Scan complete"
        );

        let payload = serde_json::to_value(&report).context("Failed to serialize scan report")?;
        self.cache.set(&key, payload, self.scan_ttl);

        Ok(report)
    }

    /// Fetch both list endpoints concurrently and merge them into the
    /// candidate pool. Either list failing fails the scan.
    async fn build_pool(&self) -> Result<Vec<String>> {
        let (most_active, trending) = tokio::join!(
            self.provider.most_active_symbols(),
            self.provider.trending_symbols(),
        );

        let most_active = most_active.context("Most-actives pool fetch failed")?;
        let trending = trending.context("Trending pool fetch failed")?;

        Ok(build_candidate_pool(
            most_active,
            trending,
            self.max_pool_size,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
