//! Market data provider layer.
//!
//! `client` implements the dual-endpoint resilient fetch; `yahoo` wraps
//! the provider's chart and list endpoints on top of it. The `MarketData`
//! trait is the seam the engine and HTTP handlers depend on, so tests can
//! substitute a mock for the live provider.

pub mod client;
pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Chart;

/// Abstraction over the upstream market data provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch price/volume history plus quote metadata for one symbol.
    ///
    /// Returns `Ok(None)` when the provider has no result for the symbol
    /// (unknown ticker) — that is data absence, not a failure.
    async fn chart(&self, symbol: &str, range: &str, interval: &str) -> Result<Option<Chart>>;

    /// Symbols from the "most actives" screener list.
    async fn most_active_symbols(&self) -> Result<Vec<String>>;

    /// Symbols currently trending in the US market.
    async fn trending_symbols(&self) -> Result<Vec<String>>;
}
