//! Yahoo Finance endpoint wrappers.
//!
//! Two upstream endpoint families, both routed through the resilient
//! fallback client:
//! - chart/history: `/v8/finance/chart/{symbol}` parameterized by range
//!   and interval
//! - symbol lists: the `most_actives` predefined screener and the
//!   US trending list
//!
//! Only the JSON fields we consume are deserialized.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use super::client::FallbackClient;
use super::MarketData;
use crate::types::{Candle, Chart, ChartMeta};

// ---------------------------------------------------------------------------
// Range → interval mapping
// ---------------------------------------------------------------------------

/// Chart sampling interval for a requested range. Fixed table; anything
/// unrecognized gets daily bars.
pub fn interval_for_range(range: &str) -> &'static str {
    match range {
        "1d" => "5m",
        "5d" => "30m",
        "1w" => "1h",
        _ => "1d",
    }
}

// ---------------------------------------------------------------------------
// API response types (Yahoo JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResultNode>>,
}

#[derive(Debug, Deserialize)]
struct ChartResultNode {
    meta: MetaNode,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: IndicatorsNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaNode {
    symbol: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct IndicatorsNode {
    #[serde(default)]
    quote: Vec<QuoteNode>,
}

/// Close/volume arrays are position-aligned with `timestamp` and may
/// contain nulls for halted or partial sessions.
#[derive(Debug, Deserialize, Default)]
struct QuoteNode {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    finance: FinanceNode,
}

#[derive(Debug, Deserialize)]
struct FinanceNode {
    #[serde(default)]
    result: Option<Vec<ListResultNode>>,
}

#[derive(Debug, Deserialize)]
struct ListResultNode {
    #[serde(default)]
    quotes: Vec<ListQuoteNode>,
}

#[derive(Debug, Deserialize)]
struct ListQuoteNode {
    #[serde(default)]
    symbol: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Live Yahoo Finance provider backed by the fallback client.
pub struct YahooProvider {
    client: FallbackClient,
}

impl YahooProvider {
    pub fn new(client: FallbackClient) -> Self {
        Self { client }
    }

    fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).single().unwrap_or_else(Utc::now)
    }

    /// Flatten a chart result node into the crate's `Chart` type.
    ///
    /// Bars with a null close are dropped (halted sessions); a null
    /// volume on a kept bar becomes 0.
    fn to_chart(node: ChartResultNode) -> Chart {
        let timestamps = node.timestamp.unwrap_or_default();
        let quote = node.indicators.quote.into_iter().next().unwrap_or_default();

        let mut series = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(Some(close)) = quote.close.get(i).copied() else {
                continue;
            };
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0);
            series.push(Candle {
                timestamp: Self::ts_to_datetime(*ts),
                close,
                volume,
            });
        }

        Chart {
            meta: ChartMeta {
                symbol: node.meta.symbol,
                short_name: node.meta.short_name,
                regular_market_price: node.meta.regular_market_price,
                chart_previous_close: node.meta.chart_previous_close,
                currency: node.meta.currency,
            },
            series,
        }
    }

    /// Extract the symbol list from a screener/trending envelope.
    fn to_symbols(envelope: ListEnvelope) -> Vec<String> {
        envelope
            .finance
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|r| r.quotes)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|q| q.symbol)
            .filter(|s| !s.is_empty())
            .collect()
    }

    async fn fetch_symbols(&self, path: &str) -> Result<Vec<String>> {
        let resp = self.client.get(path).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Symbol list request failed: {status}");
        }

        let envelope: ListEnvelope = resp
            .json()
            .await
            .context("Failed to parse symbol list response")?;

        Ok(Self::to_symbols(envelope))
    }
}

#[async_trait]
impl MarketData for YahooProvider {
    async fn chart(&self, symbol: &str, range: &str, interval: &str) -> Result<Option<Chart>> {
        let path = format!(
            "/v8/finance/chart/{}?range={range}&interval={interval}&includePrePost=true",
            urlencoding::encode(symbol),
        );

        debug!(symbol, range, interval, "Fetching chart");

        let resp = self.client.get(&path).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Chart request for {symbol} failed: {status}");
        }

        let envelope: ChartEnvelope = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse chart response for {symbol}"))?;

        let node = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) });

        Ok(node.map(Self::to_chart))
    }

    async fn most_active_symbols(&self) -> Result<Vec<String>> {
        self.fetch_symbols("/v1/finance/screener/predefined/saved?scrIds=most_actives")
            .await
    }

    async fn trending_symbols(&self) -> Result<Vec<String>> {
        self.fetch_symbols("/v1/finance/trending/US").await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
