//! API route handlers.
//!
//! All endpoints return JSON. Failures are normalized: a missing required
//! parameter is a 400 with an error payload, provider data absence is a
//! 200 with an error-shaped (or empty) payload so the UI stays resilient,
//! and anything else is a generic 500. Raw error detail goes to tracing
//! only.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::cache::{fingerprint, TtlCache};
use crate::engine::scanner::ScanEngine;
use crate::provider::yahoo::interval_for_range;
use crate::provider::MarketData;
use crate::types::Chart;

/// Chart range used for spot quotes (summary/index/trending).
const QUOTE_RANGE: &str = "5d";
const QUOTE_INTERVAL: &str = "1d";

/// Trending list length and price floor.
const TRENDING_LIMIT: usize = 10;
const TRENDING_MIN_PRICE: f64 = 3.5;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by all route handlers.
pub struct ApiState {
    pub provider: Arc<dyn MarketData>,
    pub cache: Arc<TtlCache>,
    pub engine: ScanEngine,
    pub quote_ttl: Duration,
    pub history_ttl: Duration,
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub symbol: String,
    pub short_name: String,
    pub regular_market_price: f64,
    pub previous_close: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn missing_param(name: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("Missing {name}") })),
    )
        .into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Server error" })),
    )
        .into_response()
}

/// Store `payload` under `key` and return it as a 200 response.
fn cache_and_respond(cache: &TtlCache, key: &str, payload: Value, ttl: Duration) -> Response {
    cache.set(key, payload.clone(), ttl);
    Json(payload).into_response()
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/summary?ticker=
pub async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(ticker) = params.get("ticker").filter(|t| !t.is_empty()) else {
        return missing_param("ticker");
    };

    let key = fingerprint(
        "/api/summary",
        &[("ticker".to_string(), ticker.to_string())],
    );
    if let Some(cached) = state.cache.get(&key) {
        return Json(cached).into_response();
    }

    let chart = match state.provider.chart(ticker, QUOTE_RANGE, QUOTE_INTERVAL).await {
        Ok(chart) => chart,
        Err(e) => {
            error!(ticker, error = %e, "Summary fetch failed");
            return server_error();
        }
    };

    let Some(chart) = chart else {
        return Json(json!({ "error": "Invalid ticker" })).into_response();
    };

    let payload = json!(SummaryResponse {
        symbol: chart.meta.symbol.clone(),
        short_name: chart.meta.display_name().to_string(),
        regular_market_price: chart.meta.price(),
        previous_close: chart.meta.previous_close(),
        currency: chart.meta.currency().to_string(),
    });

    cache_and_respond(state.cache.as_ref(), &key, payload, state.quote_ttl)
}

/// GET /api/index?symbol=
pub async fn get_index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(symbol) = params.get("symbol").filter(|s| !s.is_empty()) else {
        return missing_param("index symbol");
    };

    let key = fingerprint("/api/index", &[("symbol".to_string(), symbol.to_string())]);
    if let Some(cached) = state.cache.get(&key) {
        return Json(cached).into_response();
    }

    let chart = match state.provider.chart(symbol, QUOTE_RANGE, QUOTE_INTERVAL).await {
        Ok(chart) => chart,
        Err(e) => {
            error!(symbol, error = %e, "Index fetch failed");
            return server_error();
        }
    };

    let Some(chart) = chart else {
        return Json(json!({ "error": "Invalid index symbol" })).into_response();
    };

    let payload = json!(IndexResponse {
        symbol: chart.meta.symbol.clone(),
        price: chart.meta.price(),
        previous_close: chart.meta.previous_close(),
        currency: chart.meta.currency().to_string(),
    });

    cache_and_respond(state.cache.as_ref(), &key, payload, state.quote_ttl)
}

/// GET /api/history?ticker=&range=
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(ticker) = params.get("ticker").filter(|t| !t.is_empty()) else {
        return missing_param("ticker");
    };
    let range = params.get("range").map(String::as_str).unwrap_or("1mo");
    let interval = interval_for_range(range);

    let key = fingerprint(
        "/api/history",
        &[
            ("ticker".to_string(), ticker.to_string()),
            ("range".to_string(), range.to_string()),
        ],
    );
    if let Some(cached) = state.cache.get(&key) {
        return Json(cached).into_response();
    }

    let chart = match state.provider.chart(ticker, range, interval).await {
        Ok(chart) => chart,
        Err(e) => {
            error!(ticker, range, error = %e, "History fetch failed");
            // Degrade to an empty series — the chart renders blank
            // instead of the whole page erroring.
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!([]))).into_response();
        }
    };

    let Some(chart) = chart else {
        return Json(json!([])).into_response();
    };

    let history: Vec<HistoryPoint> = chart
        .series
        .iter()
        .map(|c| HistoryPoint {
            date: c.timestamp.to_rfc3339(),
            close: c.close,
        })
        .collect();

    cache_and_respond(state.cache.as_ref(), &key, json!(history), state.history_ttl)
}

/// GET /api/trending
pub async fn get_trending(State(state): State<AppState>) -> Response {
    let key = fingerprint("/api/trending", &[]);
    if let Some(cached) = state.cache.get(&key) {
        return Json(cached).into_response();
    }

    let symbols = match state.provider.trending_symbols().await {
        Ok(symbols) => symbols,
        Err(e) => {
            error!(error = %e, "Trending list fetch failed");
            return server_error();
        }
    };

    let tickers: Vec<String> = symbols
        .into_iter()
        .filter(|s| !s.is_empty())
        .filter(|s| !s.contains('-') && !s.contains('=') && !s.ends_with('X'))
        .take(TRENDING_LIMIT)
        .collect();

    let mut results = Vec::new();
    for ticker in &tickers {
        let chart = match state.provider.chart(ticker, QUOTE_RANGE, QUOTE_INTERVAL).await {
            Ok(Some(chart)) => chart,
            Ok(None) => continue,
            Err(e) => {
                error!(ticker, error = %e, "Trending quote failed, skipping");
                continue;
            }
        };
        push_trending_entry(&mut results, &chart);
    }

    results.sort_by(|a: &TrendingEntry, b: &TrendingEntry| {
        b.change
            .abs()
            .partial_cmp(&a.change.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    cache_and_respond(state.cache.as_ref(), &key, json!(results), state.quote_ttl)
}

fn push_trending_entry(results: &mut Vec<TrendingEntry>, chart: &Chart) {
    let Some(price) = chart.meta.regular_market_price else {
        return;
    };
    if price < TRENDING_MIN_PRICE {
        return;
    }
    let previous_close = chart.meta.previous_close();
    results.push(TrendingEntry {
        symbol: chart.meta.symbol.clone(),
        price,
        previous_close,
        change: price - previous_close,
    });
}

/// GET /api/scan?mode=
pub async fn get_scan(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("mode").map(String::as_str).unwrap_or("balanced");

    match state.engine.scan(mode).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!(mode, error = %e, "Scan failed");
            server_error()
        }
    }
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
