//! Per-symbol momentum analysis.
//!
//! Fetches one month of daily history for a symbol and reduces it to a
//! score plus human-readable rationale. Each satisfied heuristic adds a
//! fixed point value and appends its reason string; evaluation order is
//! fixed because the reasons list is the UI display order.
//!
//! Everything that can go wrong for a single symbol — unknown ticker,
//! thin history, penny-stock floor, fetch or parse failure — collapses to
//! `None` so one bad symbol can never abort a batch.

use tracing::debug;

use crate::provider::MarketData;
use crate::types::{ScoreResult, Zone};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Daily-history lookback window for scoring.
const LOOKBACK_RANGE: &str = "1mo";
const LOOKBACK_INTERVAL: &str = "1d";

/// Minimum usable closes for a symbol to be scored at all.
const MIN_SAMPLES: usize = 5;

/// Penny-stock floor: symbols trading below this are excluded.
const MIN_PRICE: f64 = 3.5;

/// Last volume must exceed this multiple of the 20-sample average.
const VOLUME_SPIKE_RATIO: f64 = 1.5;

/// Price band considered the momentum sweet spot.
const MOMENTUM_RANGE_LOW: f64 = 3.5;
const MOMENTUM_RANGE_HIGH: f64 = 15.0;

/// Buy/target bands as multiples of the current price.
const BUY_ZONE_LOW: f64 = 0.97;
const BUY_ZONE_HIGH: f64 = 0.995;
const TARGET_ZONE_LOW: f64 = 1.05;
const TARGET_ZONE_HIGH: f64 = 1.12;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Evaluate the momentum heuristics over aligned close/volume history.
///
/// Returns the accumulated score and the reason strings in evaluation
/// order. Caller guarantees `closes.len() >= MIN_SAMPLES`.
pub fn score_series(closes: &[f64], volumes: &[f64]) -> (u32, Vec<String>) {
    let last_close = closes[closes.len() - 1];
    let prev_close = closes[closes.len() - 2];

    let avg20 = mean(tail(closes, 20));
    let avg5 = mean(tail(closes, 5));

    let last_vol = volumes.last().copied().unwrap_or(0.0);
    // Fixed divisor of 20 even when fewer samples exist; a thin history
    // reads as a lower volume baseline.
    let vol20 = tail(volumes, 20).iter().sum::<f64>() / 20.0;

    let last3 = tail(closes, 3);
    let rising = last3.len() == 3 && last3[2] > last3[1] && last3[1] > last3[0];

    let mut score = 0u32;
    let mut reasons = Vec::new();

    if last_close > prev_close {
        score += 10;
        reasons.push("Price is up today".to_string());
    }
    if last_close > avg20 {
        score += 15;
        reasons.push("Trading above 20-day average".to_string());
    }
    if last_close > avg5 {
        score += 10;
        reasons.push("Short-term momentum is positive".to_string());
    }
    if vol20 > 0.0 && last_vol > vol20 * VOLUME_SPIKE_RATIO {
        score += 20;
        reasons.push("Volume spike vs 20-day average".to_string());
    }
    if rising {
        score += 15;
        reasons.push("Recent candles show rising strength".to_string());
    }
    if (MOMENTUM_RANGE_LOW..=MOMENTUM_RANGE_HIGH).contains(&last_close) {
        score += 5;
        reasons.push("In the $3.50–$15 range (potential momentum zone)".to_string());
    }

    (score, reasons)
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Analyze one symbol: fetch history, score it, derive price bands.
///
/// Returns `None` for skips (no data, thin history, below the price
/// floor, or score under `min_score`) and for any per-symbol failure.
pub async fn analyze(
    provider: &dyn MarketData,
    symbol: &str,
    min_score: u32,
) -> Option<ScoreResult> {
    match try_analyze(provider, symbol, min_score).await {
        Ok(result) => result,
        Err(e) => {
            debug!(symbol, error = %e, "Symbol analysis failed, skipping");
            None
        }
    }
}

async fn try_analyze(
    provider: &dyn MarketData,
    symbol: &str,
    min_score: u32,
) -> anyhow::Result<Option<ScoreResult>> {
    let Some(chart) = provider
        .chart(symbol, LOOKBACK_RANGE, LOOKBACK_INTERVAL)
        .await?
    else {
        return Ok(None);
    };

    let closes: Vec<f64> = chart.series.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = chart.series.iter().map(|c| c.volume).collect();

    if closes.len() < MIN_SAMPLES {
        return Ok(None);
    }

    let last_close = closes[closes.len() - 1];
    let prev_close = closes[closes.len() - 2];

    if last_close < MIN_PRICE {
        return Ok(None);
    }

    let (score, reasons) = score_series(&closes, &volumes);

    if score < min_score {
        return Ok(None);
    }

    Ok(Some(ScoreResult {
        symbol: chart.meta.symbol,
        price: last_close,
        previous_close: prev_close,
        score,
        reasons,
        buy_zone: Zone {
            low: last_close * BUY_ZONE_LOW,
            high: last_close * BUY_ZONE_HIGH,
        },
        target_zone: Zone {
            low: last_close * TARGET_ZONE_LOW,
            high: last_close * TARGET_ZONE_HIGH,
        },
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockMarketData;
    use crate::types::{Candle, Chart, ChartMeta};
    use chrono::{Duration, Utc};

    fn make_chart(symbol: &str, closes: &[f64], volumes: &[f64]) -> Chart {
        let start = Utc::now() - Duration::days(closes.len() as i64);
        let series = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Candle {
                timestamp: start + Duration::days(i as i64),
                close,
                volume,
            })
            .collect();

        Chart {
            meta: ChartMeta {
                symbol: symbol.to_string(),
                short_name: None,
                regular_market_price: closes.last().copied(),
                chart_previous_close: None,
                currency: Some("USD".to_string()),
            },
            series,
        }
    }

    fn provider_with_chart(chart: Chart) -> MockMarketData {
        let mut provider = MockMarketData::new();
        provider
            .expect_chart()
            .returning(move |_, _, _| Ok(Some(chart.clone())));
        provider
    }

    // -- score_series --

    #[test]
    fn test_score_reference_vector() {
        // 19 flat closes then a close at 11: up today, above both
        // averages, in the momentum range; flat volume → no spike.
        let mut closes = vec![10.0; 19];
        closes.push(11.0);
        let volumes = vec![1000.0; 20];

        let (score, reasons) = score_series(&closes, &volumes);

        assert_eq!(score, 40);
        assert_eq!(
            reasons,
            vec![
                "Price is up today".to_string(),
                "Trading above 20-day average".to_string(),
                "Short-term momentum is positive".to_string(),
                "In the $3.50–$15 range (potential momentum zone)".to_string(),
            ]
        );
    }

    #[test]
    fn test_score_volume_spike() {
        let mut closes = vec![10.0; 19];
        closes.push(11.0);
        let mut volumes = vec![1000.0; 19];
        volumes.push(5000.0);
        // vol20 = (19*1000 + 5000) / 20 = 1200; 5000 > 1800 → spike

        let (score, reasons) = score_series(&closes, &volumes);

        assert_eq!(score, 60);
        assert!(reasons.contains(&"Volume spike vs 20-day average".to_string()));
    }

    #[test]
    fn test_score_rising_candles() {
        let mut closes = vec![10.0; 17];
        closes.extend([10.5, 10.8, 11.0]);
        let volumes = vec![1000.0; 20];

        let (score, reasons) = score_series(&closes, &volumes);

        // up today + above 20d + above 5d + rising + range
        assert_eq!(score, 10 + 15 + 10 + 15 + 5);
        assert!(reasons.contains(&"Recent candles show rising strength".to_string()));
    }

    #[test]
    fn test_score_flat_series_scores_zero_outside_range() {
        let closes = vec![100.0; 20];
        let volumes = vec![1000.0; 20];
        let (score, reasons) = score_series(&closes, &volumes);
        assert_eq!(score, 0);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_score_flat_series_in_range_gets_only_range_bonus() {
        let closes = vec![10.0; 20];
        let volumes = vec![1000.0; 20];
        let (score, reasons) = score_series(&closes, &volumes);
        assert_eq!(score, 5);
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn test_score_down_day() {
        let mut closes = vec![100.0; 19];
        closes.push(90.0);
        let volumes = vec![1000.0; 20];
        let (score, reasons) = score_series(&closes, &volumes);
        assert_eq!(score, 0);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_score_reasons_follow_evaluation_order() {
        // Trigger everything at once
        let mut closes = vec![8.0; 17];
        closes.extend([8.5, 9.0, 10.0]);
        let mut volumes = vec![1000.0; 19];
        volumes.push(10_000.0);

        let (score, reasons) = score_series(&closes, &volumes);

        assert_eq!(score, 75);
        assert_eq!(
            reasons,
            vec![
                "Price is up today".to_string(),
                "Trading above 20-day average".to_string(),
                "Short-term momentum is positive".to_string(),
                "Volume spike vs 20-day average".to_string(),
                "Recent candles show rising strength".to_string(),
                "In the $3.50–$15 range (potential momentum zone)".to_string(),
            ]
        );
    }

    #[test]
    fn test_score_short_history_uses_available_window() {
        // 5 samples only — price averages run over what exists, while the
        // fixed volume divisor makes a thin flat history read as a spike.
        let closes = vec![10.0, 10.0, 10.0, 10.0, 11.0];
        let volumes = vec![1000.0; 5];
        let (score, reasons) = score_series(&closes, &volumes);
        // up today + above 20-avg + above 5-avg + volume spike + range
        assert_eq!(score, 60);
        assert!(reasons.contains(&"Volume spike vs 20-day average".to_string()));
    }

    // -- analyze --

    #[tokio::test]
    async fn test_analyze_returns_scored_result() {
        let mut closes = vec![10.0; 19];
        closes.push(11.0);
        let provider = provider_with_chart(make_chart("RIOT", &closes, &vec![1000.0; 20]));

        let result = analyze(&provider, "RIOT", 25).await.unwrap();

        assert_eq!(result.symbol, "RIOT");
        assert_eq!(result.score, 40);
        assert!((result.price - 11.0).abs() < 1e-10);
        assert!((result.previous_close - 10.0).abs() < 1e-10);
        assert!((result.buy_zone.low - 11.0 * 0.97).abs() < 1e-10);
        assert!((result.buy_zone.high - 11.0 * 0.995).abs() < 1e-10);
        assert!((result.target_zone.low - 11.0 * 1.05).abs() < 1e-10);
        assert!((result.target_zone.high - 11.0 * 1.12).abs() < 1e-10);
    }

    #[tokio::test]
    async fn test_analyze_below_min_score_is_skip() {
        let mut closes = vec![10.0; 19];
        closes.push(11.0); // scores 40
        let provider = provider_with_chart(make_chart("RIOT", &closes, &vec![1000.0; 20]));

        assert!(analyze(&provider, "RIOT", 45).await.is_none());
    }

    #[tokio::test]
    async fn test_analyze_thin_history_is_skip() {
        let provider = provider_with_chart(make_chart(
            "NEW",
            &[10.0, 11.0, 12.0, 13.0],
            &[1000.0; 4],
        ));
        assert!(analyze(&provider, "NEW", 0).await.is_none());
    }

    #[tokio::test]
    async fn test_analyze_penny_stock_is_skip() {
        // Strong momentum but below the 3.50 floor
        let mut closes = vec![1.0; 19];
        closes.push(2.0);
        let provider = provider_with_chart(make_chart("PNNY", &closes, &vec![1000.0; 20]));

        assert!(analyze(&provider, "PNNY", 0).await.is_none());
    }

    #[tokio::test]
    async fn test_analyze_unknown_symbol_is_skip() {
        let mut provider = MockMarketData::new();
        provider.expect_chart().returning(|_, _, _| Ok(None));

        assert!(analyze(&provider, "NOPE", 0).await.is_none());
    }

    #[tokio::test]
    async fn test_analyze_provider_error_is_skip_not_panic() {
        let mut provider = MockMarketData::new();
        provider
            .expect_chart()
            .returning(|_, _, _| Err(anyhow::anyhow!("connection reset")));

        assert!(analyze(&provider, "ERR", 0).await.is_none());
    }
}
