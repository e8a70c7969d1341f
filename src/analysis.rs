// =============================================================================
// Analysis — one complete technical analysis of one asset
// =============================================================================
//
// Pipeline (single pass, no shared state):
//
//   PricePoints ─▶ PriceSeries ─▶ IndicatorSet ─┬─▶ TrendAnalysis ─┐
//                                               └──────────────────┴─▶ SignalResult
//
// The only fallible step is series normalization.  Everything after it is
// best-effort: indicators whose windows do not fit are `null` and listed in
// `summary.insufficient_data`.
//
// Identical input and configuration always produce identical output.
// =============================================================================

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine_config::EngineConfig;
use crate::error::Result;
use crate::indicators::change::price_change_pct;
use crate::indicators::IndicatorSet;
use crate::market_data::{PricePoint, PriceSeries};
use crate::precision::{round_to, round_to_precision};
use crate::signals::{SignalResult, SignalSynthesizer};
use crate::trend::{self, TrendAnalysis};
use crate::types::AnalysisQuality;

/// Bumped whenever a field of `AnalysisReport` changes meaning or shape.
pub const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Input / output types
// =============================================================================

/// One asset's history plus optional provider-side summary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub points: Vec<PricePoint>,
    /// Live spot price; only used for `summary.current_price`.
    #[serde(default)]
    pub spot_price: Option<f64>,
    /// Provider's 24h percentage change; only used for the summary.
    #[serde(default)]
    pub price_change_24h: Option<f64>,
}

impl AnalysisRequest {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self {
            points,
            spot_price: None,
            price_change_24h: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub current_price: f64,
    pub price_change_24h: f64,
    pub data_points: usize,
    pub analysis_quality: AnalysisQuality,
    /// Indicators left `null` because the series is too short.
    pub insufficient_data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub indicators: IndicatorSet,
    pub trend_analysis: TrendAnalysis,
    pub signals: SignalResult,
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    /// Copy with values rounded for display.
    ///
    /// Price-like values use the precision of the current price; RSI,
    /// volatility and percentage changes keep 2 decimals; confidences keep 1.
    pub fn rounded(&self) -> Self {
        let reference = Some(self.summary.current_price);
        let price = |v: f64| round_to_precision(v, reference);
        let opt_price = |v: Option<f64>| v.map(price);
        let two_dp = |v: f64| round_to(v, 2);

        let ind = &self.indicators;
        let indicators = IndicatorSet {
            sma_20: opt_price(ind.sma_20),
            sma_50: opt_price(ind.sma_50),
            ema_12: opt_price(ind.ema_12),
            ema_26: opt_price(ind.ema_26),
            rsi: ind.rsi.map(two_dp),
            macd: opt_price(ind.macd),
            macd_signal: opt_price(ind.macd_signal),
            macd_histogram: opt_price(ind.macd_histogram),
            bollinger_bands: ind.bollinger_bands.map(|mut bb| {
                bb.upper = price(bb.upper);
                bb.middle = price(bb.middle);
                bb.lower = price(bb.lower);
                bb
            }),
            support_resistance: ind.support_resistance.map(|mut sr| {
                sr.support = price(sr.support);
                sr.resistance = price(sr.resistance);
                sr
            }),
            volume_sma: ind.volume_sma.map(two_dp),
            volatility: ind.volatility.map(two_dp),
        };

        let mut trend_analysis = self.trend_analysis;
        trend_analysis.confidence = round_to(trend_analysis.confidence, 1);
        trend_analysis.price_change = two_dp(trend_analysis.price_change);

        let mut signals = self.signals.clone();
        signals.confidence = round_to(signals.confidence, 1);
        signals.key_levels.support = opt_price(signals.key_levels.support);
        signals.key_levels.resistance = opt_price(signals.key_levels.resistance);
        signals.key_levels.sma_20 = opt_price(signals.key_levels.sma_20);
        signals.key_levels.sma_50 = opt_price(signals.key_levels.sma_50);

        let mut summary = self.summary.clone();
        summary.current_price = price(summary.current_price);
        summary.price_change_24h = two_dp(summary.price_change_24h);

        Self {
            schema_version: self.schema_version,
            indicators,
            trend_analysis,
            signals,
            summary,
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Normalize the request's points and analyze them.
pub fn analyze(request: &AnalysisRequest, config: &EngineConfig) -> Result<AnalysisReport> {
    let series = PriceSeries::new(request.points.clone())?;
    Ok(analyze_series(
        &series,
        request.spot_price,
        request.price_change_24h,
        config,
    ))
}

/// Analyze an already-normalized series.  Never fails.
pub fn analyze_series(
    series: &PriceSeries,
    spot_price: Option<f64>,
    price_change_24h: Option<f64>,
    config: &EngineConfig,
) -> AnalysisReport {
    let closes = series.closes();
    let close = series.last_close();
    let data_points = series.len();

    let indicators = IndicatorSet::compute(series, &config.indicators);

    let price_change = price_change_pct(closes, config.trend.price_change_lookback).unwrap_or(0.0);
    let trend_analysis = trend::classify(
        close,
        indicators.sma_20,
        indicators.sma_50,
        price_change,
        &config.trend,
    );

    let analysis_quality = AnalysisQuality::from_data_points(
        data_points,
        config.indicators.sma_short,
        config.indicators.sma_long,
    );

    let signals = SignalSynthesizer::new(config.signals.clone()).synthesize(
        &indicators,
        &trend_analysis,
        close,
        analysis_quality,
    );

    let current_price = spot_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(close);
    let price_change_24h = price_change_24h
        .filter(|c| c.is_finite())
        .or_else(|| price_change_pct(closes, Some(1)))
        .unwrap_or(0.0);

    let insufficient_data: Vec<String> = indicators
        .missing()
        .into_iter()
        .map(str::to_string)
        .collect();

    debug!(
        data_points,
        quality = %analysis_quality,
        trend = %trend_analysis.trend,
        recommendation = %signals.recommendation,
        confidence = format!("{:.2}", signals.confidence),
        insufficient = insufficient_data.len(),
        "analysis complete"
    );

    AnalysisReport {
        schema_version: SCHEMA_VERSION,
        indicators,
        trend_analysis,
        signals,
        summary: AnalysisSummary {
            current_price,
            price_change_24h,
            data_points,
            analysis_quality,
            insufficient_data,
        },
    }
}

/// Analyze independent requests in parallel.  Results keep input order.
pub fn analyze_batch(
    requests: &[AnalysisRequest],
    config: &EngineConfig,
) -> Vec<Result<AnalysisReport>> {
    requests
        .par_iter()
        .map(|request| analyze(request, config))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::types::{Recommendation, Trend};
    use chrono::{DateTime, Utc};

    const DAY_SECS: i64 = 86_400;

    fn point(i: usize, close: f64) -> PricePoint {
        PricePoint {
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + i as i64 * DAY_SECS, 0)
                .unwrap(),
            open: close,
            high: close * 1.001,
            low: close * 0.999,
            close,
            volume: 10_000.0,
        }
    }

    fn request(closes: &[f64]) -> AnalysisRequest {
        AnalysisRequest::new(closes.iter().enumerate().map(|(i, &c)| point(i, c)).collect())
    }

    fn ramp(from: f64, to: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| from + (to - from) * i as f64 / (n - 1) as f64)
            .collect()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 8.0 + (i as f64 * 0.05))
            .collect()
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let req = request(&wave(80));
        let cfg = EngineConfig::default();
        let a = serde_json::to_string(&analyze(&req, &cfg).unwrap()).unwrap();
        let b = serde_json::to_string(&analyze(&req, &cfg).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constant_price_collapses_everything() {
        let report = analyze(&request(&[250.0; 60]), &EngineConfig::default()).unwrap();
        let ind = &report.indicators;

        assert_eq!(ind.volatility, Some(0.0));
        assert_eq!(ind.rsi, Some(50.0));
        assert_eq!(ind.macd, Some(0.0));
        assert_eq!(ind.macd_histogram, Some(0.0));
        let bb = ind.bollinger_bands.unwrap();
        assert_eq!(bb.upper, 250.0);
        assert_eq!(bb.middle, 250.0);
        assert_eq!(bb.lower, 250.0);

        assert_eq!(report.trend_analysis.trend, Trend::Neutral);
        assert_eq!(report.signals.recommendation, Recommendation::Hold);
        assert!(report.signals.signals.is_empty());
        assert!(report.summary.insufficient_data.is_empty());
    }

    #[test]
    fn constant_price_holds_even_with_zero_vote_margin() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"signals":{"vote_margin":0}}"#).unwrap();
        let report = analyze(&request(&[250.0; 60]), &cfg).unwrap();
        assert_eq!(report.signals.recommendation, Recommendation::Hold);
    }

    #[test]
    fn zero_volume_is_accepted() {
        let mut req = request(&[10.0, 10.5, 11.0]);
        for p in &mut req.points {
            p.volume = 0.0;
        }
        let report = analyze(&req, &EngineConfig::default()).unwrap();
        assert_eq!(report.summary.data_points, 3);

        req.points[1].volume = -1.0;
        let err = analyze(&req, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, DataError::NegativeVolume { index: 1, value: -1.0 });
    }

    #[test]
    fn steady_uptrend_is_bullish_and_never_sells() {
        let closes = ramp(100.0, 160.0, 60);
        let report = analyze(&request(&closes), &EngineConfig::default()).unwrap();
        let ind = &report.indicators;

        assert_eq!(report.trend_analysis.trend, Trend::Bullish);
        assert_ne!(report.signals.recommendation, Recommendation::Sell);
        assert!(ind.rsi.unwrap() > 50.0);

        let close = *closes.last().unwrap();
        let sma_20 = ind.sma_20.unwrap();
        let sma_50 = ind.sma_50.unwrap();
        assert!(close > sma_20 && sma_20 > sma_50);
        assert!((report.trend_analysis.price_change - 60.0).abs() < 1e-9);
    }

    #[test]
    fn steady_downtrend_is_bearish_and_never_buys() {
        let report = analyze(&request(&ramp(160.0, 100.0, 60)), &EngineConfig::default()).unwrap();
        assert_eq!(report.trend_analysis.trend, Trend::Bearish);
        assert_ne!(report.signals.recommendation, Recommendation::Buy);
        assert!(report.indicators.rsi.unwrap() < 50.0);
    }

    #[test]
    fn long_window_boundary() {
        let cfg = EngineConfig::default();

        let fifty = analyze(&request(&wave(50)), &cfg).unwrap();
        assert!(fifty.indicators.sma_50.is_some());
        assert_eq!(fifty.summary.analysis_quality, AnalysisQuality::High);
        assert!(fifty.summary.insufficient_data.is_empty());

        let forty_nine = analyze(&request(&wave(49)), &cfg).unwrap();
        assert!(forty_nine.indicators.sma_50.is_none());
        assert_eq!(forty_nine.summary.analysis_quality, AnalysisQuality::Medium);
        assert!(forty_nine
            .summary
            .insufficient_data
            .contains(&"sma_50".to_string()));
    }

    #[test]
    fn five_points_is_low_quality_but_succeeds() {
        let report = analyze(&request(&[10.0, 10.5, 10.2, 10.8, 11.0]), &EngineConfig::default())
            .unwrap();
        let ind = &report.indicators;

        assert_eq!(report.summary.analysis_quality, AnalysisQuality::Low);
        assert_eq!(report.summary.data_points, 5);
        assert!(ind.sma_20.is_none());
        assert!(ind.ema_12.is_none());
        assert!(ind.rsi.is_none());
        assert!(ind.macd.is_none());
        assert!(ind.bollinger_bands.is_none());
        assert!(ind.volatility.is_none());
        assert!(ind.support_resistance.is_some());
        assert!(report.signals.confidence <= 50.0);
        assert_eq!(report.summary.insufficient_data.len(), 11);
    }

    #[test]
    fn out_of_order_timestamps_are_rejected() {
        let mut req = request(&wave(30));
        req.points.swap(10, 11);
        let err = analyze(&req, &EngineConfig::default()).unwrap_err();
        assert_eq!(err, DataError::NonAscendingTimestamp { index: 11 });
    }

    #[test]
    fn single_point_is_rejected() {
        let err = analyze(&request(&[100.0]), &EngineConfig::default()).unwrap_err();
        assert_eq!(err, DataError::TooFewPoints { len: 1 });
    }

    #[test]
    fn outputs_stay_in_bounds() {
        let cfg = EngineConfig::default();
        for n in [2, 7, 19, 20, 21, 35, 49, 50, 120] {
            let report = analyze(&request(&wave(n)), &cfg).unwrap();
            if let Some(rsi) = report.indicators.rsi {
                assert!((0.0..=100.0).contains(&rsi));
            }
            assert!((0.0..=100.0).contains(&report.signals.confidence));
            assert!((0.0..=100.0).contains(&report.trend_analysis.confidence));
            if let Some(sr) = report.indicators.support_resistance {
                assert!(sr.support <= sr.resistance);
            }
        }
    }

    #[test]
    fn summary_fields_prefer_caller_values() {
        let mut req = request(&[100.0, 110.0]);
        let derived = analyze(&req, &EngineConfig::default()).unwrap();
        assert_eq!(derived.summary.current_price, 110.0);
        assert!((derived.summary.price_change_24h - 10.0).abs() < 1e-10);

        req.spot_price = Some(111.5);
        req.price_change_24h = Some(-1.25);
        let supplied = analyze(&req, &EngineConfig::default()).unwrap();
        assert_eq!(supplied.summary.current_price, 111.5);
        assert_eq!(supplied.summary.price_change_24h, -1.25);
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let mut bad = request(&wave(30));
        bad.points[5].low = bad.points[5].close * 2.0;

        let requests = vec![request(&wave(60)), bad, request(&[1.0, 2.0, 3.0])];
        let results = analyze_batch(&requests, &EngineConfig::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().summary.data_points, 60);
        assert_eq!(
            results[1].as_ref().unwrap_err(),
            &DataError::InconsistentCandle { index: 5 }
        );
        assert_eq!(results[2].as_ref().unwrap().summary.data_points, 3);
    }

    #[test]
    fn rounded_report_uses_display_precision() {
        let report = analyze(&request(&wave(60)), &EngineConfig::default()).unwrap();
        let rounded = report.rounded();

        let rsi = rounded.indicators.rsi.unwrap();
        assert_eq!(rsi, round_to(report.indicators.rsi.unwrap(), 2));
        assert_eq!(rounded.signals.confidence, round_to(report.signals.confidence, 1));
        // Prices near 100 keep 4 decimals.
        let sma = rounded.indicators.sma_20.unwrap();
        assert_eq!(sma, round_to(report.indicators.sma_20.unwrap(), 4));
        assert_eq!(rounded.signals.key_levels.sma_20, Some(sma));
        assert_eq!(rounded.signals.recommendation, report.signals.recommendation);
    }

    #[test]
    fn report_serialises_with_schema_version() {
        let report = analyze(&request(&[10.0, 11.0, 12.0]), &EngineConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
        assert!(json["indicators"]["sma_20"].is_null());
        assert!(json["signals"]["recommendation"].is_string());
        assert_eq!(json["summary"]["analysis_quality"], "low");
    }
}
