// =============================================================================
// Trend Classification
// =============================================================================
//
// Labels the prevailing trend from the latest close, the short / long SMAs
// and the percentage price change over the analysis window.
//
// Decision rule:
//   MA evidence       close > SMA_short > SMA_long   (bullish, mirrored bearish)
//   Momentum evidence price_change > +threshold      (bullish, mirrored bearish)
//   trend             bullish if only bullish evidence exists, bearish if only
//                     bearish evidence exists, neutral otherwise
//
// Strength:
//   strong    both MA and momentum agree and |price_change| > strong threshold
//   moderate  both MA and momentum agree
//   weak      a single source of evidence, or no trend
//
// MA evidence needs both SMAs, so below `sma_long` points the strength is
// always weak however large the move.
//
// Confidence averages two saturating terms, SMA separation relative to price
// and |price_change|, and is clamped to [0, 100].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine_config::TrendParams;
use crate::types::{Strength, Trend};

/// Output of the trend classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub strength: Strength,
    /// [0, 100]
    pub confidence: f64,
    /// Percentage change of close over the analysis window.
    pub price_change: f64,
}

/// Classify the trend.
///
/// Missing SMAs contribute no MA evidence and no separation confidence;
/// classification then rests on `price_change` alone.
pub fn classify(
    close: f64,
    sma_short: Option<f64>,
    sma_long: Option<f64>,
    price_change: f64,
    params: &TrendParams,
) -> TrendAnalysis {
    let (ma_bull, ma_bear) = match (sma_short, sma_long) {
        (Some(s), Some(l)) => (close > s && s > l, close < s && s < l),
        _ => (false, false),
    };
    let mom_bull = price_change > params.trend_threshold_pct;
    let mom_bear = price_change < -params.trend_threshold_pct;

    let bullish = ma_bull || mom_bull;
    let bearish = ma_bear || mom_bear;

    let (trend, both_agree) = match (bullish, bearish) {
        (true, false) => (Trend::Bullish, ma_bull && mom_bull),
        (false, true) => (Trend::Bearish, ma_bear && mom_bear),
        _ => (Trend::Neutral, false),
    };

    let strength = if both_agree && price_change.abs() > params.strong_threshold_pct {
        Strength::Strong
    } else if both_agree {
        Strength::Moderate
    } else {
        Strength::Weak
    };

    let confidence = trend_confidence(close, sma_short, sma_long, price_change, params);

    debug!(
        %trend,
        %strength,
        confidence = format!("{:.2}", confidence),
        price_change = format!("{:.3}%", price_change),
        "trend classified"
    );

    TrendAnalysis {
        trend,
        strength,
        confidence,
        price_change,
    }
}

fn trend_confidence(
    close: f64,
    sma_short: Option<f64>,
    sma_long: Option<f64>,
    price_change: f64,
    params: &TrendParams,
) -> f64 {
    let separation_term = match (sma_short, sma_long) {
        (Some(s), Some(l)) if close > 0.0 => {
            let separation_pct = (s - l).abs() / close * 100.0;
            (separation_pct / params.separation_saturation_pct).min(1.0)
        }
        _ => 0.0,
    };
    let change_term = (price_change.abs() / params.change_saturation_pct).min(1.0);

    let confidence = (separation_term + change_term) / 2.0 * 100.0;
    if confidence.is_finite() {
        confidence.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
