// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split deltas into gains (Δ > 0) and losses (|Δ| for Δ < 0).
// Step 3 — Average them, either:
//            Wilder: seed with the SMA of the first `period` gains / losses,
//                    then avg = (prev_avg * (period - 1) + current) / period
//            Simple: plain mean of the trailing `period` gains / losses
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

use serde::{Deserialize, Serialize};

/// How average gain / loss are formed from the trailing deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSmoothing {
    /// Wilder's recursive smoothing over the whole history.
    Wilder,
    /// Simple mean over the last `period` deltas only.
    Simple,
}

impl Default for RsiSmoothing {
    fn default() -> Self {
        Self::Wilder
    }
}

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period` (the first `period` deltas are consumed to seed the averages).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `closes.len() < period + 1` => empty vec (need at least `period` deltas)
/// - If average loss is zero (no down moves), RSI is clamped to 100.0.
/// - If both averages are zero (flat market), RSI is 50.0.
/// - Non-finite results are dropped and the series is truncated.
pub fn calculate_rsi(closes: &[f64], period: usize, smoothing: RsiSmoothing) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let (gains, losses) = split_deltas(closes);

    match smoothing {
        RsiSmoothing::Wilder => wilder_series(&gains, &losses, period),
        RsiSmoothing::Simple => simple_series(&gains, &losses, period),
    }
}

/// Most recent RSI value, or `None` when there is insufficient data.
pub fn current_rsi(closes: &[f64], period: usize, smoothing: RsiSmoothing) -> Option<f64> {
    calculate_rsi(closes, period, smoothing).last().copied()
}

// =============================================================================
// Internal helpers
// =============================================================================

fn split_deltas(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    closes
        .windows(2)
        .map(|w| w[1] - w[0])
        .map(|d| {
            if d > 0.0 {
                (d, 0.0)
            } else if d < 0.0 {
                (0.0, d.abs())
            } else {
                (0.0, 0.0)
            }
        })
        .unzip()
}

fn wilder_series(gains: &[f64], losses: &[f64], period: usize) -> Vec<f64> {
    let period_f = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;

    let mut result = Vec::with_capacity(gains.len() - period + 1);
    match rsi_from_averages(avg_gain, avg_loss) {
        Some(rsi) => result.push(rsi),
        None => return result,
    }

    for (&gain, &loss) in gains[period..].iter().zip(&losses[period..]) {
        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result.push(rsi),
            None => break, // Non-finite — stop producing values.
        }
    }

    result
}

fn simple_series(gains: &[f64], losses: &[f64], period: usize) -> Vec<f64> {
    let period_f = period as f64;
    let mut result = Vec::with_capacity(gains.len() - period + 1);

    for end in period..=gains.len() {
        let avg_gain = gains[end - period..end].iter().sum::<f64>() / period_f;
        let avg_loss = losses[end - period..end].iter().sum::<f64>() / period_f;
        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result.push(rsi),
            None => break,
        }
    }

    result
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // No movement at all — neutral.
    } else if avg_loss == 0.0 {
        100.0 // All gains, no losses.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}
