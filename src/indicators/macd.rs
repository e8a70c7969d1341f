// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(fast) - EMA(slow)          (aligned on the same close)
//   Signal    = EMA(signal) of the MACD series
//   Histogram = MACD - Signal
//
// The MACD line exists from index `slow - 1`; the signal line needs a further
// `signal - 1` points, i.e. `slow + signal - 1` closes in total.  With the
// defaults that is 34, not 35: the first MACD value already counts as the
// first of the 9 the signal EMA is seeded from.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

/// Latest MACD reading.  The signal and histogram are absent when the series
/// is long enough for the MACD line but not for its signal line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Compute the MACD line series: one value per close from index `slow - 1`.
///
/// Returns an empty vec when `fast >= slow`, either period is zero, or there
/// are fewer than `slow` closes.
pub fn calculate_macd_line(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    if fast == 0 || fast >= slow || closes.len() < slow {
        return Vec::new();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    // ema_fast[i] belongs to close index i + fast - 1; skip ahead so both
    // series start at close index slow - 1.
    let offset = slow - fast;
    if ema_fast.len() < offset {
        return Vec::new();
    }

    ema_fast[offset..]
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect()
}

/// Latest MACD, signal and histogram values.
///
/// Returns `None` when not even the MACD line can be formed.
pub fn current_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    let line = calculate_macd_line(closes, fast, slow);
    let macd = *line.last()?;

    let signal = calculate_ema(&line, signal_period).last().copied();
    let histogram = signal.map(|s| macd - s);

    Some(MacdResult {
        macd,
        signal,
        histogram,
    })
}
