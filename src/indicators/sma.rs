// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the trailing `period` values.  Used for the 20/50 price
// averages and for the 20-period volume average.

use super::stats::mean;

/// SMA of the last `period` values, computed directly so the reported value
/// carries no accumulated drift.
///
/// Returns `None` when fewer than `period` values are available.
pub fn current_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    mean(&values[values.len() - period..])
}
