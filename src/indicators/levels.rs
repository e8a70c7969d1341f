// =============================================================================
// Support / Resistance Levels
// =============================================================================
//
// Derives the most recent structural floor and ceiling from a trailing window
// of candles.  Levels are historical: a close that breaks through them does
// not move them.
//
// Methods:
//   Extremes    — support = min(low), resistance = max(high)
//   SwingPivots — mean of pivot lows / pivot highs, where a pivot is strictly
//                 beyond its two neighbours on each side; falls back to the
//                 window extremes when no pivots exist or the means invert.

use serde::{Deserialize, Serialize};

/// How support and resistance are derived from the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMethod {
    Extremes,
    SwingPivots,
}

impl Default for LevelMethod {
    fn default() -> Self {
        Self::Extremes
    }
}

/// Support / resistance pair.  `support <= resistance` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

/// Number of neighbours on each side a pivot must exceed.
const PIVOT_SPAN: usize = 2;

/// Compute support / resistance over the last `window` candles.
///
/// `lows` and `highs` must be aligned.  Returns `None` for empty input or a
/// zero window.
pub fn calculate_levels(
    lows: &[f64],
    highs: &[f64],
    window: usize,
    method: LevelMethod,
) -> Option<SupportResistance> {
    let len = lows.len().min(highs.len());
    if len == 0 || window == 0 {
        return None;
    }

    let start = len.saturating_sub(window);
    let lows = &lows[start..len];
    let highs = &highs[start..len];

    let extremes = window_extremes(lows, highs)?;

    match method {
        LevelMethod::Extremes => Some(extremes),
        LevelMethod::SwingPivots => {
            let support = pivot_mean(lows, |x, n| x < n).unwrap_or(extremes.support);
            let resistance = pivot_mean(highs, |x, n| x > n).unwrap_or(extremes.resistance);
            if support <= resistance {
                Some(SupportResistance {
                    support,
                    resistance,
                })
            } else {
                Some(extremes)
            }
        }
    }
}

fn window_extremes(lows: &[f64], highs: &[f64]) -> Option<SupportResistance> {
    let support = lows.iter().copied().fold(f64::INFINITY, f64::min);
    let resistance = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (support.is_finite() && resistance.is_finite()).then_some(SupportResistance {
        support,
        resistance,
    })
}

/// Mean of the values that beat all `PIVOT_SPAN` neighbours on both sides.
fn pivot_mean(values: &[f64], beats: impl Fn(f64, f64) -> bool) -> Option<f64> {
    if values.len() < 2 * PIVOT_SPAN + 1 {
        return None;
    }

    let pivots: Vec<f64> = (PIVOT_SPAN..values.len() - PIVOT_SPAN)
        .filter(|&i| {
            (1..=PIVOT_SPAN).all(|k| beats(values[i], values[i - k]) && beats(values[i], values[i + k]))
        })
        .map(|i| values[i])
        .collect();

    if pivots.is_empty() {
        return None;
    }
    Some(pivots.iter().sum::<f64>() / pivots.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_over_trailing_window() {
        let lows = vec![1.0, 5.0, 6.0, 4.0, 7.0];
        let highs = vec![20.0, 8.0, 9.0, 7.0, 10.0];
        let sr = calculate_levels(&lows, &highs, 3, LevelMethod::Extremes).unwrap();
        assert_eq!(sr.support, 4.0);
        assert_eq!(sr.resistance, 10.0);
    }

    #[test]
    fn window_longer_than_series_uses_everything() {
        let lows = vec![3.0, 2.0];
        let highs = vec![4.0, 5.0];
        let sr = calculate_levels(&lows, &highs, 30, LevelMethod::Extremes).unwrap();
        assert_eq!(sr.support, 2.0);
        assert_eq!(sr.resistance, 5.0);
    }

    #[test]
    fn empty_input_or_zero_window() {
        assert!(calculate_levels(&[], &[], 30, LevelMethod::Extremes).is_none());
        assert!(calculate_levels(&[1.0], &[2.0], 0, LevelMethod::Extremes).is_none());
    }

    #[test]
    fn swing_pivots_average_local_extrema() {
        //            0    1    2    3    4    5    6    7    8
        let lows = vec![10.0, 9.0, 7.0, 9.0, 10.0, 9.0, 5.0, 8.0, 9.0];
        let highs = vec![12.0, 13.0, 15.0, 13.0, 12.0, 14.0, 17.0, 14.0, 13.0];
        let sr = calculate_levels(&lows, &highs, 30, LevelMethod::SwingPivots).unwrap();
        // Pivot lows at 2 (7.0) and 6 (5.0); pivot highs at 2 (15.0) and 6 (17.0).
        assert!((sr.support - 6.0).abs() < 1e-12);
        assert!((sr.resistance - 16.0).abs() < 1e-12);
    }

    #[test]
    fn swing_pivots_fall_back_without_pivots() {
        let lows: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let highs: Vec<f64> = (2..=11).map(|x| x as f64).collect();
        let sr = calculate_levels(&lows, &highs, 30, LevelMethod::SwingPivots).unwrap();
        assert_eq!(sr.support, 1.0);
        assert_eq!(sr.resistance, 11.0);
    }

    #[test]
    fn swing_pivots_never_invert() {
        // A pivot high early and a pivot low much later at a higher price.
        let lows = vec![5.0, 5.0, 5.0, 5.0, 5.0, 60.0, 61.0, 50.0, 61.0, 62.0];
        let highs = vec![10.0, 11.0, 20.0, 11.0, 10.0, 70.0, 71.0, 72.0, 73.0, 74.0];
        let sr = calculate_levels(&lows, &highs, 30, LevelMethod::SwingPivots).unwrap();
        assert!(sr.support <= sr.resistance);
    }
}
