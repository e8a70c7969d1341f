// =============================================================================
// Price Change
// =============================================================================
//
// Percentage move between two closes:
//
//   change = (close_now - close_then) / close_then * 100
//
// Feeds the trend classifier (`price_change`) and the summary's 24h change.

/// Percentage change from `from` to `to`.  `None` when `from` is zero or the
/// result is not finite.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let change = (to - from) / from * 100.0;
    change.is_finite().then_some(change)
}

/// Percentage change of the last close versus `lookback` closes earlier.
///
/// `None` measures from the first close; a lookback is clamped to
/// `1..=len - 1`.  Returns `None` for fewer than two closes.
pub fn price_change_pct(closes: &[f64], lookback: Option<usize>) -> Option<f64> {
    let (&last, earlier) = closes.split_last()?;
    if earlier.is_empty() {
        return None;
    }
    let span = lookback.map_or(earlier.len(), |n| n.clamp(1, earlier.len()));
    pct_change(earlier[earlier.len() - span], last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_basic() {
        assert!((pct_change(80.0, 100.0).unwrap() - 25.0).abs() < 1e-10);
        assert!((pct_change(100.0, 80.0).unwrap() + 20.0).abs() < 1e-10);
        assert_eq!(pct_change(0.0, 5.0), None);
    }

    #[test]
    fn whole_window_by_default() {
        let closes = [100.0, 90.0, 120.0, 150.0];
        assert!((price_change_pct(&closes, None).unwrap() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn lookback_is_clamped() {
        let closes = [100.0, 90.0, 120.0, 150.0];
        let two_back = (150.0 / 90.0 - 1.0) * 100.0;
        assert!((price_change_pct(&closes, Some(2)).unwrap() - two_back).abs() < 1e-10);
        assert!((price_change_pct(&closes, Some(99)).unwrap() - 50.0).abs() < 1e-10);
        assert!((price_change_pct(&closes, Some(0)).unwrap() - 25.0).abs() < 1e-10);
    }

    #[test]
    fn needs_two_closes() {
        assert_eq!(price_change_pct(&[5.0], None), None);
        assert_eq!(price_change_pct(&[], Some(1)), None);
    }
}
