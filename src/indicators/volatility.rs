// =============================================================================
// Return Volatility
// =============================================================================
//
// Volatility = sample standard deviation of the last `window` period-over-period
// percentage returns, expressed in percent:
//
//   r_t        = (close_t - close_{t-1}) / close_{t-1}
//   volatility = stdev(r_{n-window+1} .. r_n) * 100
//
// A flat window yields exactly 0.0.

use super::stats::sample_std_dev;

/// Period-over-period fractional returns.  Zero-priced predecessors yield 0.
pub fn calculate_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// Volatility of the last `window` returns, in percent.
///
/// Needs `window + 1` closes; returns `None` otherwise or when `window < 2`.
pub fn calculate_volatility(closes: &[f64], window: usize) -> Option<f64> {
    if window < 2 || closes.len() < window + 1 {
        return None;
    }

    let returns = calculate_returns(&closes[closes.len() - window - 1..]);
    let sd = sample_std_dev(&returns)?;
    Some(sd * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_basic() {
        let r = calculate_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn flat_series_has_zero_volatility() {
        let closes = vec![250.0; 30];
        assert_eq!(calculate_volatility(&closes, 20), Some(0.0));
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        // Every return is exactly +100%.
        let closes: Vec<f64> = (0..25).map(|i| 2f64.powi(i)).collect();
        let v = calculate_volatility(&closes, 20).unwrap();
        assert!(v.abs() < 1e-10, "got {v}");
    }

    #[test]
    fn alternating_returns_known_value() {
        // Returns alternate +10% / -10%: mean 0, sample variance over 20 values
        // = 20 * 0.01 / 19.
        let mut closes = vec![100.0];
        for i in 0..20 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last * 1.1 } else { last * 0.9 });
        }
        let v = calculate_volatility(&closes, 20).unwrap();
        let expected = (20.0 * 0.01 / 19.0_f64).sqrt() * 100.0;
        assert!((v - expected).abs() < 1e-8, "got {v}, expected {expected}");
    }

    #[test]
    fn insufficient_data() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        assert!(calculate_volatility(&closes, 20).is_none());
        assert!(calculate_volatility(&closes, 1).is_none());
    }
}
