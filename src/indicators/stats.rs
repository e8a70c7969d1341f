// Small descriptive-statistics helpers shared by the band and volatility
// calculations.

/// Arithmetic mean.  `None` for an empty slice.
///
/// Deviations are summed relative to the first element, so a window of
/// identical values averages to exactly that value.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (&anchor, _) = values.split_first()?;
    let offset = values.iter().map(|x| x - anchor).sum::<f64>() / values.len() as f64;
    let m = anchor + offset;
    m.is_finite().then_some(m)
}

/// Sample standard deviation (N - 1 divisor).
///
/// `None` for fewer than two values.  Identical inputs yield exactly `0.0`.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let sd = variance.sqrt();
    sd.is_finite().then_some(sd)
}
