// =============================================================================
// Indicator Set — every indicator value as of the most recent candle
// =============================================================================
//
// Each indicator is computed independently from the normalized series.  An
// indicator whose window does not fit the series is `None` (serialized as
// `null`); a computed zero is `Some(0.0)`.
//
// Field names are fixed by the output schema; the actual windows come from
// `IndicatorParams` and only coincide with the names under the defaults.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::bollinger::{calculate_bollinger, BollingerBands};
use super::ema::current_ema;
use super::levels::{calculate_levels, SupportResistance};
use super::macd::current_macd;
use super::rsi::current_rsi;
use super::sma::current_sma;
use super::volatility::calculate_volatility;
use crate::engine_config::IndicatorParams;
use crate::market_data::PriceSeries;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bollinger_bands: Option<BollingerBands>,
    pub support_resistance: Option<SupportResistance>,
    pub volume_sma: Option<f64>,
    pub volatility: Option<f64>,
}

impl IndicatorSet {
    /// Compute all indicators for `series`.
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Self {
        let closes = series.closes();

        let macd = current_macd(closes, params.ema_fast, params.ema_slow, params.macd_signal);

        let set = Self {
            sma_20: current_sma(closes, params.sma_short),
            sma_50: current_sma(closes, params.sma_long),
            ema_12: current_ema(closes, params.ema_fast),
            ema_26: current_ema(closes, params.ema_slow),
            rsi: current_rsi(closes, params.rsi_period, params.rsi_smoothing),
            macd: macd.map(|m| m.macd),
            macd_signal: macd.and_then(|m| m.signal),
            macd_histogram: macd.and_then(|m| m.histogram),
            bollinger_bands: calculate_bollinger(
                closes,
                params.bollinger_period,
                params.bollinger_std_dev,
            ),
            support_resistance: calculate_levels(
                series.lows(),
                series.highs(),
                params.level_window,
                params.level_method,
            ),
            volume_sma: current_sma(series.volumes(), params.volume_sma_period),
            volatility: calculate_volatility(closes, params.volatility_window),
        };

        trace!(missing = ?set.missing(), "indicator set computed");
        set
    }

    /// Names of the indicators that could not be computed, in schema order.
    pub fn missing(&self) -> Vec<&'static str> {
        let present = [
            ("sma_20", self.sma_20.is_some()),
            ("sma_50", self.sma_50.is_some()),
            ("ema_12", self.ema_12.is_some()),
            ("ema_26", self.ema_26.is_some()),
            ("rsi", self.rsi.is_some()),
            ("macd", self.macd.is_some()),
            ("macd_signal", self.macd_signal.is_some()),
            ("macd_histogram", self.macd_histogram.is_some()),
            ("bollinger_bands", self.bollinger_bands.is_some()),
            ("support_resistance", self.support_resistance.is_some()),
            ("volume_sma", self.volume_sma.is_some()),
            ("volatility", self.volatility.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PricePoint;
    use chrono::{DateTime, Utc};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint {
                timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + i as i64 * 86_400, 0)
                    .unwrap(),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume: 1_000.0 + i as f64,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn full_history_computes_everything() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let set = IndicatorSet::compute(&series_from_closes(&closes), &IndicatorParams::default());
        assert!(set.missing().is_empty(), "missing: {:?}", set.missing());
    }

    #[test]
    fn short_history_is_best_effort() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let set = IndicatorSet::compute(&series_from_closes(&closes), &IndicatorParams::default());
        assert!(set.sma_20.is_some());
        assert!(set.ema_12.is_some());
        assert!(set.rsi.is_some());
        assert!(set.bollinger_bands.is_some());
        assert!(set.volatility.is_some());
        assert!(set.support_resistance.is_some());
        assert_eq!(
            set.missing(),
            vec!["sma_50", "ema_26", "macd", "macd_signal", "macd_histogram"]
        );
    }

    #[test]
    fn macd_without_signal_line() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let set = IndicatorSet::compute(&series_from_closes(&closes), &IndicatorParams::default());
        assert!(set.macd.is_some());
        assert!(set.macd_signal.is_none());
        assert!(set.macd_histogram.is_none());
    }

    #[test]
    fn volume_sma_uses_volume_column() {
        let closes = vec![10.0; 20];
        let set = IndicatorSet::compute(&series_from_closes(&closes), &IndicatorParams::default());
        // Volumes are 1000..=1019 => mean 1009.5.
        assert!((set.volume_sma.unwrap() - 1009.5).abs() < 1e-10);
    }

    #[test]
    fn missing_values_serialise_as_null() {
        let closes = vec![10.0, 11.0, 12.0];
        let set = IndicatorSet::compute(&series_from_closes(&closes), &IndicatorParams::default());
        let json = serde_json::to_value(&set).unwrap();
        assert!(json["sma_50"].is_null());
        assert!(json["bollinger_bands"].is_null());
        assert!(json["support_resistance"]["support"].is_number());
    }
}
