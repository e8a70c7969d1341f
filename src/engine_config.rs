// =============================================================================
// Engine Configuration — window sizes, thresholds and vote parameters
// =============================================================================
//
// Every tunable number the analysis uses lives here.  The defaults reproduce
// the classic parameterisation (SMA 20/50, EMA 12/26, MACD signal 9, RSI 14,
// Bollinger 20 / 2σ).
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::indicators::levels::LevelMethod;
use crate::indicators::rsi::RsiSmoothing;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_sma_short() -> usize {
    20
}

fn default_sma_long() -> usize {
    50
}

fn default_ema_fast() -> usize {
    12
}

fn default_ema_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_rsi_period() -> usize {
    14
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_std_dev() -> f64 {
    2.0
}

fn default_volatility_window() -> usize {
    20
}

fn default_volume_sma_period() -> usize {
    20
}

fn default_level_window() -> usize {
    30
}

fn default_trend_threshold_pct() -> f64 {
    2.0
}

fn default_strong_threshold_pct() -> f64 {
    10.0
}

fn default_separation_saturation_pct() -> f64 {
    5.0
}

fn default_change_saturation_pct() -> f64 {
    20.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_vote_margin() -> u32 {
    1
}

fn default_low_quality_cap() -> f64 {
    50.0
}

fn default_medium_quality_cap() -> f64 {
    80.0
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Window sizes and multipliers for the indicator calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Short SMA window; also the `medium` data-quality threshold.
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    /// Long SMA window; also the `high` data-quality threshold.
    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,

    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    /// EMA period applied to the MACD line.
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default)]
    pub rsi_smoothing: RsiSmoothing,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Band half-width in standard deviations.
    #[serde(default = "default_bollinger_std_dev")]
    pub bollinger_std_dev: f64,

    /// Number of percentage returns in the volatility window.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,

    #[serde(default = "default_volume_sma_period")]
    pub volume_sma_period: usize,

    /// Trailing candles scanned for support / resistance.
    #[serde(default = "default_level_window")]
    pub level_window: usize,

    #[serde(default)]
    pub level_method: LevelMethod,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: default_sma_short(),
            sma_long: default_sma_long(),
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            macd_signal: default_macd_signal(),
            rsi_period: default_rsi_period(),
            rsi_smoothing: RsiSmoothing::default(),
            bollinger_period: default_bollinger_period(),
            bollinger_std_dev: default_bollinger_std_dev(),
            volatility_window: default_volatility_window(),
            volume_sma_period: default_volume_sma_period(),
            level_window: default_level_window(),
            level_method: LevelMethod::default(),
        }
    }
}

// =============================================================================
// TrendParams
// =============================================================================

/// Thresholds for the trend classifier.  All percentages are in percent
/// (2.0 means 2 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendParams {
    /// `|price_change|` above this establishes a direction on its own.
    #[serde(default = "default_trend_threshold_pct")]
    pub trend_threshold_pct: f64,

    /// `|price_change|` above this (with agreeing MAs) is a strong trend.
    #[serde(default = "default_strong_threshold_pct")]
    pub strong_threshold_pct: f64,

    /// SMA separation (relative to price) at which its confidence term
    /// saturates.
    #[serde(default = "default_separation_saturation_pct")]
    pub separation_saturation_pct: f64,

    /// `|price_change|` at which its confidence term saturates.
    #[serde(default = "default_change_saturation_pct")]
    pub change_saturation_pct: f64,

    /// Closes to look back for `price_change`; `None` spans the whole series.
    #[serde(default)]
    pub price_change_lookback: Option<usize>,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            trend_threshold_pct: default_trend_threshold_pct(),
            strong_threshold_pct: default_strong_threshold_pct(),
            separation_saturation_pct: default_separation_saturation_pct(),
            change_saturation_pct: default_change_saturation_pct(),
            price_change_lookback: None,
        }
    }
}

// =============================================================================
// SignalParams
// =============================================================================

/// Vote thresholds and confidence caps for the signal synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// Buy (sell) needs at least this many more buy (sell) votes than the
    /// opposite side.
    #[serde(default = "default_vote_margin")]
    pub vote_margin: u32,

    /// Confidence ceiling when `analysis_quality` is `low`.
    #[serde(default = "default_low_quality_cap")]
    pub low_quality_cap: f64,

    /// Confidence ceiling when `analysis_quality` is `medium`.
    #[serde(default = "default_medium_quality_cap")]
    pub medium_quality_cap: f64,

    /// Add an EMA fast/slow crossover vote after the trend vote.
    #[serde(default)]
    pub include_ema_cross: bool,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            vote_margin: default_vote_margin(),
            low_quality_cap: default_low_quality_cap(),
            medium_quality_cap: default_medium_quality_cap(),
            include_ema_cross: false,
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the analysis engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub trend: TrendParams,

    #[serde(default)]
    pub signals: SignalParams,

    /// Emit reports rounded to display precision.
    #[serde(default)]
    pub round_output: bool,
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// The loaded config is validated; an invalid file is an error rather than
    /// being silently patched.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            rsi_smoothing = ?config.indicators.rsi_smoothing,
            level_method = ?config.indicators.level_method,
            vote_margin = config.signals.vote_margin,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Check internal consistency of all parameters.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let ind = &self.indicators;

        let windows = [
            ("sma_short", ind.sma_short),
            ("sma_long", ind.sma_long),
            ("ema_fast", ind.ema_fast),
            ("ema_slow", ind.ema_slow),
            ("macd_signal", ind.macd_signal),
            ("rsi_period", ind.rsi_period),
            ("bollinger_period", ind.bollinger_period),
            ("volatility_window", ind.volatility_window),
            ("volume_sma_period", ind.volume_sma_period),
            ("level_window", ind.level_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::ZeroWindow(name));
            }
        }

        if ind.sma_short >= ind.sma_long {
            return Err(ConfigError::WindowOrder {
                short: "sma_short",
                long: "sma_long",
            });
        }
        if ind.ema_fast >= ind.ema_slow {
            return Err(ConfigError::WindowOrder {
                short: "ema_fast",
                long: "ema_slow",
            });
        }
        for (name, value) in [
            ("bollinger_period", ind.bollinger_period),
            ("volatility_window", ind.volatility_window),
        ] {
            if value < 2 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: "a sample deviation needs at least 2 values".to_string(),
                });
            }
        }
        if !(ind.bollinger_std_dev.is_finite() && ind.bollinger_std_dev > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "bollinger_std_dev",
                reason: format!("must be a positive number, got {}", ind.bollinger_std_dev),
            });
        }

        let trend = &self.trend;
        for (name, value) in [
            ("trend_threshold_pct", trend.trend_threshold_pct),
            ("strong_threshold_pct", trend.strong_threshold_pct),
            ("separation_saturation_pct", trend.separation_saturation_pct),
            ("change_saturation_pct", trend.change_saturation_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if trend.strong_threshold_pct < trend.trend_threshold_pct {
            return Err(ConfigError::InvalidParameter {
                name: "strong_threshold_pct",
                reason: "must not be below trend_threshold_pct".to_string(),
            });
        }

        let sig = &self.signals;
        if !(0.0..=100.0).contains(&sig.rsi_oversold)
            || !(0.0..=100.0).contains(&sig.rsi_overbought)
            || sig.rsi_oversold >= sig.rsi_overbought
        {
            return Err(ConfigError::InvalidParameter {
                name: "rsi_oversold",
                reason: format!(
                    "need 0 <= oversold < overbought <= 100, got {} / {}",
                    sig.rsi_oversold, sig.rsi_overbought
                ),
            });
        }
        if sig.vote_margin == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "vote_margin",
                reason: "must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("low_quality_cap", sig.low_quality_cap),
            ("medium_quality_cap", sig.medium_quality_cap),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must lie in [0, 100], got {value}"),
                });
            }
        }

        Ok(())
    }
}
