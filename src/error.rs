// =============================================================================
// Engine errors
// =============================================================================
//
// Only malformed input and invalid configuration are errors.  Short series
// and numeric degeneracies (flat prices, zero variance) degrade gracefully
// and never surface here.

use thiserror::Error;

/// Fatal rejection of an input price series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("series has {len} points, at least 2 are required")]
    TooFewPoints { len: usize },

    #[error("timestamp at index {index} is not after the previous point")]
    NonAscendingTimestamp { index: usize },

    #[error("{field} at index {index} must be positive, got {value}")]
    NonPositivePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("volume at index {index} must not be negative, got {value}")]
    NegativeVolume { index: usize, value: f64 },

    #[error("{field} at index {index} is not a finite number")]
    NonFinite { index: usize, field: &'static str },

    #[error("candle at index {index} violates low <= open/close <= high")]
    InconsistentCandle { index: usize },

    #[error("malformed OHLC row at index {index}: {reason}")]
    MalformedRow { index: usize, reason: String },
}

/// Rejection of an [`EngineConfig`](crate::engine_config::EngineConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window `{0}` must be greater than zero")]
    ZeroWindow(&'static str),

    #[error("window `{short}` must be shorter than `{long}`")]
    WindowOrder {
        short: &'static str,
        long: &'static str,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, DataError>;
