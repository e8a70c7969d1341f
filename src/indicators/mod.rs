// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the analysis engine.  Point-in-time helpers return `Option<T>` so callers
// are forced to handle insufficient-data and numerical-edge-case scenarios.

pub mod bollinger;
pub mod change;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;
pub mod stats;
pub mod volatility;

pub use bollinger::BollingerBands;
pub use levels::{LevelMethod, SupportResistance};
pub use macd::MacdResult;
pub use rsi::RsiSmoothing;
pub use set::IndicatorSet;
