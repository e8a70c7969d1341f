// =============================================================================
// Technical Analysis Engine
// =============================================================================
//
// Turns one asset's OHLCV history into indicators, a trend classification and
// a buy / sell / hold recommendation with a confidence score.
//
// Entry points: `analyze`, `analyze_series`, `analyze_batch`.
// =============================================================================

pub mod analysis;
pub mod engine_config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod precision;
pub mod signals;
pub mod trend;
pub mod types;

pub use analysis::{
    analyze, analyze_batch, analyze_series, AnalysisReport, AnalysisRequest, AnalysisSummary,
    SCHEMA_VERSION,
};
pub use engine_config::{EngineConfig, IndicatorParams, SignalParams, TrendParams};
pub use error::{ConfigError, DataError};
pub use indicators::IndicatorSet;
pub use market_data::{PricePoint, PriceSeries};
pub use signals::SignalResult;
pub use trend::TrendAnalysis;
pub use types::{AnalysisQuality, Recommendation, Strength, Trend};
