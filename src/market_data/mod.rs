pub mod series;

// Re-export for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use series::{PricePoint, PriceSeries};
