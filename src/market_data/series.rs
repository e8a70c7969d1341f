use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV observation as delivered by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PricePoint {
    /// Parse the provider's compact row format:
    ///
    /// ```json
    /// [1700000000000, 37000.0, 37050.0, 36990.0, 37020.0, 123.45]
    /// ```
    ///
    /// Numbers may arrive as JSON numbers or numeric strings.  The trailing
    /// volume column is optional and defaults to zero.
    pub fn from_row(row: &serde_json::Value, index: usize) -> Result<Self> {
        let cols = row.as_array().ok_or_else(|| DataError::MalformedRow {
            index,
            reason: "expected a JSON array".to_string(),
        })?;

        if cols.len() < 5 {
            return Err(DataError::MalformedRow {
                index,
                reason: format!("expected at least 5 columns, got {}", cols.len()),
            });
        }

        let millis = parse_f64(&cols[0], "timestamp", index)?;
        if !millis.is_finite() {
            return Err(DataError::NonFinite {
                index,
                field: "timestamp",
            });
        }
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis as i64).ok_or_else(|| {
            DataError::MalformedRow {
                index,
                reason: format!("timestamp {millis} is out of range"),
            }
        })?;

        let volume = match cols.get(5) {
            Some(serde_json::Value::Null) | None => 0.0,
            Some(v) => parse_f64(v, "volume", index)?,
        };

        Ok(Self {
            timestamp,
            open: parse_f64(&cols[1], "open", index)?,
            high: parse_f64(&cols[2], "high", index)?,
            low: parse_f64(&cols[3], "low", index)?,
            close: parse_f64(&cols[4], "close", index)?,
            volume,
        })
    }

    fn check(&self, index: usize) -> Result<()> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() {
                return Err(DataError::NonFinite { index, field });
            }
            if value <= 0.0 {
                return Err(DataError::NonPositivePrice {
                    index,
                    field,
                    value,
                });
            }
        }

        if !self.volume.is_finite() {
            return Err(DataError::NonFinite {
                index,
                field: "volume",
            });
        }
        if self.volume < 0.0 {
            return Err(DataError::NegativeVolume {
                index,
                value: self.volume,
            });
        }

        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || self.high < body_high {
            return Err(DataError::InconsistentCandle { index });
        }

        Ok(())
    }
}

/// Rows carry numeric values either as JSON numbers or as strings.
fn parse_f64(val: &serde_json::Value, field: &'static str, index: usize) -> Result<f64> {
    match val {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| DataError::MalformedRow {
            index,
            reason: format!("field {field} is not a valid f64"),
        }),
        serde_json::Value::String(s) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| DataError::MalformedRow {
                    index,
                    reason: format!("failed to parse {field} as f64: {s}"),
                })
        }
        _ => Err(DataError::MalformedRow {
            index,
            reason: format!("field {field} has unexpected JSON type"),
        }),
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, column-split view of one asset's history
// ---------------------------------------------------------------------------

/// A validated, ascending-time series of candles.
///
/// Construction is the only validation point: once a `PriceSeries` exists,
/// every downstream calculation may assume strictly ascending timestamps,
/// positive prices, non-negative volume and `low <= open/close <= high`.
/// The column arrays are aligned with `points`.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    volumes: Vec<f64>,
}

impl PriceSeries {
    /// Validate `points` and split them into per-field columns.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if let Err(e) = validate(&points) {
            warn!(error = %e, points = points.len(), "price series rejected");
            return Err(e);
        }

        let closes = points.iter().map(|p| p.close).collect();
        let highs = points.iter().map(|p| p.high).collect();
        let lows = points.iter().map(|p| p.low).collect();
        let volumes = points.iter().map(|p| p.volume).collect();

        debug!(points = points.len(), "price series normalized");

        Ok(Self {
            points,
            closes,
            highs,
            lows,
            volumes,
        })
    }

    /// Parse and validate a JSON array of provider rows.
    pub fn from_rows(rows: &[serde_json::Value]) -> Result<Self> {
        let points = rows
            .iter()
            .enumerate()
            .map(|(i, row)| PricePoint::from_row(row, i))
            .collect::<Result<Vec<_>>>()?;
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Close of the most recent point.
    pub fn last_close(&self) -> f64 {
        // A constructed series has at least two points.
        self.closes[self.closes.len() - 1]
    }
}

fn validate(points: &[PricePoint]) -> Result<()> {
    if points.len() < 2 {
        return Err(DataError::TooFewPoints { len: points.len() });
    }

    for (i, point) in points.iter().enumerate() {
        point.check(i)?;
        if i > 0 && point.timestamp <= points[i - 1].timestamp {
            return Err(DataError::NonAscendingTimestamp { index: i });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
