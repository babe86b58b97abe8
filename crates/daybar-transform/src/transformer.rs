//! Raw bar to row normalization.

use daybar_types::{NormalizedRow, RawBar};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, error, warn};

use crate::{TransformError, derive_date};

/// Decimal places kept for prices, matching `NUMERIC(12,4)`.
pub const PRICE_SCALE: u32 = 4;

/// Exclusive bound on the magnitude of a stored price (10^8).
pub const MAX_ABS_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// 2^63, the first `f64` above `i64::MAX`.
const VOLUME_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Normalizes raw bars into rows.
///
/// A batch either converts completely or fails on its first bad bar; no
/// partial output is ever returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer;

impl Transformer {
    /// Creates a new transformer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes a batch, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransformError`] encountered.
    pub fn transform(&self, bars: &[RawBar]) -> Result<Vec<NormalizedRow>, TransformError> {
        if bars.is_empty() {
            warn!(stage = "transform", "Nothing to transform, skipping");
            return Ok(Vec::new());
        }

        let rows = bars
            .iter()
            .map(|bar| self.normalize(bar))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| {
                error!(
                    ticker = %e.ticker(),
                    stage = "transform",
                    timestamp = e.timestamp(),
                    field = e.field(),
                    error = %e,
                    "Transformation failed"
                );
            })?;

        debug!(stage = "transform", count = rows.len(), "Transformed bars");
        Ok(rows)
    }

    /// Normalizes a single bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp, a price or the volume cannot be
    /// represented in the destination columns.
    pub fn normalize(&self, bar: &RawBar) -> Result<NormalizedRow, TransformError> {
        let date = derive_date(bar.timestamp).ok_or_else(|| TransformError::TimestampOutOfRange {
            ticker: bar.ticker.clone(),
            timestamp: bar.timestamp,
        })?;

        Ok(NormalizedRow {
            ticker: bar.ticker.clone(),
            date,
            open: price(bar, "open", bar.open)?,
            high: price(bar, "high", bar.high)?,
            low: price(bar, "low", bar.low)?,
            close: price(bar, "close", bar.close)?,
            volume: volume(bar)?,
        })
    }
}

fn price(bar: &RawBar, field: &'static str, value: f64) -> Result<Decimal, TransformError> {
    if !value.is_finite() {
        return Err(TransformError::NonFinite {
            ticker: bar.ticker.clone(),
            timestamp: bar.timestamp,
            field,
        });
    }

    let out_of_range = || TransformError::PriceOutOfRange {
        ticker: bar.ticker.clone(),
        timestamp: bar.timestamp,
        field,
        value,
    };

    let mut rounded = Decimal::try_from(value)
        .map_err(|_| out_of_range())?
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    // Checked after rounding: 99999999.99995 rounds up to 10^8
    if rounded.abs() >= MAX_ABS_PRICE {
        return Err(out_of_range());
    }
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(PRICE_SCALE);
    Ok(rounded)
}

fn volume(bar: &RawBar) -> Result<i64, TransformError> {
    let Some(value) = bar.volume else {
        return Ok(0);
    };

    if !value.is_finite() {
        return Err(TransformError::NonFinite {
            ticker: bar.ticker.clone(),
            timestamp: bar.timestamp,
            field: "volume",
        });
    }
    if value.fract() != 0.0 {
        return Err(TransformError::FractionalVolume {
            ticker: bar.ticker.clone(),
            timestamp: bar.timestamp,
            value,
        });
    }
    if value < 0.0 || value >= VOLUME_BOUND {
        return Err(TransformError::VolumeOutOfRange {
            ticker: bar.ticker.clone(),
            timestamp: bar.timestamp,
            value,
        });
    }

    Ok(value as i64)
}
