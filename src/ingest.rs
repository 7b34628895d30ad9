//! Normalizes raw feed rows into canonical [`Tick`]s.
//!
//! A malformed row yields a [`ScreenerError::MalformedTick`] naming the
//! offending field; callers log it and keep consuming the stream.

use crate::error::ScreenerError;
use crate::feed::types::OkxTickerRow;
use crate::model::tick::Tick;

fn malformed(field: &'static str, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::MalformedTick {
        field,
        reason: reason.into(),
    }
}

fn parse_non_negative(raw: Option<&str>, field: &'static str) -> Result<f64, ScreenerError> {
    let s = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(field, "missing"))?;
    let value: f64 = s
        .parse()
        .map_err(|_| malformed(field, format!("not a number: '{}'", s)))?;
    if !value.is_finite() {
        return Err(malformed(field, "not finite"));
    }
    if value < 0.0 {
        return Err(malformed(field, format!("negative: {}", value)));
    }
    Ok(value)
}

/// Validate a raw ticker row and produce a canonical tick.
pub fn normalize(raw: &OkxTickerRow) -> Result<Tick, ScreenerError> {
    let symbol = raw
        .inst_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("instId", "missing or empty"))?;
    let price = parse_non_negative(raw.last.as_deref(), "last")?;
    let volume = parse_non_negative(raw.vol24h.as_deref(), "vol24h")?;
    let observed_at_ms: u64 = raw
        .ts
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("ts", "missing"))?
        .parse()
        .map_err(|_| malformed("ts", "not a millisecond timestamp"))?;

    Ok(Tick::new(symbol, price, volume, observed_at_ms))
}
