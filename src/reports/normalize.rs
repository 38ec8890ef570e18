//! Coercion of loosely typed client input into the store's strict representation.
//!
//! Each function takes the raw value of one field and either returns the typed value
//! or a `Validation` error naming that field. Nothing here touches store state.

use super::error::{StoreError, StoreResult};
use super::types::{LooseValue, ReportId};
use chrono::DateTime;

pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

pub fn latitude(value: Option<&LooseValue>) -> StoreResult<f64> {
    coordinate("lat", value, LAT_RANGE)
}

pub fn longitude(value: Option<&LooseValue>) -> StoreResult<f64> {
    coordinate("lon", value, LON_RANGE)
}

fn coordinate(
    field: &'static str,
    value: Option<&LooseValue>,
    (min, max): (f64, f64),
) -> StoreResult<f64> {
    let number = match value {
        None => return Err(StoreError::validation(field, "missing")),
        Some(LooseValue::Number(n)) => *n,
        Some(LooseValue::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| StoreError::validation(field, format!("`{}` is not a number", text)))?,
        Some(LooseValue::Bool(_)) => {
            return Err(StoreError::validation(field, "expected a number, got a boolean"));
        }
        Some(LooseValue::Other(_)) => {
            return Err(StoreError::validation(field, "expected a number"));
        }
    };

    if !number.is_finite() {
        return Err(StoreError::validation(field, "must be a finite number"));
    }
    if number < min || number > max {
        return Err(StoreError::validation(
            field,
            format!("{} is outside [{}, {}]", number, min, max),
        ));
    }

    Ok(number)
}

/// Accepts JSON booleans and the words `true`/`false` in any letter case.
pub fn resolved(value: Option<&LooseValue>) -> StoreResult<bool> {
    match value {
        None => Err(StoreError::validation("resolved", "missing")),
        Some(LooseValue::Bool(b)) => Ok(*b),
        Some(LooseValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(StoreError::validation(
                    "resolved",
                    format!("`{}` is not true or false", text),
                ))
            }
        }
        Some(LooseValue::Number(_)) => Err(StoreError::validation(
            "resolved",
            "expected a boolean, got a number",
        )),
        Some(LooseValue::Other(_)) => Err(StoreError::validation("resolved", "expected a boolean")),
    }
}

/// Validates an RFC 3339 timestamp and returns it unchanged.
pub fn timestamp(value: Option<&LooseValue>) -> StoreResult<String> {
    match value {
        None => Err(StoreError::validation("time", "missing")),
        Some(LooseValue::Text(text)) => {
            DateTime::parse_from_rfc3339(text).map_err(|e| {
                StoreError::validation("time", format!("`{}` is not ISO-8601: {}", text, e))
            })?;
            Ok(text.clone())
        }
        Some(_) => Err(StoreError::validation("time", "expected ISO-8601 text")),
    }
}

/// Resolves a client-supplied id. Anything that cannot name a report is `NotFound`,
/// since ids are opaque to clients.
pub fn report_id(value: Option<&LooseValue>) -> StoreResult<ReportId> {
    match value {
        None => Err(StoreError::validation("id", "missing")),
        Some(LooseValue::Text(text)) => text.parse().map_err(|_| StoreError::NotFound {
            id: text.clone(),
        }),
        Some(LooseValue::Number(n)) if n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64 => {
            Ok(ReportId(*n as u64))
        }
        Some(LooseValue::Number(n)) => Err(StoreError::NotFound { id: n.to_string() }),
        Some(LooseValue::Bool(_)) | Some(LooseValue::Other(_)) => {
            Err(StoreError::validation("id", "expected an id"))
        }
    }
}
