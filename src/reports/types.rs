use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Store-assigned identifier of a report.
///
/// Allocated from a per-store sequence starting at 1. On the wire it is always a
/// string, so clients can treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId(pub u64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("`{0}` is not a report id")]
pub struct InvalidReportId(pub String);

impl FromStr for ReportId {
    type Err = InvalidReportId;

    /// Only the canonical decimal form names a report; `"01"`, `"+1"` or `" 1"` do not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => Ok(ReportId(n)),
            _ => Err(InvalidReportId(s.to_string())),
        }
    }
}

impl Serialize for ReportId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single water-problem record.
///
/// Every field is strictly typed. `id`, `lat`, `lon` and `time` are write-once;
/// only `resolved` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub lat: f64,
    pub lon: f64,
    /// Creation timestamp exactly as the client supplied it (validated RFC 3339).
    pub time: String,
    pub resolved: bool,
}

/// A loosely typed field value as sent by a client.
///
/// Mobile forms send everything as text, other clients send proper JSON types.
/// The store decides what each field may be coerced into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Objects, arrays and anything else; never coercible, rejected per field.
    Other(serde_json::Value),
}

impl From<bool> for LooseValue {
    fn from(value: bool) -> Self {
        LooseValue::Bool(value)
    }
}

impl From<f64> for LooseValue {
    fn from(value: f64) -> Self {
        LooseValue::Number(value)
    }
}

impl From<&str> for LooseValue {
    fn from(value: &str) -> Self {
        LooseValue::Text(value.to_string())
    }
}

impl From<String> for LooseValue {
    fn from(value: String) -> Self {
        LooseValue::Text(value)
    }
}

/// Raw input of a create call. Missing fields are `None` and rejected by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReport {
    pub lat: Option<LooseValue>,
    pub lon: Option<LooseValue>,
    pub resolved: Option<LooseValue>,
    pub time: Option<LooseValue>,
}

impl NewReport {
    pub fn new(
        lat: impl Into<LooseValue>,
        lon: impl Into<LooseValue>,
        resolved: impl Into<LooseValue>,
        time: impl Into<LooseValue>,
    ) -> Self {
        Self {
            lat: Some(lat.into()),
            lon: Some(lon.into()),
            resolved: Some(resolved.into()),
            time: Some(time.into()),
        }
    }
}

/// Raw input of a status update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: Option<LooseValue>,
    pub resolved: Option<LooseValue>,
}

impl StatusUpdate {
    pub fn new(id: impl Into<LooseValue>, resolved: impl Into<LooseValue>) -> Self {
        Self {
            id: Some(id.into()),
            resolved: Some(resolved.into()),
        }
    }
}
