//! Report API Protocol
//!
//! Endpoint paths and the JSON bodies of the report API. Request bodies are the raw
//! store inputs (`NewReport`, `StatusUpdate`) since every field is loosely typed on
//! the wire; responses always carry fully normalized `Report`s.

use crate::reports::types::{Report, ReportId};
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Create a report: body `{lat, lon, resolved, time}`.
pub const ENDPOINT_STORE: &str = "/store";
/// List every report in creation order.
pub const ENDPOINT_GET_ALL: &str = "/getall";
/// Change the resolution flag of a report: body `{id, resolved}`.
pub const ENDPOINT_UPDATE: &str = "/update";
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Responses ---

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreResponse {
    pub id: ReportId,
    pub report: Report,
}

/// Envelope for the report list, so the shape is the same when the list is empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<Report>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub message: String,
    pub report: Report,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub reports: usize,
}

/// Body of every non-success response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending field, present on validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
