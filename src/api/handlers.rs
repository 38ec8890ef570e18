use super::protocol::{ErrorResponse, HealthResponse, ListResponse, StoreResponse, UpdateResponse};
use crate::reports::error::StoreError;
use crate::reports::store::ReportStore;
use crate::reports::types::{NewReport, StatusUpdate};

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use std::sync::Arc;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps each store error kind to exactly one status code.
pub fn error_response(err: &StoreError) -> ApiError {
    let status = match err {
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            field: err.field().map(str::to_string),
        }),
    )
}

/// Unavailability is a server fault; bad input and unknown ids are the caller's.
pub fn is_server_fault(err: &StoreError) -> bool {
    matches!(err, StoreError::Unavailable(_))
}

fn log_failure(action: &str, err: &StoreError) {
    if is_server_fault(err) {
        tracing::error!("Failed to {}: {}", action, err);
    } else {
        tracing::warn!("Failed to {}: {}", action, err);
    }
}

fn rejection_response(rejection: JsonRejection) -> ApiError {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    (
        rejection.status(),
        Json(ErrorResponse {
            error: rejection.body_text(),
            field: None,
        }),
    )
}

pub async fn handle_store(
    Extension(store): Extension<Arc<ReportStore>>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> Result<(StatusCode, Json<StoreResponse>), ApiError> {
    let Json(req) = payload.map_err(rejection_response)?;

    match store.create(req) {
        Ok(report) => Ok((
            StatusCode::CREATED,
            Json(StoreResponse {
                id: report.id,
                report,
            }),
        )),
        Err(e) => {
            log_failure("store report", &e);
            Err(error_response(&e))
        }
    }
}

pub async fn handle_get_all(
    Extension(store): Extension<Arc<ReportStore>>,
) -> Result<Json<ListResponse>, ApiError> {
    match store.list_all() {
        Ok(data) => {
            tracing::debug!("Listing {} report(s)", data.len());
            Ok(Json(ListResponse { data }))
        }
        Err(e) => {
            log_failure("list reports", &e);
            Err(error_response(&e))
        }
    }
}

pub async fn handle_update(
    Extension(store): Extension<Arc<ReportStore>>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let Json(req) = payload.map_err(rejection_response)?;

    match store.update_status(req) {
        Ok(report) => Ok(Json(UpdateResponse {
            message: format!("Report {} updated", report.id),
            report,
        })),
        Err(e) => {
            log_failure("update report", &e);
            Err(error_response(&e))
        }
    }
}

pub async fn handle_health(
    Extension(store): Extension<Arc<ReportStore>>,
) -> Result<Json<HealthResponse>, ApiError> {
    store.ensure_open().map_err(|e| error_response(&e))?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        reports: store.len(),
    }))
}
