//! Report HTTP API
//!
//! Stateless axum layer over `ReportStore`. Handlers only parse requests and shape
//! responses; all validation and normalization happen inside the store, so another
//! front end can reuse the same semantics.
//!
//! ## Submodules
//! - **`handlers`**: Axum handlers and the store-error to HTTP mapping.
//! - **`protocol`**: Endpoint paths and the JSON bodies exchanged with clients.

pub mod handlers;
pub mod protocol;

#[cfg(test)]
mod tests;

use crate::reports::store::ReportStore;
use axum::{
    Extension, Router,
    routing::{get, post},
};
use handlers::{handle_get_all, handle_health, handle_store, handle_update};
use protocol::{ENDPOINT_GET_ALL, ENDPOINT_HEALTH, ENDPOINT_STORE, ENDPOINT_UPDATE};
use std::sync::Arc;

pub fn router(store: Arc<ReportStore>) -> Router {
    Router::new()
        .route(ENDPOINT_STORE, post(handle_store))
        .route(ENDPOINT_GET_ALL, get(handle_get_all))
        .route(ENDPOINT_UPDATE, post(handle_update))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(store))
}
