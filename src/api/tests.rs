//! Report API Tests
//!
//! Drives the real router over HTTP on an ephemeral port.
//!
//! ## Test Scopes
//! - **Contract**: Paths, status codes and body shapes of `/store`, `/getall`, `/update`.
//! - **Error mapping**: Validation -> 400, NotFound -> 404, Unavailable -> 503.
//! - **Client**: `ReportClient` against a live server, including concurrent creates.

#[cfg(test)]
mod tests {
    use crate::api::handlers::{error_response, is_server_fault};
    use crate::api::protocol::{ENDPOINT_GET_ALL, ENDPOINT_STORE, ENDPOINT_UPDATE};
    use crate::api::router;
    use crate::client::{ClientError, ReportClient};
    use crate::reports::error::StoreError;
    use crate::reports::store::ReportStore;
    use crate::reports::types::{NewReport, ReportId, StatusUpdate};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    const TIME: &str = "2024-01-01T00:00:00Z";

    async fn spawn_server(store: Arc<ReportStore>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(store);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    // ============================================================
    // WIRE CONTRACT
    // ============================================================

    #[tokio::test]
    async fn test_scenario_over_http() {
        let base = spawn_server(Arc::new(ReportStore::in_memory())).await;
        let http = reqwest::Client::new();

        let resp = http
            .post(format!("{}{}", base, ENDPOINT_STORE))
            .json(&json!({"lat": "40.0", "lon": "-75.0", "resolved": "false", "time": TIME}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["id"], "1");

        let list: Value = http
            .get(format!("{}{}", base, ENDPOINT_GET_ALL))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            list,
            json!({"data": [{"id": "1", "lat": 40.0, "lon": -75.0, "time": TIME, "resolved": false}]})
        );

        let resp = http
            .post(format!("{}{}", base, ENDPOINT_UPDATE))
            .json(&json!({"id": "1", "resolved": "true"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert!(body["message"].is_string());

        let list: Value = http
            .get(format!("{}{}", base, ENDPOINT_GET_ALL))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            list,
            json!({"data": [{"id": "1", "lat": 40.0, "lon": -75.0, "time": TIME, "resolved": true}]})
        );
    }

    #[tokio::test]
    async fn test_getall_envelope_when_empty() {
        let base = spawn_server(Arc::new(ReportStore::in_memory())).await;
        let body: Value = reqwest::get(format!("{}{}", base, ENDPOINT_GET_ALL))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_store_rejects_out_of_range_with_field_name() {
        let store = Arc::new(ReportStore::in_memory());
        let base = spawn_server(store.clone()).await;

        let resp = reqwest::Client::new()
            .post(format!("{}{}", base, ENDPOINT_STORE))
            .json(&json!({"lat": 120, "lon": 0, "resolved": false, "time": TIME}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["field"], "lat");
        assert!(body["error"].is_string());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_rejects_missing_fields() {
        let base = spawn_server(Arc::new(ReportStore::in_memory())).await;

        let resp = reqwest::Client::new()
            .post(format!("{}{}", base, ENDPOINT_STORE))
            .json(&json!({"lat": 1, "lon": 2, "resolved": false}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["field"], "time");
    }

    #[tokio::test]
    async fn test_malformed_json_gets_error_envelope() {
        let base = spawn_server(Arc::new(ReportStore::in_memory())).await;

        let resp = reqwest::Client::new()
            .post(format!("{}{}", base, ENDPOINT_STORE))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_structured_field_values_name_the_field() {
        let store = Arc::new(ReportStore::in_memory());
        let base = spawn_server(store.clone()).await;
        let http = reqwest::Client::new();

        let resp = http
            .post(format!("{}{}", base, ENDPOINT_STORE))
            .json(&json!({"lat": {}, "lon": 0, "resolved": false, "time": TIME}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["field"], "lat");

        let resp = http
            .post(format!("{}{}", base, ENDPOINT_STORE))
            .json(&json!({"lat": 1, "lon": 0, "resolved": [true], "time": TIME}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["field"], "resolved");

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_404() {
        let store = Arc::new(ReportStore::in_memory());
        store.create(NewReport::new(1.0, 1.0, false, TIME)).unwrap();
        let base = spawn_server(store.clone()).await;

        let resp = reqwest::Client::new()
            .post(format!("{}{}", base, ENDPOINT_UPDATE))
            .json(&json!({"id": "42", "resolved": true}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].is_string());
        assert!(body.get("field").is_none());
        assert!(!store.get(ReportId(1)).unwrap().resolved);
    }

    #[tokio::test]
    async fn test_getall_on_shut_down_store_is_503() {
        let store = Arc::new(ReportStore::in_memory());
        let base = spawn_server(store.clone()).await;
        store.shutdown().unwrap();

        let resp = reqwest::get(format!("{}{}", base, ENDPOINT_GET_ALL))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_only_unavailability_is_a_server_fault() {
        assert!(is_server_fault(&StoreError::Unavailable("disk".to_string())));
        assert!(!is_server_fault(&StoreError::validation("lat", "bad")));
        assert!(!is_server_fault(&StoreError::NotFound { id: "3".to_string() }));
    }

    #[test]
    fn test_error_mapping_is_deterministic() {
        let (status, body) = error_response(&StoreError::validation("lon", "bad"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.field.as_deref(), Some("lon"));

        let (status, _) = error_response(&StoreError::NotFound { id: "9".to_string() });
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = error_response(&StoreError::Unavailable("disk".to_string()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.field, None);
    }

    // ============================================================
    // CLIENT
    // ============================================================

    #[tokio::test]
    async fn test_client_roundtrip() {
        let base = spawn_server(Arc::new(ReportStore::in_memory())).await;
        let client = ReportClient::new(&base);

        let stored = client
            .store(&NewReport::new("-33.8688", "151.2093", "False", TIME))
            .await
            .unwrap();
        assert_eq!(stored.report.lat, -33.8688);
        assert!(!stored.report.resolved);

        let updated = client
            .update(&StatusUpdate::new(stored.id.to_string(), true))
            .await
            .unwrap();
        assert!(updated.report.resolved);

        let all = client.get_all().await.unwrap();
        assert_eq!(all, vec![updated.report]);

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.reports, 1);
    }

    #[tokio::test]
    async fn test_client_surfaces_api_errors() {
        let base = spawn_server(Arc::new(ReportStore::in_memory())).await;
        let client = ReportClient::new(&base);

        match client.update(&StatusUpdate::new("7", "true")).await {
            Err(ClientError::Api { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {:?}", other),
        }

        match client.store(&NewReport::new(0.0, 0.0, "perhaps", TIME)).await {
            Err(ClientError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body.field.as_deref(), Some("resolved"));
            }
            other => panic!("expected 400, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_gives_up_after_configured_attempts() {
        // reserve a port, then close it so connections are refused
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReportClient::new(&format!("http://{}", addr))
            .with_retries(2, Duration::from_millis(500));

        match client.get_all().await {
            Err(ClientError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other),
        }
        match client.store(&NewReport::new(1.0, 1.0, false, TIME)).await {
            Err(ClientError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_over_http() {
        let store = Arc::new(ReportStore::in_memory());
        let base = spawn_server(store.clone()).await;
        let client = Arc::new(ReportClient::new(&base));

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .store(&NewReport::new(i as f64 / 2.0, -(i as f64), "false", TIME))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 100);
        assert_eq!(client.get_all().await.unwrap().len(), 100);
    }
}
