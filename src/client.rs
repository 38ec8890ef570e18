//! HTTP client for the report API.
//!
//! Speaks the same contract as the mobile app. Transport failures are retried with
//! exponential backoff and jitter; API error responses are returned as they are,
//! since the server never retries and neither should a well-behaved caller on a 4xx.

use crate::api::protocol::{
    ENDPOINT_GET_ALL, ENDPOINT_HEALTH, ENDPOINT_STORE, ENDPOINT_UPDATE, ErrorResponse,
    HealthResponse, ListResponse, StoreResponse, UpdateResponse,
};
use crate::reports::types::{NewReport, Report, StatusUpdate};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);
const DEFAULT_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {status}: {}", .body.error)]
    Api { status: u16, body: ErrorResponse },
}

pub struct ReportClient {
    base_url: String,
    http_client: reqwest::Client,
    timeout: Duration,
    attempts: usize,
}

impl ReportClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    pub fn with_retries(mut self, attempts: usize, timeout: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.timeout = timeout;
        self
    }

    pub async fn store(&self, report: &NewReport) -> Result<StoreResponse, ClientError> {
        self.post(ENDPOINT_STORE, report).await
    }

    pub async fn get_all(&self) -> Result<Vec<Report>, ClientError> {
        let list: ListResponse = self.get(ENDPOINT_GET_ALL).await?;
        Ok(list.data)
    }

    pub async fn update(&self, update: &StatusUpdate) -> Result<UpdateResponse, ClientError> {
        self.post(ENDPOINT_UPDATE, update).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get(ENDPOINT_HEALTH).await
    }

    async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<R, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut delay_ms = 150u64;

        let mut attempt = 0;
        loop {
            let response = self
                .http_client
                .post(url.clone())
                .json(payload)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return decode(resp).await,
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(e.into());
                    }
                    tracing::debug!("POST {} failed (attempt {}): {}", url, attempt, e);
                    backoff(&mut delay_ms).await;
                }
            }
        }
    }

    async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut delay_ms = 150u64;

        let mut attempt = 0;
        loop {
            let response = self
                .http_client
                .get(url.clone())
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return decode(resp).await,
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(e.into());
                    }
                    tracing::debug!("GET {} failed (attempt {}): {}", url, attempt, e);
                    backoff(&mut delay_ms).await;
                }
            }
        }
    }
}

async fn backoff(delay_ms: &mut u64) {
    let jitter = rand::random::<u64>() % 50;
    tokio::time::sleep(Duration::from_millis(*delay_ms + jitter)).await;
    *delay_ms = (*delay_ms * 2).min(1200);
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await?;
    let body = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => body,
        Err(_) => ErrorResponse {
            error: text,
            field: None,
        },
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}
