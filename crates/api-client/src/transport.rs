//! Single-endpoint request execution and envelope decoding
//!
//! Every tikwm operation is a `POST {endpoint}[/{path}]?query` with no body,
//! answered by the same JSON envelope:
//!
//! ```json
//! {"code": 0, "msg": "success", "processed_time": 0.12, "data": {}}
//! ```
//!
//! [`HttpTransport::issue`] performs exactly one such exchange against one
//! endpoint and classifies the outcome. Failover and throttling live one
//! layer up, in [`crate::client`].

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Query parameters of one upstream call
pub type Query = BTreeMap<&'static str, String>;

/// Uniform upstream response wrapper
///
/// Decoded with a raw `data` first so that error envelopes, whose `data` may
/// be any shape, never fail on the payload type.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T = Value> {
    /// `0` on success
    #[serde(default)]
    pub code: i64,
    /// Human readable status
    #[serde(default, rename = "msg")]
    pub message: String,
    /// Upstream processing time in seconds
    #[serde(default)]
    pub processed_time: f64,
    /// Payload, absent or null on errors and empty results
    pub data: Option<T>,
}

/// Label used for an operation path in logs and errors
#[must_use]
pub fn operation_label(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Build the request URL for `path` on `endpoint`
pub fn request_url(endpoint: &str, path: &str) -> ApiResult<Url> {
    let base = endpoint.trim_end_matches('/');
    let raw = if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{}", path.trim_start_matches('/'))
    };

    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

/// Decode an envelope body and unwrap its payload
///
/// A null or missing `data` yields `T::default()`.
pub fn decode_envelope<T>(body: &[u8], path: &str, query: &Query) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    let decode_error = |source| ApiError::Decode {
        operation: operation_label(path).to_string(),
        source,
    };

    let envelope: Envelope = serde_json::from_slice(body).map_err(decode_error)?;

    if envelope.code != 0 {
        let query = serde_json::to_string(query).unwrap_or_else(|_| "???".to_string());
        return Err(ApiError::upstream(
            envelope.code,
            envelope.message,
            operation_label(path),
            query,
        ));
    }

    match envelope.data {
        None | Some(Value::Null) => Ok(T::default()),
        Some(data) => serde_json::from_value(data).map_err(decode_error),
    }
}

/// reqwest-backed executor for single upstream calls
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
}

impl HttpTransport {
    /// Build the underlying HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let inner = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    /// Issue one call against one endpoint
    pub async fn issue<T>(&self, endpoint: &str, path: &str, query: &Query) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let request_id = Uuid::new_v4().to_string();
        let operation = operation_label(path);
        info!(
            request_id = %request_id,
            operation,
            endpoint,
            query = ?query,
            "tikwm request"
        );

        let url = request_url(endpoint, path).inspect_err(|e| {
            warn!(request_id = %request_id, operation, endpoint, error = %e, "Invalid request URL");
        })?;

        let response = self
            .inner
            .post(url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .inspect_err(|e| {
                warn!(request_id = %request_id, operation, endpoint, error = %e, "Request failed");
            })?;

        let body = response.bytes().await.inspect_err(|e| {
            warn!(request_id = %request_id, operation, endpoint, error = %e, "Failed to read body");
        })?;

        decode_envelope(&body, path, query).inspect_err(|e| {
            warn!(request_id = %request_id, operation, endpoint, error = %e, "Upstream call failed");
        })
    }
}
