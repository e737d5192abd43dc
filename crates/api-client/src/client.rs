//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{PostsApi, UsersApi};
use crate::error::{ApiError, ApiResult};
use crate::middleware::Throttle;
use crate::transport::{operation_label, HttpTransport, Query};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// tikwm API client with endpoint failover and call throttling
///
/// This client wraps `reqwest` and adds:
/// - Failover across an ordered list of candidate endpoints
/// - A minimum interval between call starts, shared by every clone
///
/// Cloning is cheap and clones share the same throttle. Two clients built
/// separately throttle independently.
#[derive(Debug, Clone)]
pub struct TikwmClient {
    transport: HttpTransport,
    config: Arc<ClientConfig>,
    throttle: Option<Arc<Throttle>>,
}

impl TikwmClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a client that issues calls through `transport`
    pub fn with_transport(config: ClientConfig, transport: HttpTransport) -> ApiResult<Self> {
        config.validate()?;

        let throttle = config.min_interval.map(|interval| Arc::new(Throttle::new(interval)));

        Ok(Self {
            transport,
            config: Arc::new(config),
            throttle,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Candidate endpoints in the order they are tried
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.config.endpoints
    }

    /// Whether calls are spaced by a throttle
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.throttle.is_some()
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access post endpoints
    #[must_use]
    pub fn posts(&self) -> PostsApi {
        PostsApi::new(self.clone())
    }

    /// Access user endpoints
    #[must_use]
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level request with failover
    // -------------------------------------------------------------------------

    /// Issue `path` with `query`, trying each endpoint in order
    ///
    /// Returns the first successful payload. When every endpoint fails the
    /// error carries only the failure of the last endpoint tried.
    #[instrument(skip(self, query), fields(operation = operation_label(path)))]
    pub async fn request<T>(&self, path: &str, query: &Query) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let mut last_error: Option<ApiError> = None;

        for (attempt, endpoint) in self.config.endpoints.iter().enumerate() {
            let _permit = match &self.throttle {
                Some(throttle) => Some(throttle.acquire().await),
                None => None,
            };

            match self.transport.issue(endpoint, path, query).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(
                        endpoint = %endpoint,
                        attempt = attempt + 1,
                        error = %e,
                        "Endpoint failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        let attempted = self.config.endpoints.len();
        let last = last_error.unwrap_or_else(|| ApiError::config("endpoint list cannot be empty"));
        warn!(attempted, error = %last, "All endpoints failed");

        Err(ApiError::EndpointsExhausted {
            attempted,
            last: Box::new(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = TikwmClient::with_config(ClientConfig::default());
        assert!(client.is_ok());
        assert!(client.unwrap().is_throttled());
    }

    #[test]
    fn test_rejects_empty_endpoint_list() {
        let config = ClientConfig::default().with_endpoints(Vec::<String>::new());
        assert!(matches!(TikwmClient::with_config(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_unthrottled_client() {
        let config = ClientConfig::default().without_throttle();
        let client = TikwmClient::with_config(config).unwrap();
        assert!(!client.is_throttled());
    }

    #[test]
    fn test_clones_share_throttle() {
        let config = ClientConfig::default().with_min_interval(Duration::from_millis(10));
        let client = TikwmClient::with_config(config).unwrap();
        let clone = client.clone();

        let a = client.throttle.as_ref().unwrap();
        let b = clone.throttle.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));

        let other = TikwmClient::with_config(ClientConfig::default()).unwrap();
        assert!(!Arc::ptr_eq(a, other.throttle.as_ref().unwrap()));
    }

    #[tokio::test]
    async fn test_unreachable_endpoints_exhaust() {
        let config = ClientConfig::default()
            .with_endpoints(["http://127.0.0.1:1", "http://127.0.0.1:1/api"])
            .without_throttle()
            .with_timeout(Duration::from_secs(2));
        let client = TikwmClient::with_config(config).unwrap();

        let err = client
            .request::<serde_json::Value>("user/info", &Query::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::EndpointsExhausted { attempted: 2, .. }));
        assert!(err.is_transport());
    }
}
