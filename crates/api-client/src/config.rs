//! Configuration for the tikwm API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Canonical tikwm API endpoint
pub const DEFAULT_URL: &str = "https://tikwm.com/api";

/// Minimum spacing between two upstream calls
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1_100);

/// Page size used when walking a user feed
pub const DEFAULT_FEED_PAGE_SIZE: u32 = 33;

/// Extra endpoint tried before the canonical one
pub const ENV_PROXY_URL: &str = "TIKWM_PROXY_URL";

const ENV_MIN_INTERVAL_MS: &str = "TIKWM_MIN_INTERVAL_MS";
const ENV_TIMEOUT_SECS: &str = "TIKWM_TIMEOUT_SECS";
const ENV_FEED_PAGE_SIZE: &str = "TIKWM_FEED_PAGE_SIZE";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Candidate base URLs, tried in order for every call
    pub endpoints: Vec<String>,
    /// Minimum spacing between call starts; `None` disables throttling
    #[serde(with = "millis_serde")]
    pub min_interval: Option<Duration>,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Items requested per feed page when paginating
    pub feed_page_size: u32,
    /// User agent sent upstream
    pub user_agent: String,
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        duration
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_URL.to_string()],
            min_interval: Some(DEFAULT_MIN_INTERVAL),
            timeout: Duration::from_secs(30),
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
            user_agent: concat!("tikwm-api-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> ApiResult<Option<T>> {
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ApiError::config(format!("{name} must be an integer, got '{raw}'")))
        })
        .transpose()
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `TIKWM_PROXY_URL`: endpoint prepended to the default list
    /// - `TIKWM_MIN_INTERVAL_MS`: throttle interval, `0` disables throttling
    /// - `TIKWM_TIMEOUT_SECS`: request timeout in seconds
    /// - `TIKWM_FEED_PAGE_SIZE`: page size used by the feed paginator
    ///
    /// A variable that is set but not an integer is a `Config` error.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(env_var)
    }

    /// Apply the interval, timeout and page size variables, leaving the
    /// endpoint list untouched
    pub fn with_env_tuning(self) -> ApiResult<Self> {
        self.apply_tuning(env_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let mut config = Self::default();

        if let Some(proxy) = lookup(ENV_PROXY_URL).filter(|url| !url.is_empty()) {
            config.endpoints.insert(0, proxy);
        }

        let config = config.apply_tuning(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_tuning(mut self, lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        if let Some(millis) = parse_var::<u64>(&lookup, ENV_MIN_INTERVAL_MS)? {
            self.min_interval = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS)? {
            self.timeout = Duration::from_secs(secs);
        }

        if let Some(size) = parse_var::<u32>(&lookup, ENV_FEED_PAGE_SIZE)? {
            self.feed_page_size = size;
        }

        Ok(self)
    }

    /// Builder-style method to replace the endpoint list
    #[must_use]
    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style method to put an endpoint in front of the list
    #[must_use]
    pub fn with_override(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoints.insert(0, endpoint.into());
        self
    }

    /// Builder-style method to set the throttle interval
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Builder-style method to disable throttling
    #[must_use]
    pub fn without_throttle(mut self) -> Self {
        self.min_interval = None;
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the paginator page size
    #[must_use]
    pub fn with_feed_page_size(mut self, size: u32) -> Self {
        self.feed_page_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.endpoints.is_empty() {
            return Err(ApiError::config("endpoint list cannot be empty"));
        }

        for endpoint in &self.endpoints {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ApiError::config(format!(
                    "endpoint must start with http:// or https://: {endpoint}"
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.feed_page_size == 0 {
            return Err(ApiError::config("feed page size cannot be zero"));
        }

        Ok(())
    }
}
