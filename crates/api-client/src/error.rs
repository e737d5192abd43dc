//! Error types for the API client

use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The endpoint could not be reached or the HTTP exchange failed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not a valid envelope
    #[error("failed to decode `{operation}` response: {source}")]
    Decode {
        /// Operation path that produced the body
        operation: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The upstream answered with a non-zero envelope code
    #[error("tikwm error: {message} ({code}) [{operation}, query: {query}]")]
    Upstream {
        /// Envelope code
        code: i64,
        /// Envelope message
        message: String,
        /// Operation path
        operation: String,
        /// JSON rendering of the query that was sent
        query: String,
    },

    /// Every endpoint failed; only the last failure is kept
    #[error("all {attempted} endpoints failed, last error: {last}")]
    EndpointsExhausted {
        /// Number of endpoints tried
        attempted: usize,
        /// Error from the last endpoint tried
        #[source]
        last: Box<ApiError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an upstream error
    pub fn upstream(
        code: i64,
        message: impl Into<String>,
        operation: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            code,
            message: message.into(),
            operation: operation.into(),
            query: query.into(),
        }
    }

    /// The error that ended the call, looking through `EndpointsExhausted`
    #[must_use]
    pub fn last_error(&self) -> &ApiError {
        match self {
            Self::EndpointsExhausted { last, .. } => last.last_error(),
            other => other,
        }
    }

    /// Upstream envelope code, if the call ended on an upstream error
    #[must_use]
    pub fn upstream_code(&self) -> Option<i64> {
        match self.last_error() {
            Self::Upstream { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if the call ended on a network failure
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.last_error(), Self::Transport(_))
    }

    /// Check if the call ended on an undecodable body
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.last_error(), Self::Decode { .. })
    }
}
