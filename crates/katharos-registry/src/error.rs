//! Error types for registry operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the Hub or Registry APIs.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to the service.
    #[error("Failed to connect to {url}: {source}")]
    ConnectionFailed {
        /// Target URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The request timed out.
    #[error("Request timed out: {message}")]
    Timeout {
        /// Description of the timed-out request.
        message: String,
    },

    /// Credentials were rejected.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// The service asked us to slow down.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-supplied wait duration.
        retry_after: Duration,
    },

    /// Non-success HTTP response.
    #[error("HTTP error: {status} - {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// The manifest response carried no content digest.
    #[error("No content digest in manifest response for {repository}:{tag}")]
    MissingDigest {
        /// Repository name.
        repository: String,
        /// Tag name.
        tag: String,
    },

    /// The token endpoint returned no token.
    #[error("Token endpoint returned no token for {repository}")]
    MissingToken {
        /// Repository the token was requested for.
        repository: String,
    },

    /// A URL could not be constructed.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    /// Returns true if a retry with backoff could plausibly succeed.
    ///
    /// Authentication failures and malformed responses are terminal;
    /// connection trouble, timeouts, rate limiting, and server-side
    /// errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::AuthenticationFailed { .. }
            | Self::MissingDigest { .. }
            | Self::MissingToken { .. }
            | Self::InvalidUrl { .. }
            | Self::Json { .. } => false,
        }
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::Http {
                status,
                message: err.to_string(),
            }
        } else {
            Self::Http {
                status: 0,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json { source: err }
    }
}

impl From<RegistryError> for katharos_core::Error {
    fn from(err: RegistryError) -> Self {
        Self::registry(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_is_not_retryable() {
        let err = RegistryError::AuthenticationFailed {
            message: "bad credentials".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_errors_are_retryable() {
        for status in [429, 500, 502, 503] {
            let err = RegistryError::Http {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "{status}");
        }
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        for status in [400, 403, 404] {
            let err = RegistryError::Http {
                status,
                message: String::new(),
            };
            assert!(!err.is_retryable(), "{status}");
        }
    }

    #[test]
    fn test_rate_limited_display() {
        let err = RegistryError::RateLimited {
            retry_after: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("Rate limited"));
    }

    #[test]
    fn test_core_error_conversion() {
        let err = RegistryError::Http {
            status: 503,
            message: "unavailable".to_string(),
        };
        let core: katharos_core::Error = err.into();
        assert!(core.to_string().contains("503"));
    }
}
