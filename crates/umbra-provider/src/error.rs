//! Provider-level error taxonomy.

use thiserror::Error;

/// Errors raised by provider lookup, execution and rate limiting.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Requested provider is not registered
    #[error("provider {provider_id} not found in registry")]
    NotFound {
        /// Provider identifier
        provider_id: String,
    },

    /// Provider call exceeded its timeout
    #[error("provider {provider_id} timed out after {timeout_secs}s")]
    Timeout {
        /// Provider identifier
        provider_id: String,
        /// Timeout that was exceeded, in seconds
        timeout_secs: f64,
    },

    /// Provider rate limit exceeded (HTTP 429)
    #[error("rate limit exceeded for provider {provider_id}")]
    RateLimited {
        /// Provider identifier
        provider_id: String,
        /// Suggested wait before retrying, in seconds
        retry_after_secs: Option<u64>,
    },

    /// Provider authentication failed (HTTP 401)
    #[error("authentication failed for provider {provider_id}")]
    Auth {
        /// Provider identifier
        provider_id: String,
    },

    /// Generic provider failure
    #[error("[{provider_id}] {message}")]
    Failed {
        /// Provider identifier
        provider_id: String,
        /// Failure description
        message: String,
        /// HTTP status code, when one was observed
        status_code: Option<u16>,
    },
}

impl ProviderError {
    /// The provider this error belongs to.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        match self {
            Self::NotFound { provider_id }
            | Self::Timeout { provider_id, .. }
            | Self::RateLimited { provider_id, .. }
            | Self::Auth { provider_id }
            | Self::Failed { provider_id, .. } => provider_id,
        }
    }

    /// HTTP status code associated with this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Auth { .. } => Some(401),
            Self::Failed { status_code, .. } => *status_code,
            Self::NotFound { .. } | Self::Timeout { .. } => None,
        }
    }
}

/// Result type alias using `ProviderError`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Timeout {
            provider_id: "dns".to_string(),
            timeout_secs: 30.0,
        };
        assert_eq!(err.to_string(), "provider dns timed out after 30s");

        let err = ProviderError::Failed {
            provider_id: "virustotal".to_string(),
            message: "quota exhausted".to_string(),
            status_code: Some(403),
        };
        assert_eq!(err.to_string(), "[virustotal] quota exhausted");
    }

    #[test]
    fn test_status_codes() {
        let rate = ProviderError::RateLimited {
            provider_id: "vt".to_string(),
            retry_after_secs: None,
        };
        assert_eq!(rate.status_code(), Some(429));

        let auth = ProviderError::Auth {
            provider_id: "vt".to_string(),
        };
        assert_eq!(auth.status_code(), Some(401));

        let missing = ProviderError::NotFound {
            provider_id: "vt".to_string(),
        };
        assert_eq!(missing.status_code(), None);
        assert_eq!(missing.provider_id(), "vt");
    }
}
