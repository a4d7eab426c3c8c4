//! Scan-level error taxonomy.

use thiserror::Error;
use umbra_provider::ProviderError;

/// Errors raised at the scan orchestration boundary.
///
/// Provider failures never surface here: they are converted to error
/// envelopes inside the per-provider task and folded into the merged
/// summary's `errors` map instead.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// Named profile does not exist
    #[error("invalid profile '{profile}', valid profiles: {valid}")]
    InvalidProfile {
        /// The unknown profile name
        profile: String,
        /// Comma-separated list of known profile names
        valid: String,
    },

    /// No enabled providers matched the request
    #[error("[{target}] no providers available for scan: {reason}")]
    NoProvidersAvailable {
        /// Scan target
        target: String,
        /// Why resolution came up empty
        reason: String,
    },

    /// Generic scan-level failure
    #[error("[{target}] {message}")]
    Scan {
        /// Scan target
        target: String,
        /// Failure description
        message: String,
    },

    /// Provider-level error surfaced to the caller
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result type alias using `ScanError`.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::InvalidProfile {
            profile: "warp".to_string(),
            valid: "fast, full, privacy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid profile 'warp', valid profiles: fast, full, privacy"
        );

        let err = ScanError::Scan {
            target: "example.com".to_string(),
            message: "interrupted".to_string(),
        };
        assert_eq!(err.to_string(), "[example.com] interrupted");
    }

    #[test]
    fn test_provider_error_conversion() {
        let provider_err = ProviderError::NotFound {
            provider_id: "dns".to_string(),
        };
        let scan_err: ScanError = provider_err.into();
        assert!(matches!(scan_err, ScanError::Provider(_)));
        assert_eq!(scan_err.to_string(), "provider dns not found in registry");
    }
}
