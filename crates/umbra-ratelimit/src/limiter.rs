//! Per-provider rate limiting configuration.

use crate::bucket::TokenBucket;
use std::time::Duration;
use umbra_core::RateLimitConfig;

/// One provider's token bucket plus its retry/backoff policy.
#[derive(Debug)]
pub struct ProviderRateLimiter {
    provider_id: String,
    max_retries: u32,
    backoff_factor: f64,
    bucket: TokenBucket,
}

impl ProviderRateLimiter {
    /// Create a limiter with the default policy
    /// (1 token/sec, burst of 5, 3 retries, backoff factor 2).
    #[must_use]
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self::with_config(provider_id, &RateLimitConfig::default())
    }

    /// Create a limiter from an explicit configuration.
    #[must_use]
    pub fn with_config(provider_id: impl Into<String>, config: &RateLimitConfig) -> Self {
        Self {
            provider_id: provider_id.into(),
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            bucket: TokenBucket::new(config.bucket_capacity, config.tokens_per_second),
        }
    }

    /// The provider this limiter governs.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Maximum retry attempts.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Acquire one rate-limit token, suspending until available.
    pub async fn acquire(&self) {
        self.bucket.acquire(1).await;
    }

    /// Decide whether a request should be retried.
    ///
    /// Retryable: HTTP 429, any 5xx, or an absent status (network error or
    /// timeout). Any other 4xx is terminal, as is exhausting `max_retries`.
    /// `attempt` is 0-indexed.
    #[must_use]
    pub fn should_retry(&self, status_code: Option<u16>, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        match status_code {
            Some(429) => true,
            Some(code) if (500..600).contains(&code) => true,
            Some(_) => false,
            None => true,
        }
    }

    /// Exponential backoff wait before the given 0-indexed attempt's retry:
    /// `backoff_factor ^ attempt` seconds.
    #[must_use]
    pub fn backoff_time(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        Duration::from_secs_f64(self.backoff_factor.powi(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry_rate_limit() {
        let limiter = ProviderRateLimiter::new("virustotal");

        // max_retries defaults to 3
        assert!(limiter.should_retry(Some(429), 0));
        assert!(limiter.should_retry(Some(429), 1));
        assert!(limiter.should_retry(Some(429), 2));
        assert!(!limiter.should_retry(Some(429), 3));
    }

    #[test]
    fn test_should_retry_server_errors() {
        let limiter = ProviderRateLimiter::new("whois");

        assert!(limiter.should_retry(Some(500), 0));
        assert!(limiter.should_retry(Some(503), 0));
        assert!(limiter.should_retry(Some(599), 0));
        assert!(!limiter.should_retry(Some(600), 0));
    }

    #[test]
    fn test_should_not_retry_client_errors() {
        let limiter = ProviderRateLimiter::new("whois");

        assert!(!limiter.should_retry(Some(404), 0));
        assert!(!limiter.should_retry(Some(401), 0));
        assert!(!limiter.should_retry(Some(200), 0));
    }

    #[test]
    fn test_should_retry_absent_status() {
        let limiter = ProviderRateLimiter::new("dns");

        assert!(limiter.should_retry(None, 0));
        assert!(limiter.should_retry(None, 2));
        assert!(!limiter.should_retry(None, 3));
    }

    #[test]
    fn test_backoff_time_powers() {
        let limiter = ProviderRateLimiter::new("geoip");

        // factor defaults to 2: 1s, 2s, 4s, 8s
        assert_eq!(limiter.backoff_time(0), Duration::from_secs(1));
        assert_eq!(limiter.backoff_time(1), Duration::from_secs(2));
        assert_eq!(limiter.backoff_time(2), Duration::from_secs(4));
        assert_eq!(limiter.backoff_time(3), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_custom_factor() {
        let config = RateLimitConfig {
            backoff_factor: 3.0,
            ..RateLimitConfig::default()
        };
        let limiter = ProviderRateLimiter::with_config("geoip", &config);

        assert_eq!(limiter.backoff_time(2), Duration::from_secs(9));
    }
}
