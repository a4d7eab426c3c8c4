//! Centralized rate limit manager for all providers.

use crate::limiter::ProviderRateLimiter;
use crate::response::ResponseStatus;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};
use umbra_core::RateLimitConfig;

/// Registry of per-provider rate limiters.
///
/// Limiters are auto-created with the manager's default policy on first
/// lookup; providers with special quotas are registered explicitly.
/// This is the only component in the core that retries network work.
#[derive(Debug, Default)]
pub struct RateLimitManager {
    limiters: Mutex<HashMap<String, Arc<ProviderRateLimiter>>>,
    defaults: RateLimitConfig,
}

impl RateLimitManager {
    /// Create a manager with the default limiter policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager whose auto-created limiters use `defaults`.
    #[must_use]
    pub fn with_defaults(defaults: RateLimitConfig) -> Self {
        Self {
            limiters: Mutex::new(HashMap::new()),
            defaults,
        }
    }

    /// Register a provider with an explicit rate limit configuration.
    ///
    /// Replaces any previously-registered limiter for the provider.
    pub fn register_provider(
        &self,
        provider_id: impl Into<String>,
        config: &RateLimitConfig,
    ) -> Arc<ProviderRateLimiter> {
        let provider_id = provider_id.into();
        let limiter = Arc::new(ProviderRateLimiter::with_config(&provider_id, config));

        debug!(
            provider_id = %provider_id,
            tokens_per_second = config.tokens_per_second,
            "registered rate limit"
        );

        let mut table = self.limiters.lock().expect("acquire limiter table lock");
        table.insert(provider_id, Arc::clone(&limiter));
        limiter
    }

    /// Get the limiter for a provider, creating one with the manager's
    /// defaults if none is registered.
    pub fn limiter(&self, provider_id: &str) -> Arc<ProviderRateLimiter> {
        let mut table = self.limiters.lock().expect("acquire limiter table lock");

        if let Some(limiter) = table.get(provider_id) {
            return Arc::clone(limiter);
        }

        let limiter = Arc::new(ProviderRateLimiter::with_config(
            provider_id,
            &self.defaults,
        ));
        debug!(provider_id = %provider_id, "auto-created rate limiter with defaults");
        table.insert(provider_id.to_string(), Arc::clone(&limiter));
        limiter
    }

    /// Execute a request with rate limiting and retry/backoff.
    ///
    /// Each attempt acquires one token, invokes `request`, and reads a
    /// status indicator from the result. Retryable outcomes (429, 5xx, or
    /// an error from the call itself) back off `backoff_factor^attempt`
    /// seconds and try again, up to `max_retries`. A response that is no
    /// longer retryable is returned as-is - including a final failed
    /// response once retries are exhausted; an error that survives all
    /// attempts is propagated to the caller.
    ///
    /// # Errors
    /// Returns the last error from `request` once retries are exhausted.
    pub async fn safe_request<F, Fut, R, E>(
        &self,
        provider_id: &str,
        mut request: F,
    ) -> Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: ResponseStatus,
        E: std::fmt::Display,
    {
        let limiter = self.limiter(provider_id);
        let max_retries = limiter.max_retries();

        for attempt in 0..=max_retries {
            limiter.acquire().await;

            debug!(
                provider_id = %provider_id,
                attempt = attempt + 1,
                total = max_retries + 1,
                "dispatching request"
            );

            match request().await {
                Ok(response) => {
                    let status = response.status_code();

                    if !limiter.should_retry(status, attempt) {
                        return Ok(response);
                    }

                    if attempt < max_retries {
                        let wait = limiter.backoff_time(attempt);
                        warn!(
                            provider_id = %provider_id,
                            status = ?status,
                            "retryable status, backing off {:.2}s",
                            wait.as_secs_f64()
                        );
                        tokio::time::sleep(wait).await;
                    } else {
                        error!(
                            provider_id = %provider_id,
                            status = ?status,
                            "max retries exceeded"
                        );
                        return Ok(response);
                    }
                }
                Err(err) => {
                    if limiter.should_retry(None, attempt) && attempt < max_retries {
                        let wait = limiter.backoff_time(attempt);
                        warn!(
                            provider_id = %provider_id,
                            error = %err,
                            "request failed, backing off {:.2}s",
                            wait.as_secs_f64()
                        );
                        tokio::time::sleep(wait).await;
                    } else {
                        error!(
                            provider_id = %provider_id,
                            error = %err,
                            attempts = attempt + 1,
                            "request failed, giving up"
                        );
                        return Err(err);
                    }
                }
            }
        }

        unreachable!("retry loop returns on its final attempt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn fast_defaults() -> RateLimitConfig {
        RateLimitConfig {
            tokens_per_second: 1000.0,
            bucket_capacity: 1000,
            max_retries: 3,
            backoff_factor: 2.0,
        }
    }

    #[test]
    fn test_limiter_auto_created() {
        let manager = RateLimitManager::new();
        let limiter = manager.limiter("shodan");
        assert_eq!(limiter.provider_id(), "shodan");

        // Same instance on repeat lookup
        let again = manager.limiter("shodan");
        assert!(Arc::ptr_eq(&limiter, &again));
    }

    #[test]
    fn test_register_replaces_limiter() {
        let manager = RateLimitManager::new();
        let first = manager.limiter("vt");
        let second = manager.register_provider("vt", &fast_defaults());
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &manager.limiter("vt")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_request_returns_first_success() {
        let manager = RateLimitManager::with_defaults(fast_defaults());
        let calls = AtomicU32::new(0);

        let result: Result<u16, String> = manager
            .safe_request("dns", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(200u16) }
            })
            .await;

        assert_eq!(result.expect("request succeeds"), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_request_retries_on_server_error() {
        let manager = RateLimitManager::with_defaults(fast_defaults());
        let calls = AtomicU32::new(0);

        let result: Result<u16, String> = manager
            .safe_request("whois", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Ok(503u16)
                    } else {
                        Ok(200u16)
                    }
                }
            })
            .await;

        assert_eq!(result.expect("request succeeds"), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_request_exhausts_retries_returns_response() {
        let manager = RateLimitManager::with_defaults(fast_defaults());
        let calls = AtomicU32::new(0);

        let result: Result<u16, String> = manager
            .safe_request("vt", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(429u16) }
            })
            .await;

        // The final rate-limited response is handed back, not swallowed
        assert_eq!(result.expect("response returned"), 429);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_request_terminal_client_error_no_retry() {
        let manager = RateLimitManager::with_defaults(fast_defaults());
        let calls = AtomicU32::new(0);

        let result: Result<u16, String> = manager
            .safe_request("vt", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(404u16) }
            })
            .await;

        assert_eq!(result.expect("response returned"), 404);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_request_propagates_final_error() {
        let manager = RateLimitManager::with_defaults(fast_defaults());
        let calls = AtomicU32::new(0);

        let result: Result<u16, String> = manager
            .safe_request("geoip", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("connection reset".to_string()) }
            })
            .await;

        assert_eq!(result.expect_err("error propagated"), "connection reset");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_safe_request_backoff_timing() {
        let manager = RateLimitManager::with_defaults(fast_defaults());
        let start = Instant::now();

        let _: Result<u16, String> = manager
            .safe_request("vt", || async { Ok(500u16) })
            .await;

        // Backoffs between 4 attempts: 2^0 + 2^1 + 2^2 = 7 seconds
        assert!(start.elapsed() >= std::time::Duration::from_secs(7));
    }
}
