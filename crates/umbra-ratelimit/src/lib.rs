//! Umbra Ratelimit - Per-provider rate limiting and retry/backoff.
//!
//! This crate is consulted by provider implementations before they make
//! their own network calls; the orchestrator never retries. It provides:
//!
//! - [`TokenBucket`] - burst-capable refill-over-time limiter primitive
//! - [`ProviderRateLimiter`] - one provider's bucket plus retry policy
//! - [`RateLimitManager`] - registry of limiters with the `safe_request`
//!   acquire/invoke/backoff loop
//! - [`ResponseStatus`] - status-code interop implemented for
//!   `reqwest::Response` so HTTP responses pass straight through
//!   `safe_request`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod bucket;
pub mod limiter;
pub mod manager;
pub mod response;

pub use bucket::TokenBucket;
pub use limiter::ProviderRateLimiter;
pub use manager::RateLimitManager;
pub use response::ResponseStatus;
