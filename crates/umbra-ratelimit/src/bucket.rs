//! Token bucket rate limiter primitive.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Token bucket allowing bursts up to `capacity`, refilled continuously at
/// `refill_rate` tokens per second.
///
/// Access is serialized per bucket: the state lock is held across the
/// refill wait, so concurrent acquirers queue up and can never
/// oversubscribe the bucket.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket holding `capacity` tokens, refilled at
    /// `refill_rate` tokens per second.
    ///
    /// # Panics
    /// Panics if `capacity` is zero or `refill_rate` is not positive.
    #[must_use]
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        assert!(capacity > 0, "token bucket capacity must be positive");
        assert!(
            refill_rate > 0.0,
            "token bucket refill rate must be positive"
        );

        Self {
            capacity: f64::from(capacity),
            refill_rate,
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Acquire `tokens` tokens, suspending until enough have accrued.
    ///
    /// Requests larger than the capacity can never be satisfied in one
    /// refill; they are clamped to the capacity.
    pub async fn acquire(&self, tokens: u32) {
        let needed = f64::from(tokens).min(self.capacity);
        let mut state = self.state.lock().await;

        loop {
            self.refill(&mut state);

            if state.tokens >= needed {
                state.tokens -= needed;
                return;
            }

            let wait_secs = (needed - state.tokens) / self.refill_rate;
            tokio::time::sleep(Duration::from_secs_f64(wait_secs)).await;
        }
    }

    /// Tokens currently available, after refilling for elapsed time.
    pub async fn available(&self) -> f64 {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        state.tokens
    }

    /// The bucket's burst capacity.
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
        state.last_refill = now;
    }
}
