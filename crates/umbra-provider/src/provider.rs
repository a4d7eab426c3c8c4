//! The provider contract.

use crate::envelope::Envelope;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait every intelligence source implements.
///
/// A provider answers one kind of query about a target (DNS, WHOIS,
/// reputation, geolocation, ...). The call is synchronous and may block on
/// network I/O; the orchestrator runs it off the async scheduling threads
/// and enforces the per-provider timeout around it. Implementations must be
/// thread-safe (`Send + Sync`) so concurrent scans can share them.
pub trait Provider: Send + Sync {
    /// Execute the query for `target` and return a raw result envelope.
    ///
    /// Implementations should never panic on bad input; failures belong in
    /// an error envelope. Rate limiting and retries are the provider's own
    /// responsibility (via `umbra-ratelimit`) - by the time an envelope
    /// reaches the orchestrator, retries are already spent.
    fn run(&self, target: &str) -> Envelope;
}

/// A registered provider together with its metadata.
///
/// Metadata is arbitrary key/value data; the key `disabled` (boolean) is
/// recognized by the registry's enabled-filter.
#[derive(Clone)]
pub struct Registration {
    /// The provider implementation
    pub provider: Arc<dyn Provider>,
    /// Arbitrary metadata attached at registration time
    pub metadata: HashMap<String, Value>,
}

impl Registration {
    /// Whether this registration is disabled via metadata.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.metadata
            .get("disabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
