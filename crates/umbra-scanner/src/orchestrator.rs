//! Scan orchestrator for coordinating provider execution.
//!
//! This module provides the [`Orchestrator`] which manages concurrent,
//! bounded, timed-out execution of providers for a target, in batch and
//! streaming flavors. The orchestrator never retries - rate limiting and
//! retries live inside provider implementations - and a failing provider
//! never affects its siblings.

use crate::error::ScanError;
use crate::merger::{self, MergedSummary};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task;
use tracing::{debug, error, info, warn};
use umbra_core::ProviderId;
use umbra_provider::{profile, Envelope, ProviderRegistry, ScanProfiles};

/// Default maximum number of concurrently running providers.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default per-provider timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One event on a streaming scan.
///
/// Provider events arrive in completion order, which is not deterministic
/// across runs; the final event is always last.
#[derive(Debug, Clone, Serialize)]
pub enum ScanEvent {
    /// A provider finished (successfully or not)
    Provider {
        /// Provider id the envelope belongs to
        provider: String,
        /// The provider's raw result envelope
        envelope: Envelope,
    },
    /// All providers finished; carries the merged summary
    Final {
        /// The merged scan summary
        merged: MergedSummary,
    },
}

/// Orchestrates concurrent provider execution for a target.
///
/// One global counting semaphore bounds how many providers run at once;
/// each provider call runs off the async scheduling threads (providers are
/// allowed to block) under its own timeout. The registry is injected and
/// must not be mutated while a scan is in flight.
pub struct Orchestrator {
    registry: ProviderRegistry,
    profiles: ScanProfiles,
    timeout_per_provider: Duration,
    semaphore: Arc<Semaphore>,
}

impl Orchestrator {
    /// Create an orchestrator over the given registry with default limits.
    #[must_use]
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            profiles: ScanProfiles::new(),
            timeout_per_provider: DEFAULT_TIMEOUT,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT)),
        }
    }

    /// Replace the profile table.
    #[must_use]
    pub fn with_profiles(mut self, profiles: ScanProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Set the maximum number of concurrently running providers.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    /// Set the per-provider timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_per_provider = timeout;
        self
    }

    /// Strictly resolve a profile name to its provider list.
    ///
    /// Unlike the lenient scan path, an unknown profile is an error here.
    pub fn profile_providers(&self, profile_name: &str) -> Result<Vec<String>, ScanError> {
        self.profiles
            .get(profile_name)
            .map(<[String]>::to_vec)
            .ok_or_else(|| ScanError::InvalidProfile {
                profile: profile_name.to_string(),
                valid: self.profiles.names().join(", "),
            })
    }

    /// Execute providers against a target and merge their envelopes.
    ///
    /// An explicit `providers` list overrides the profile; the profile's
    /// `"all"` sentinel expands to every registered provider. Disabled
    /// providers are filtered out. All providers run to completion
    /// independently - there is no short-circuit on first failure.
    ///
    /// # Errors
    /// Returns [`ScanError::NoProvidersAvailable`] when the resolved
    /// provider set is empty.
    pub async fn run(
        &self,
        target: &str,
        providers: Option<&[String]>,
        profile_name: &str,
    ) -> Result<MergedSummary, ScanError> {
        let names = self.resolve(providers, profile_name);
        if names.is_empty() {
            return Err(ScanError::NoProvidersAvailable {
                target: target.to_string(),
                reason: "no enabled providers matched the request".to_string(),
            });
        }

        info!(
            scan_target = %target,
            count = names.len(),
            providers = %names.join(", "),
            "starting scan"
        );

        let start = Instant::now();

        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                tokio::spawn(Self::execute_provider(
                    self.registry.clone(),
                    Arc::clone(&self.semaphore),
                    self.timeout_per_provider,
                    target.to_string(),
                    name.clone(),
                ))
            })
            .collect();

        let mut results = Vec::with_capacity(names.len());
        for (name, outcome) in names.iter().zip(join_all(handles).await) {
            let envelope =
                outcome.unwrap_or_else(|err| Envelope::failure(format!("Task failed: {err}")));
            results.push((name.clone(), envelope));
        }

        let elapsed = start.elapsed();
        info!(scan_target = %target, elapsed_secs = elapsed.as_secs_f64(), "scan completed");

        let mut merged = merger::merge(target, &names, &results);
        merged.scan_duration_seconds = Some(elapsed.as_secs_f64());
        merged.profile = Some(profile_name.to_string());

        Ok(merged)
    }

    /// Execute providers against a target, yielding envelopes as they
    /// complete.
    ///
    /// Worker tasks fan results into the returned channel in completion
    /// order; after all providers finish, one [`ScanEvent::Final`] with the
    /// merged summary is sent and the channel closes.
    ///
    /// # Errors
    /// Returns [`ScanError::NoProvidersAvailable`] when the resolved
    /// provider set is empty.
    pub async fn run_stream(
        &self,
        target: &str,
        providers: Option<&[String]>,
        profile_name: &str,
    ) -> Result<mpsc::Receiver<ScanEvent>, ScanError> {
        let names = self.resolve(providers, profile_name);
        if names.is_empty() {
            return Err(ScanError::NoProvidersAvailable {
                target: target.to_string(),
                reason: "no enabled providers matched the request".to_string(),
            });
        }

        info!(
            scan_target = %target,
            count = names.len(),
            providers = %names.join(", "),
            "starting scan stream"
        );

        let (tx, rx) = mpsc::channel(names.len() + 1);
        let start = Instant::now();

        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let events = tx.clone();
                let name = name.clone();
                let call = Self::execute_provider(
                    self.registry.clone(),
                    Arc::clone(&self.semaphore),
                    self.timeout_per_provider,
                    target.to_string(),
                    name.clone(),
                );

                tokio::spawn(async move {
                    let envelope = call.await;
                    let _ = events
                        .send(ScanEvent::Provider {
                            provider: name.clone(),
                            envelope: envelope.clone(),
                        })
                        .await;
                    (name, envelope)
                })
            })
            .collect();

        let target = target.to_string();
        let profile_name = profile_name.to_string();
        tokio::spawn(async move {
            let mut results = Vec::with_capacity(handles.len());
            for outcome in join_all(handles).await {
                match outcome {
                    Ok(pair) => results.push(pair),
                    Err(err) => error!(error = %err, "stream worker task failed"),
                }
            }

            let elapsed = start.elapsed();
            info!(scan_target = %target, elapsed_secs = elapsed.as_secs_f64(), "scan stream completed");

            let requested: Vec<String> = results.iter().map(|(name, _)| name.clone()).collect();
            let mut merged = merger::merge(&target, &requested, &results);
            merged.scan_duration_seconds = Some(elapsed.as_secs_f64());
            merged.profile = Some(profile_name);

            let _ = tx.send(ScanEvent::Final { merged }).await;
        });

        Ok(rx)
    }

    /// Resolve the provider list for a scan (lenient path).
    fn resolve(&self, providers: Option<&[String]>, profile_name: &str) -> Vec<String> {
        let mut names: Vec<String> = match providers {
            Some(explicit) => explicit.to_vec(),
            None => self.profiles.providers_for(profile_name),
        };

        if names.iter().any(|name| name == profile::ALL_PROVIDERS) {
            let mut ids: Vec<String> = self
                .registry
                .ids()
                .iter()
                .map(ToString::to_string)
                .collect();
            ids.sort();
            names = ids;
        }

        names.retain(|name| {
            ProviderId::new(name.clone()).map_or(true, |id| self.registry.is_enabled(&id))
        });

        names
    }

    /// Run a single provider under the semaphore and timeout.
    ///
    /// The blocking provider call runs on the blocking pool; exceeding the
    /// timeout abandons the call (it may keep running, its result is
    /// discarded) and fails only this provider.
    async fn execute_provider(
        registry: ProviderRegistry,
        semaphore: Arc<Semaphore>,
        timeout: Duration,
        target: String,
        name: String,
    ) -> Envelope {
        let _permit = semaphore
            .acquire_owned()
            .await
            .expect("scan semaphore never closed");

        let provider = ProviderId::new(name.clone())
            .ok()
            .and_then(|id| registry.get(&id).ok());

        let Some(provider) = provider else {
            warn!(provider = %name, "provider not found");
            return Envelope::failure("Provider not found");
        };

        debug!(provider = %name, "starting provider");
        let start = Instant::now();

        let call = task::spawn_blocking(move || provider.run(&target));

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(mut envelope)) => {
                let elapsed = start.elapsed();
                debug!(
                    provider = %name,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "provider completed"
                );
                envelope.set_execution_time_if_missing(elapsed.as_secs_f64());
                envelope
            }
            Ok(Err(join_error)) => {
                error!(provider = %name, error = %join_error, "provider call failed");
                Envelope::failure(format!("Provider panicked: {join_error}"))
            }
            Err(_) => {
                warn!(
                    provider = %name,
                    timeout_secs = timeout.as_secs_f64(),
                    "provider timed out"
                );
                Envelope::failure(format!("Timeout after {}s", timeout.as_secs_f64()))
            }
        }
    }
}

/// Run a batch scan over `registry` with explicit limits.
///
/// Convenience wrapper constructing a one-shot [`Orchestrator`].
///
/// # Errors
/// See [`Orchestrator::run`].
pub async fn run_scan(
    registry: &ProviderRegistry,
    target: &str,
    profile_name: &str,
    max_concurrent: usize,
    timeout_per_provider: Duration,
) -> Result<MergedSummary, ScanError> {
    Orchestrator::new(registry.clone())
        .with_max_concurrent(max_concurrent)
        .with_timeout(timeout_per_provider)
        .run(target, None, profile_name)
        .await
}

/// Run a streaming scan over `registry` with explicit limits.
///
/// Yields provider envelopes as they complete, ending with the merged
/// summary sentinel.
///
/// # Errors
/// See [`Orchestrator::run_stream`].
pub async fn run_scan_stream(
    registry: &ProviderRegistry,
    target: &str,
    profile_name: &str,
    max_concurrent: usize,
    timeout_per_provider: Duration,
) -> Result<mpsc::Receiver<ScanEvent>, ScanError> {
    Orchestrator::new(registry.clone())
        .with_max_concurrent(max_concurrent)
        .with_timeout(timeout_per_provider)
        .run_stream(target, None, profile_name)
        .await
}
