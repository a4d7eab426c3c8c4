//! Provider result envelopes.
//!
//! Providers return one of two accepted wire shapes: the legacy shape
//! (`success`/`data`/`error`) and the standardized shape
//! (`module`/`status`/`data`/`message`). Both are collapsed into the tagged
//! [`Outcome`] union at this single boundary; every downstream component
//! consumes only the tagged union.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status field of the standardized envelope shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// Provider call succeeded
    Ok,
    /// Provider call failed
    Error,
}

/// Raw success/failure wrapper returned by a provider call.
///
/// Deserialization accepts both shapes transparently; the standardized
/// shape is matched first (it carries the required `status` key the legacy
/// shape never has).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// Standardized shape: `module`/`status`/`data`/`message`/`cached`.
    Standardized {
        /// Module (provider) that produced this result
        module: String,
        /// Success indicator
        status: EnvelopeStatus,
        /// Payload on success
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        /// Error description on failure
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Whether the result came from a cache
        #[serde(default)]
        cached: bool,
        /// Wall-clock duration of the underlying call, in seconds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_time_seconds: Option<f64>,
    },

    /// Legacy shape: `success`/`data`/`error`/`cached`.
    Legacy {
        /// Provider that produced this result, when self-reported
        #[serde(default, skip_serializing_if = "Option::is_none")]
        provider: Option<String>,
        /// Success indicator
        success: bool,
        /// Payload on success
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        /// Error description on failure
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        /// Whether the result came from a cache
        #[serde(default)]
        cached: bool,
        /// Wall-clock duration of the underlying call, in seconds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_time_seconds: Option<f64>,
    },
}

impl Envelope {
    /// Build a successful legacy-shape envelope.
    #[must_use]
    pub fn success(data: Value) -> Self {
        Self::Legacy {
            provider: None,
            success: true,
            data: Some(data),
            error: None,
            cached: false,
            execution_time_seconds: None,
        }
    }

    /// Build a failed legacy-shape envelope.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Legacy {
            provider: None,
            success: false,
            data: None,
            error: Some(message.into()),
            cached: false,
            execution_time_seconds: None,
        }
    }

    /// Provider attribution carried inside the envelope itself
    /// (`module` for the standardized shape, `provider` for legacy).
    #[must_use]
    pub fn provider_hint(&self) -> Option<&str> {
        match self {
            Self::Standardized { module, .. } => Some(module),
            Self::Legacy { provider, .. } => provider.as_deref(),
        }
    }

    /// Whether this envelope reports success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Standardized { status, .. } => *status == EnvelopeStatus::Ok,
            Self::Legacy { success, .. } => *success,
        }
    }

    /// Whether the result was served from a cache.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        match self {
            Self::Standardized { cached, .. } | Self::Legacy { cached, .. } => *cached,
        }
    }

    /// Execution time recorded in the envelope, in seconds.
    #[must_use]
    pub fn execution_time(&self) -> Option<f64> {
        match self {
            Self::Standardized {
                execution_time_seconds,
                ..
            }
            | Self::Legacy {
                execution_time_seconds,
                ..
            } => *execution_time_seconds,
        }
    }

    /// Attach an execution time unless the provider already reported one.
    pub fn set_execution_time_if_missing(&mut self, secs: f64) {
        match self {
            Self::Standardized {
                execution_time_seconds,
                ..
            }
            | Self::Legacy {
                execution_time_seconds,
                ..
            } => {
                if execution_time_seconds.is_none() {
                    *execution_time_seconds = Some(secs);
                }
            }
        }
    }

    /// Collapse this envelope into the tagged [`Outcome`] union.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Standardized {
                status,
                data,
                message,
                cached,
                execution_time_seconds,
                ..
            } => match status {
                EnvelopeStatus::Ok => Outcome::Ok {
                    data: data.clone(),
                    cached: *cached,
                    duration_secs: *execution_time_seconds,
                },
                EnvelopeStatus::Error => Outcome::Err {
                    message: message
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string()),
                },
            },
            Self::Legacy {
                success,
                data,
                error,
                cached,
                execution_time_seconds,
                ..
            } => {
                if *success {
                    Outcome::Ok {
                        data: data.clone(),
                        cached: *cached,
                        duration_secs: *execution_time_seconds,
                    }
                } else {
                    Outcome::Err {
                        message: error.clone().unwrap_or_else(|| "Unknown error".to_string()),
                    }
                }
            }
        }
    }
}

/// Logical result of a provider call, independent of wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Successful call
    Ok {
        /// Payload (absent when the provider returned nothing)
        data: Option<Value>,
        /// Whether the result came from a cache
        cached: bool,
        /// Wall-clock duration of the call, in seconds
        duration_secs: Option<f64>,
    },
    /// Failed call
    Err {
        /// Error description
        message: String,
    },
}
