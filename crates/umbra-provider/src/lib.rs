//! Umbra Provider - Provider contract, registry and scan profiles.
//!
//! This crate defines the seam between the orchestration core and the
//! pluggable intelligence sources: the [`Provider`] trait every source
//! implements, the dual-shape [`Envelope`] a provider call returns and the
//! tagged [`Outcome`] it collapses to, the injected [`ProviderRegistry`],
//! and the named [`ScanProfiles`] table.
//!
//! Providers are registered once at startup through an explicit
//! [`ProviderRegistry::register`] call; there is no runtime discovery.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod envelope;
pub mod error;
pub mod profile;
pub mod provider;
pub mod registry;

pub use envelope::{Envelope, EnvelopeStatus, Outcome};
pub use error::{ProviderError, Result};
pub use profile::ScanProfiles;
pub use provider::{Provider, Registration};
pub use registry::ProviderRegistry;
