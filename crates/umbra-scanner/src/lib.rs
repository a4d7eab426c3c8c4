//! Umbra Scanner - Multi-provider scan orchestration.
//!
//! This crate drives concurrent, bounded, timed-out execution of registered
//! providers against a target and merges their raw envelopes into one
//! deduplicated summary. Providers never fail a scan: every timeout, panic
//! or error becomes an error envelope, and partial data from succeeding
//! providers is always included.
//!
//! # Features
//!
//! - Concurrency bounded by one global semaphore per orchestrator
//! - Per-provider timeouts that never affect sibling providers
//! - Batch and streaming (completion-order) result delivery
//! - Per-field merged summary with provider attribution
//!
//! # Example
//!
//! ```rust,ignore
//! use umbra_provider::ProviderRegistry;
//! use umbra_scanner::Orchestrator;
//!
//! let registry = ProviderRegistry::new();
//! // ... register providers ...
//!
//! let orchestrator = Orchestrator::new(registry).with_max_concurrent(5);
//! let summary = orchestrator.run("example.com", None, "fast").await?;
//! println!("success: {}", summary.success);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod merger;
pub mod orchestrator;

pub use error::{Result, ScanError};
pub use merger::{
    dedup_dns_records, dedup_domains, dedup_ips, MergedField, MergedSummary, SourceTag,
    SummaryCounts,
};
pub use orchestrator::{run_scan, run_scan_stream, Orchestrator, ScanEvent};
