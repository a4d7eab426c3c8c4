//! Umbra Record - Canonical record schema, normalizers and merge engine.
//!
//! Every provider returns a different payload shape; this crate converges
//! them. [`CanonicalRecord`] is the unified schema, the `normalize` module
//! translates each provider family's raw payload into it, and
//! [`merge_records`] combines records from many providers into one
//! deduplicated answer with deterministic tie-break rules.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod merge;
pub mod normalize;
pub mod record;

pub use merge::merge_records;
pub use normalize::{
    is_dns_response, is_geoip_response, is_reputation_response, is_whois_response, normalize_dns,
    normalize_dns_hinted, normalize_geoip, normalize_reputation, normalize_whois,
    normalize_whois_ip, DnsRecordKind,
};
pub use record::{CanonicalRecord, NetworkData, ResolvedData, RiskData, WhoisData, MERGED_SOURCE};
