//! The canonical record schema.
//!
//! This is the ONLY output format normalizers produce. Provider-specific
//! data is preserved verbatim in the `raw` field. A record is created per
//! provider response, read-only afterward, consumed by the merge engine,
//! then discarded - it is never persisted on its own.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use umbra_core::TargetType;

/// Source name used for the output of the merge engine.
pub const MERGED_SOURCE: &str = "merged";

/// DNS resolution data.
///
/// Lists are never absent, only empty; order is first-seen and duplicates
/// are removed by the merge engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedData {
    /// Resolved addresses (A/AAAA, plus best-effort hostname hints)
    pub ip: Vec<String>,
    /// MX records, normalized to `"<preference> <exchange>"`
    pub mx: Vec<String>,
    /// NS records
    pub ns: Vec<String>,
    /// TXT records
    pub txt: Vec<String>,
}

/// WHOIS registration data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoisData {
    /// Sponsoring registrar
    pub registrar: Option<String>,
    /// Registrant organization
    pub org: Option<String>,
    /// Registrant country
    pub country: Option<String>,
    /// Contact emails, deduplicated
    pub emails: Vec<String>,
    /// Registration date, as reported
    pub created: Option<String>,
    /// Last update date, as reported
    pub updated: Option<String>,
    /// Expiry date, as reported
    pub expires: Option<String>,
}

/// Network and geolocation data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkData {
    /// Autonomous system number, `AS`-prefixed
    pub asn: Option<String>,
    /// Autonomous system name
    pub asn_name: Option<String>,
    /// ISP / organization string
    pub isp: Option<String>,
    /// City
    pub city: Option<String>,
    /// Region / state
    pub region: Option<String>,
    /// Country code
    pub country: Option<String>,
}

/// Threat intelligence data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskData {
    /// Risk score in [0, 100], when a provider reports one
    pub score: Option<f64>,
    /// Threat categories, deduplicated
    pub categories: Vec<String>,
    /// Whether any engine flagged the target as malicious
    pub malicious: bool,
}

/// The canonical data structure all provider outputs converge to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Provider that produced this record (e.g. `"geoip"`, `"reputation"`),
    /// or [`MERGED_SOURCE`] for merge engine output
    pub source: String,
    /// Kind of target this record describes
    #[serde(rename = "type")]
    pub target_type: TargetType,
    /// The target being enriched
    pub target: String,
    /// DNS resolution data
    #[serde(default)]
    pub resolved: ResolvedData,
    /// WHOIS registration data
    #[serde(default)]
    pub whois: WhoisData,
    /// Network and geolocation data
    #[serde(default)]
    pub network: NetworkData,
    /// Threat intelligence data
    #[serde(default)]
    pub risk: RiskData,
    /// Original provider response, preserved verbatim; keyed by provider
    /// id in merged records
    #[serde(default)]
    pub raw: Value,
}

impl CanonicalRecord {
    /// Create an empty record with all sections at their defaults.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            source: source.into(),
            target_type,
            target: target.into(),
            resolved: ResolvedData::default(),
            whois: WhoisData::default(),
            network: NetworkData::default(),
            risk: RiskData::default(),
            raw: Value::Null,
        }
    }

    /// Validate that this record is usable by the merge engine.
    ///
    /// `source` and `target` must be non-empty. The structural checks the
    /// schema demands elsewhere (type enum membership, complete section key
    /// sets) are guaranteed by the types here.
    #[must_use]
    pub fn validate(&self) -> bool {
        !self.source.is_empty() && !self.target.is_empty()
    }

    /// Whether the record carries a non-empty raw payload.
    #[must_use]
    pub fn has_raw(&self) -> bool {
        match &self.raw {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Bool(_) | Value::Number(_) => true,
        }
    }
}
