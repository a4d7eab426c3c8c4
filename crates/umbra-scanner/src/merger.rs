//! Generic envelope merger.
//!
//! Combines raw provider envelopes - never passed through a normalizer -
//! into one per-field summary. Every envelope is collapsed to its tagged
//! outcome first; list and scalar fields flatten into a deduplicated
//! `values` list with per-provider attribution, object fields are kept
//! per-provider under `details`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::info;
use umbra_provider::{Envelope, Outcome};

/// Per-provider contribution marker inside a merged field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceTag {
    /// Number of items a provider contributed to a list field
    Count(usize),
    /// Presence marker for scalar fields
    Present(bool),
}

/// One merged field across providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedField {
    /// Flattened, deduplicated values from all providers
    #[serde(default)]
    pub values: Vec<Value>,
    /// Which providers contributed, and how much
    #[serde(default)]
    pub sources: BTreeMap<String, SourceTag>,
    /// Object-valued contributions, kept per provider instead of flattened
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

/// Aggregate counts over all providers in a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// Providers that produced an envelope
    pub total_providers: usize,
    /// Providers whose outcome was ok
    pub successful_providers: usize,
    /// Providers whose outcome was an error
    pub failed_providers: usize,
}

/// The per-field-deduplicated aggregate of many provider envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedSummary {
    /// Original scan target
    pub target: String,
    /// Provider ids that were requested for this scan
    pub providers: Vec<String>,
    /// True iff no provider errored
    pub success: bool,
    /// Aggregate provider counts
    pub summary: SummaryCounts,
    /// Field name to merged values with provider attribution
    pub data: BTreeMap<String, MergedField>,
    /// Provider id to error message for failed providers
    pub errors: BTreeMap<String, String>,
    /// Provider id to cache-hit flag
    pub cached_flags: BTreeMap<String, bool>,
    /// Total scan duration, attached by the orchestrator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_duration_seconds: Option<f64>,
    /// Profile the scan ran with, attached by the orchestrator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Merge provider envelopes into a unified summary.
///
/// `requested` is the provider id list the caller asked for; `results`
/// pairs each dispatched provider with its envelope, in the order results
/// were collected. The conventional `ips`, `domains` and `dns_records`
/// fields get their specialized dedup passes after the field fold.
#[must_use]
pub fn merge(target: &str, requested: &[String], results: &[(String, Envelope)]) -> MergedSummary {
    let mut merged = MergedSummary {
        target: target.to_string(),
        providers: requested.to_vec(),
        success: true,
        summary: SummaryCounts {
            total_providers: results.len(),
            ..SummaryCounts::default()
        },
        data: BTreeMap::new(),
        errors: BTreeMap::new(),
        cached_flags: BTreeMap::new(),
        scan_duration_seconds: None,
        profile: None,
    };

    for (provider, envelope) in results {
        match envelope.outcome() {
            Outcome::Ok { data, cached, .. } => {
                merged.summary.successful_providers += 1;

                if let Some(Value::Object(fields)) = data {
                    merge_fields(&mut merged.data, &fields, provider);
                }
                if cached {
                    merged.cached_flags.insert(provider.clone(), true);
                }
            }
            Outcome::Err { message } => {
                merged.summary.failed_providers += 1;
                merged.errors.insert(provider.clone(), message);
            }
        }
    }

    merged.success = merged.summary.failed_providers == 0;

    if let Some(field) = merged.data.get_mut("domains") {
        dedup_values_case_insensitive(&mut field.values);
    }
    if let Some(field) = merged.data.get_mut("dns_records") {
        dedup_values_dns(&mut field.values);
    }

    info!(
        scan_target = %target,
        successful = merged.summary.successful_providers,
        failed = merged.summary.failed_providers,
        "merged provider results"
    );

    merged
}

/// Fold one provider's data object into the unified field map.
fn merge_fields(
    unified: &mut BTreeMap<String, MergedField>,
    fields: &Map<String, Value>,
    provider: &str,
) {
    for (key, value) in fields {
        if key == "success" || key == "error" {
            continue;
        }

        let field = unified.entry(key.clone()).or_default();

        match value {
            Value::Array(items) => {
                for item in items {
                    if !field.values.contains(item) {
                        field.values.push(item.clone());
                    }
                }
                field
                    .sources
                    .insert(provider.to_string(), SourceTag::Count(items.len()));
            }
            Value::Object(_) => {
                field.details.insert(provider.to_string(), value.clone());
            }
            scalar => {
                if !field.values.contains(scalar) {
                    field.values.push(scalar.clone());
                }
                field
                    .sources
                    .insert(provider.to_string(), SourceTag::Present(true));
            }
        }
    }
}

/// Remove duplicate IPs while preserving order.
#[must_use]
pub fn dedup_ips(ips: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ips.iter()
        .filter(|ip| seen.insert((*ip).clone()))
        .cloned()
        .collect()
}

/// Remove duplicate domains case-insensitively, keeping the casing of the
/// first occurrence.
#[must_use]
pub fn dedup_domains(domains: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    domains
        .iter()
        .filter(|domain| seen.insert(domain.to_lowercase()))
        .cloned()
        .collect()
}

/// Deduplicate DNS record objects by their (type, value) pair, with the
/// type compared upper-cased and the value lower-cased.
#[must_use]
pub fn dedup_dns_records(records: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(dns_record_key(record)))
        .cloned()
        .collect()
}

fn dns_record_key(record: &Value) -> (String, String) {
    let record_type = record
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_uppercase();
    let value = record
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    (record_type, value)
}

fn dedup_values_case_insensitive(values: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    values.retain(|value| match value.as_str() {
        Some(s) => seen.insert(s.to_lowercase()),
        None => true,
    });
}

fn dedup_values_dns(values: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    values.retain(|value| {
        if value.is_object() {
            seen.insert(dns_record_key(value))
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_envelope(data: Value) -> Envelope {
        Envelope::success(data)
    }

    fn requested(results: &[(String, Envelope)]) -> Vec<String> {
        results.iter().map(|(p, _)| p.clone()).collect()
    }

    #[test]
    fn test_list_field_dedup_with_sources() {
        let results = vec![
            (
                "dns".to_string(),
                ok_envelope(json!({"ips": ["1.2.3.4", "1.2.3.4"]})),
            ),
            (
                "passive_dns".to_string(),
                ok_envelope(json!({"ips": ["1.2.3.4"]})),
            ),
        ];

        let merged = merge("example.com", &requested(&results), &results);

        let ips = merged.data.get("ips").expect("ips field");
        assert_eq!(ips.values, vec![json!("1.2.3.4")]);
        assert_eq!(ips.sources.get("dns"), Some(&SourceTag::Count(2)));
        assert_eq!(ips.sources.get("passive_dns"), Some(&SourceTag::Count(1)));
    }

    #[test]
    fn test_scalar_field_presence_sources() {
        let results = vec![
            ("geoip".to_string(), ok_envelope(json!({"country": "US"}))),
            ("whois".to_string(), ok_envelope(json!({"country": "US"}))),
        ];

        let merged = merge("8.8.8.8", &requested(&results), &results);

        let country = merged.data.get("country").expect("country field");
        assert_eq!(country.values, vec![json!("US")]);
        assert_eq!(country.sources.get("geoip"), Some(&SourceTag::Present(true)));
        assert_eq!(country.sources.get("whois"), Some(&SourceTag::Present(true)));
    }

    #[test]
    fn test_object_field_goes_to_details() {
        let results = vec![(
            "tls".to_string(),
            ok_envelope(json!({"certificate": {"issuer": "LE", "days_left": 42}})),
        )];

        let merged = merge("example.com", &requested(&results), &results);

        let cert = merged.data.get("certificate").expect("certificate field");
        assert!(cert.values.is_empty());
        assert_eq!(
            cert.details.get("tls"),
            Some(&json!({"issuer": "LE", "days_left": 42}))
        );
    }

    #[test]
    fn test_errors_mark_summary_failed() {
        let results = vec![
            ("dns".to_string(), ok_envelope(json!({"ips": ["1.1.1.1"]}))),
            ("whois".to_string(), Envelope::failure("Timeout after 30s")),
        ];

        let merged = merge("example.com", &requested(&results), &results);

        assert!(!merged.success);
        assert_eq!(merged.summary.total_providers, 2);
        assert_eq!(merged.summary.successful_providers, 1);
        assert_eq!(merged.summary.failed_providers, 1);
        assert_eq!(
            merged.errors.get("whois").map(String::as_str),
            Some("Timeout after 30s")
        );
        // Partial data is still present
        assert!(merged.data.contains_key("ips"));
    }

    #[test]
    fn test_all_ok_summary_success() {
        let results = vec![("dns".to_string(), ok_envelope(json!({})))];
        let merged = merge("example.com", &requested(&results), &results);

        assert!(merged.success);
        assert!(merged.errors.is_empty());
    }

    #[test]
    fn test_cached_flags_tracked() {
        let cached: Envelope = serde_json::from_value(json!({
            "module": "whois",
            "status": "ok",
            "data": {},
            "cached": true
        }))
        .expect("parse envelope");

        let results = vec![
            ("whois".to_string(), cached),
            ("dns".to_string(), ok_envelope(json!({}))),
        ];

        let merged = merge("example.com", &requested(&results), &results);

        assert_eq!(merged.cached_flags.get("whois"), Some(&true));
        assert!(!merged.cached_flags.contains_key("dns"));
    }

    #[test]
    fn test_mixed_envelope_shapes() {
        let standardized: Envelope = serde_json::from_value(json!({
            "module": "passive_dns",
            "status": "ok",
            "data": {"domains": ["a.example.com"]}
        }))
        .expect("parse envelope");

        let results = vec![
            (
                "dns".to_string(),
                ok_envelope(json!({"domains": ["b.example.com"]})),
            ),
            ("passive_dns".to_string(), standardized),
        ];

        let merged = merge("example.com", &requested(&results), &results);

        let domains = merged.data.get("domains").expect("domains field");
        assert_eq!(domains.values.len(), 2);
    }

    #[test]
    fn test_domains_case_insensitive_dedup() {
        let results = vec![
            (
                "dns".to_string(),
                ok_envelope(json!({"domains": ["Mail.Example.com"]})),
            ),
            (
                "passive_dns".to_string(),
                ok_envelope(json!({"domains": ["mail.example.com", "www.example.com"]})),
            ),
        ];

        let merged = merge("example.com", &requested(&results), &results);

        let domains = merged.data.get("domains").expect("domains field");
        // First casing wins
        assert_eq!(
            domains.values,
            vec![json!("Mail.Example.com"), json!("www.example.com")]
        );
    }

    #[test]
    fn test_dns_records_pair_dedup() {
        let results = vec![
            (
                "dns".to_string(),
                ok_envelope(json!({"dns_records": [
                    {"type": "a", "value": "1.1.1.1"},
                    {"type": "NS", "value": "NS1.example.com"}
                ]})),
            ),
            (
                "reputation".to_string(),
                ok_envelope(json!({"dns_records": [
                    {"type": "A", "value": "1.1.1.1"},
                    {"type": "ns", "value": "ns1.example.com"}
                ]})),
            ),
        ];

        let merged = merge("example.com", &requested(&results), &results);

        let records = merged.data.get("dns_records").expect("dns_records field");
        assert_eq!(records.values.len(), 2);
    }

    #[test]
    fn test_dedup_helpers_standalone() {
        assert_eq!(
            dedup_ips(&["1.1.1.1".into(), "2.2.2.2".into(), "1.1.1.1".into()]),
            vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()]
        );

        assert_eq!(
            dedup_domains(&["Example.COM".into(), "example.com".into(), "other.net".into()]),
            vec!["Example.COM".to_string(), "other.net".to_string()]
        );

        let records = vec![
            json!({"type": "A", "value": "1.1.1.1"}),
            json!({"type": "a", "value": "1.1.1.1"}),
            json!({"type": "MX", "value": "mail.example.com"}),
        ];
        assert_eq!(dedup_dns_records(&records).len(), 2);
    }

    #[test]
    fn test_requested_ids_preserved() {
        let results = vec![("dns".to_string(), ok_envelope(json!({})))];
        let requested = vec!["dns".to_string(), "whois".to_string()];

        let merged = merge("example.com", &requested, &results);

        assert_eq!(merged.providers, vec!["dns", "whois"]);
        assert_eq!(merged.summary.total_providers, 1);
    }
}
