//! Threat-reputation normalizer (virustotal-style responses).
//!
//! Response structure varies by endpoint. Domain report:
//!
//! ```json
//! {
//!   "data": {
//!     "id": "example.com",
//!     "attributes": {
//!       "last_analysis_stats": {"malicious": 2, "suspicious": 0, "clean": 85},
//!       "last_dns_records": [{"type": "A", "value": "93.184.216.34"}],
//!       "whois": "Registrar: Example Inc...",
//!       "categories": {"VendorA": "phishing"}
//!     }
//!   }
//! }
//! ```
//!
//! IP reports carry `asn`/`as_owner`/`country` instead of DNS records.

use crate::normalize::{push_unique, scalar_string};
use crate::record::{CanonicalRecord, WhoisData};
use serde_json::Value;
use umbra_core::TargetType;

/// Normalize a threat-reputation response.
///
/// The risk score is `(malicious + 0.5 * suspicious) / total_engines * 100`
/// rounded to two decimals, `0` when the stats block reports no engines.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalize_reputation(resp: &Value, target: &str) -> CanonicalRecord {
    let mut record = CanonicalRecord::new("reputation", target, TargetType::infer(target));

    let attributes = resp
        .get("data")
        .and_then(|data| data.get("attributes"))
        .and_then(Value::as_object);

    let Some(attributes) = attributes else {
        record.raw = resp.clone();
        return record;
    };

    if let Some(stats) = attributes.get("last_analysis_stats").and_then(Value::as_object) {
        let malicious = stats.get("malicious").and_then(Value::as_u64).unwrap_or(0);
        let suspicious = stats.get("suspicious").and_then(Value::as_u64).unwrap_or(0);
        let clean = stats.get("clean").and_then(Value::as_u64).unwrap_or(0);

        let total = malicious + suspicious + clean;
        let score = if total > 0 {
            let raw = (malicious as f64 + 0.5 * suspicious as f64) / total as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        } else {
            0.0
        };

        if score.is_finite() {
            record.risk.score = Some(score.clamp(0.0, 100.0));
        }
        record.risk.malicious = malicious > 0;
    }

    match attributes.get("categories") {
        Some(Value::Object(map)) => {
            for label in map.values().filter_map(scalar_string) {
                push_unique(&mut record.risk.categories, label);
            }
        }
        Some(Value::Array(items)) => {
            for label in items.iter().filter_map(scalar_string) {
                push_unique(&mut record.risk.categories, label);
            }
        }
        _ => {}
    }

    if let Some(asn) = attributes.get("asn").and_then(scalar_string) {
        record.network.asn = Some(if asn.starts_with("AS") {
            asn
        } else {
            format!("AS{asn}")
        });
        record.network.asn_name = attributes.get("as_owner").and_then(scalar_string);
    }

    record.network.country = attributes.get("country").and_then(scalar_string);

    if let Some(dns_records) = attributes.get("last_dns_records").and_then(Value::as_array) {
        for entry in dns_records {
            let record_type = entry
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_uppercase();
            let Some(value) = entry.get("value").and_then(scalar_string) else {
                continue;
            };

            match record_type.as_str() {
                "A" | "AAAA" => record.resolved.ip.push(value),
                "MX" => record.resolved.mx.push(value),
                "NS" => record.resolved.ns.push(value),
                "TXT" => record.resolved.txt.push(value),
                _ => {}
            }
        }
    }

    if let Some(whois_text) = attributes.get("whois").and_then(Value::as_str) {
        record.whois = parse_whois_text(whois_text);
    }

    if let Some(created) = attributes.get("creation_date").and_then(scalar_string) {
        record.whois.created = Some(created);
    }
    if let Some(updated) = attributes.get("last_modification_date").and_then(scalar_string) {
        record.whois.updated = Some(updated);
    }

    record.raw = resp.clone();
    record
}

/// Check whether a payload looks like a threat-reputation response.
#[must_use]
pub fn is_reputation_response(data: &Value) -> bool {
    data.get("data")
        .and_then(|d| d.get("attributes"))
        .is_some_and(Value::is_object)
}

/// Parse free-form WHOIS text embedded in a reputation report.
///
/// Lines are matched case-insensitively on `key: value` pairs; any
/// `@`-containing value counts as an email.
fn parse_whois_text(whois_text: &str) -> WhoisData {
    let mut whois = WhoisData::default();

    for line in whois_text.to_lowercase().lines() {
        let line = line.trim();

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if value.is_empty() {
            continue;
        }

        if key.contains("registrar") && whois.registrar.is_none() {
            whois.registrar = Some(value.to_string());
        } else if (key.contains("organization") || key.contains("org")) && whois.org.is_none() {
            whois.org = Some(value.to_string());
        } else if key.contains("country") && whois.country.is_none() {
            whois.country = Some(value.to_uppercase());
        } else if key.contains("email") || value.contains('@') {
            if value.contains('@') {
                push_unique(&mut whois.emails, value.to_string());
            }
        } else if key.contains("creation date") || key.contains("created") {
            whois.created = Some(value.to_string());
        } else if key.contains("updated date") || key.contains("modified") {
            whois.updated = Some(value.to_string());
        } else if key.contains("expir") {
            whois.expires = Some(value.to_string());
        }
    }

    whois
}
