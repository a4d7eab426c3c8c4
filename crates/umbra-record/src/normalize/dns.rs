//! DNS resolver normalizer.
//!
//! Resolvers hand back several shapes:
//!
//! - a keyed mapping of record type to values:
//!   `{"A": ["93.184.216.34"], "MX": ["10 mail.example.com"], ...}`
//! - a flat list of values together with an explicit record-type hint:
//!   `["93.184.216.34", "93.184.216.35"]`
//! - an answer object wrapping such a list: `{"answer": [...]}`
//!
//! MX entries may arrive as preformatted strings, `[preference, exchange]`
//! pairs, or `{"preference": .., "exchange": ..}` objects; all are rendered
//! `"<preference> <exchange>"`. TXT values split across multiple strings
//! are concatenated.

use crate::normalize::scalar_string;
use crate::record::CanonicalRecord;
use serde_json::Value;
use umbra_core::TargetType;

/// Record type hint for flat-list DNS responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsRecordKind {
    /// IPv4 address records
    A,
    /// IPv6 address records
    Aaaa,
    /// Mail exchanger records
    Mx,
    /// Name server records
    Ns,
    /// Text records
    Txt,
}

/// Normalize a DNS response, assuming A records for unhinted flat lists.
#[must_use]
pub fn normalize_dns(resp: &Value, target: &str) -> CanonicalRecord {
    normalize_dns_hinted(resp, target, DnsRecordKind::A)
}

/// Normalize a DNS response with an explicit record-type hint.
///
/// The hint only matters for flat-list and answer-object shapes; keyed
/// mappings carry their own record types.
#[must_use]
pub fn normalize_dns_hinted(resp: &Value, target: &str, hint: DnsRecordKind) -> CanonicalRecord {
    let mut record = CanonicalRecord::new("dns", target, TargetType::Domain);

    match resp {
        Value::Object(map) if has_record_type_keys(map) => {
            normalize_keyed(map, &mut record);
            record.raw = resp.clone();
        }
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("answer") {
                normalize_list(items, &mut record, hint);
            }
            record.raw = resp.clone();
        }
        Value::Array(items) => {
            normalize_list(items, &mut record, hint);
            record.raw = resp.clone();
        }
        other => {
            record.raw = other.clone();
        }
    }

    record
}

/// Check whether a payload looks like a DNS response.
#[must_use]
pub fn is_dns_response(data: &Value) -> bool {
    match data {
        Value::Object(map) => has_record_type_keys(map) || map.contains_key("answer"),
        Value::Array(_) => true,
        _ => false,
    }
}

fn has_record_type_keys(map: &serde_json::Map<String, Value>) -> bool {
    ["A", "AAAA", "MX", "NS", "TXT", "CNAME", "SOA"]
        .iter()
        .any(|key| map.contains_key(*key))
}

fn normalize_keyed(map: &serde_json::Map<String, Value>, record: &mut CanonicalRecord) {
    for key in ["A", "AAAA"] {
        for value in values_of(map.get(key)) {
            if let Some(ip) = scalar_string(&value) {
                record.resolved.ip.push(ip);
            }
        }
    }

    for value in values_of(map.get("MX")) {
        if let Some(mx) = mx_string(&value) {
            record.resolved.mx.push(mx);
        }
    }

    for value in values_of(map.get("NS")) {
        if let Some(ns) = scalar_string(&value) {
            record.resolved.ns.push(ns);
        }
    }

    for value in values_of(map.get("TXT")) {
        if let Some(txt) = txt_string(&value) {
            record.resolved.txt.push(txt);
        }
    }
}

fn normalize_list(items: &[Value], record: &mut CanonicalRecord, hint: DnsRecordKind) {
    match hint {
        DnsRecordKind::A | DnsRecordKind::Aaaa => {
            record
                .resolved
                .ip
                .extend(items.iter().filter_map(scalar_string));
        }
        DnsRecordKind::Mx => {
            record.resolved.mx.extend(items.iter().filter_map(mx_string));
        }
        DnsRecordKind::Ns => {
            record
                .resolved
                .ns
                .extend(items.iter().filter_map(scalar_string));
        }
        DnsRecordKind::Txt => {
            record
                .resolved
                .txt
                .extend(items.iter().filter_map(txt_string));
        }
    }
}

/// A record-type key's values: a list as-is, a scalar as a one-item list.
fn values_of(entry: Option<&Value>) -> Vec<Value> {
    match entry {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other.clone()],
    }
}

/// Render an MX entry as `"<preference> <exchange>"`.
fn mx_string(value: &Value) -> Option<String> {
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            let preference = scalar_string(&pair[0])?;
            let exchange = scalar_string(&pair[1])?;
            Some(format!("{preference} {exchange}"))
        }
        Value::Object(map) => {
            let preference = map.get("preference").and_then(scalar_string)?;
            let exchange = map.get("exchange").and_then(scalar_string)?;
            Some(format!("{preference} {exchange}"))
        }
        other => scalar_string(other),
    }
}

/// Render a TXT entry, concatenating multi-string values.
fn txt_string(value: &Value) -> Option<String> {
    match value {
        Value::Array(parts) => {
            let joined: String = parts.iter().filter_map(scalar_string).collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        other => scalar_string(other),
    }
}
