//! Geolocation/ASN normalizer (ipinfo-style responses).
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "ip": "8.8.8.8",
//!   "hostname": "dns.google",
//!   "city": "Mountain View",
//!   "region": "California",
//!   "country": "US",
//!   "org": "AS15169 Google LLC",
//!   "asn": {"asn": "AS15169", "name": "Google LLC"}
//! }
//! ```

use crate::normalize::{push_unique, scalar_string};
use crate::record::CanonicalRecord;
use serde_json::Value;
use umbra_core::TargetType;

/// Normalize a geolocation/ASN response.
#[must_use]
pub fn normalize_geoip(resp: &Value, target: &str) -> CanonicalRecord {
    let mut record = CanonicalRecord::new("geoip", target, TargetType::Ip);

    if let Some(asn) = resp.get("asn").and_then(Value::as_object) {
        record.network.asn = asn.get("asn").and_then(scalar_string);
        record.network.asn_name = asn.get("name").and_then(scalar_string);
    }

    record.network.isp = resp.get("org").and_then(scalar_string);
    record.network.city = resp.get("city").and_then(scalar_string);
    record.network.region = resp.get("region").and_then(scalar_string);
    record.network.country = resp.get("country").and_then(scalar_string);

    // Reverse-resolved hostname rides along as a best-effort hint
    if let Some(hostname) = resp.get("hostname").and_then(scalar_string) {
        push_unique(&mut record.resolved.ip, hostname);
    }

    record.raw = resp.clone();
    record
}

/// Check whether a payload looks like a geolocation/ASN response.
#[must_use]
pub fn is_geoip_response(data: &Value) -> bool {
    data.as_object().is_some_and(|map| {
        map.contains_key("ip")
            && (map.contains_key("city") || map.contains_key("org") || map.contains_key("country"))
    })
}
