//! Structured WHOIS normalizer (whoisxml-style responses).
//!
//! Domain lookups arrive as:
//!
//! ```json
//! {
//!   "WhoisRecord": {
//!     "registrarName": "Example Registrar, Inc.",
//!     "registryData": {"createdDate": "...", "updatedDate": "...", "expiresDate": "..."},
//!     "registrant": {"organization": "...", "country": "US", "email": "..."},
//!     "administrativeContact": {"email": "..."},
//!     "nameServers": {"hostNames": ["ns1.example.com"]}
//!   }
//! }
//! ```
//!
//! IP lookups use the flatter `IpWhoisRecord` shape handled by
//! [`normalize_whois_ip`].

use crate::normalize::{push_unique, scalar_string};
use crate::record::CanonicalRecord;
use serde_json::Value;
use umbra_core::TargetType;

/// Normalize a structured domain WHOIS response.
#[must_use]
pub fn normalize_whois(resp: &Value, target: &str) -> CanonicalRecord {
    let mut record = CanonicalRecord::new("whois", target, TargetType::Domain);

    let whois_record = resp.get("WhoisRecord").cloned().unwrap_or(Value::Null);

    record.whois.registrar = whois_record.get("registrarName").and_then(scalar_string);

    if let Some(registrant) = whois_record.get("registrant").and_then(Value::as_object) {
        record.whois.org = registrant.get("organization").and_then(scalar_string);
        record.whois.country = registrant.get("country").and_then(scalar_string);

        if let Some(email) = registrant.get("email").and_then(scalar_string) {
            push_unique(&mut record.whois.emails, email);
        }
    }

    for contact_type in ["administrativeContact", "technicalContact", "billingContact"] {
        if let Some(contact) = whois_record.get(contact_type).and_then(Value::as_object) {
            if let Some(email) = contact.get("email").and_then(scalar_string) {
                push_unique(&mut record.whois.emails, email);
            }
        }
    }

    if let Some(registry) = whois_record.get("registryData").and_then(Value::as_object) {
        record.whois.created = registry.get("createdDate").and_then(scalar_string);
        record.whois.updated = registry.get("updatedDate").and_then(scalar_string);
        record.whois.expires = registry.get("expiresDate").and_then(scalar_string);
    }

    // Fall back to top-level dates when registry data is absent
    if record.whois.created.is_none() {
        record.whois.created = whois_record.get("createdDate").and_then(scalar_string);
    }
    if record.whois.updated.is_none() {
        record.whois.updated = whois_record.get("updatedDate").and_then(scalar_string);
    }
    if record.whois.expires.is_none() {
        record.whois.expires = whois_record.get("expiresDate").and_then(scalar_string);
    }

    if let Some(host_names) = whois_record
        .get("nameServers")
        .and_then(|ns| ns.get("hostNames"))
        .and_then(Value::as_array)
    {
        record.resolved.ns = host_names.iter().filter_map(scalar_string).collect();
    }

    // Alternative name server format
    if record.resolved.ns.is_empty() {
        if let Some(ns_list) = whois_record.get("nameServersList").and_then(Value::as_array) {
            record.resolved.ns = ns_list.iter().filter_map(scalar_string).collect();
        }
    }

    // Contact country stands in when the registrant omits one
    if record.whois.country.is_none() {
        record.whois.country = whois_record
            .get("administrativeContact")
            .and_then(|c| c.get("country"))
            .and_then(scalar_string);
    }

    record.raw = resp.clone();
    record
}

/// Normalize a structured IP WHOIS response (`IpWhoisRecord` shape).
#[must_use]
pub fn normalize_whois_ip(resp: &Value, target: &str) -> CanonicalRecord {
    let mut record = CanonicalRecord::new("whois", target, TargetType::Ip);

    let ip_whois = resp.get("IpWhoisRecord").cloned().unwrap_or(Value::Null);

    record.network.isp = ip_whois.get("org").and_then(scalar_string);
    record.whois.org = ip_whois
        .get("orgName")
        .and_then(scalar_string)
        .or_else(|| ip_whois.get("org").and_then(scalar_string));

    record.network.country = ip_whois.get("country").and_then(scalar_string);
    record.whois.country = ip_whois.get("country").and_then(scalar_string);

    if let Some(asn) = ip_whois.get("asn").and_then(scalar_string) {
        record.network.asn = Some(if asn.starts_with("AS") {
            asn
        } else {
            format!("AS{asn}")
        });
    }

    record.network.asn_name = ip_whois.get("asnName").and_then(scalar_string);
    record.network.city = ip_whois.get("city").and_then(scalar_string);
    record.network.region = ip_whois.get("region").and_then(scalar_string);

    if let Some(contacts) = ip_whois.get("contacts").and_then(Value::as_array) {
        for contact in contacts {
            if let Some(email) = contact.get("email").and_then(scalar_string) {
                push_unique(&mut record.whois.emails, email);
            }
        }
    }

    record.whois.created = ip_whois.get("createdDate").and_then(scalar_string);
    record.whois.updated = ip_whois.get("updatedDate").and_then(scalar_string);

    record.raw = resp.clone();
    record
}

/// Check whether a payload looks like a structured WHOIS response.
#[must_use]
pub fn is_whois_response(data: &Value) -> bool {
    data.as_object()
        .is_some_and(|map| map.contains_key("WhoisRecord") || map.contains_key("IpWhoisRecord"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_domain_record() {
        let resp = json!({
            "WhoisRecord": {
                "domainName": "example.com",
                "registrarName": "Example Registrar, Inc.",
                "registryData": {
                    "createdDate": "1995-08-14T04:00:00Z",
                    "updatedDate": "2023-08-14T07:01:31Z",
                    "expiresDate": "2024-08-13T04:00:00Z"
                },
                "registrant": {
                    "organization": "Example Organization",
                    "country": "US",
                    "email": "admin@example.com"
                },
                "administrativeContact": {"email": "admin@example.com"},
                "technicalContact": {"email": "tech@example.com"},
                "nameServers": {"hostNames": ["ns1.example.com", "ns2.example.com"]}
            }
        });

        let record = normalize_whois(&resp, "example.com");

        assert_eq!(record.whois.registrar.as_deref(), Some("Example Registrar, Inc."));
        assert_eq!(record.whois.org.as_deref(), Some("Example Organization"));
        assert_eq!(record.whois.country.as_deref(), Some("US"));
        // Duplicate admin email collapsed
        assert_eq!(
            record.whois.emails,
            vec!["admin@example.com", "tech@example.com"]
        );
        assert_eq!(record.whois.created.as_deref(), Some("1995-08-14T04:00:00Z"));
        assert_eq!(record.resolved.ns, vec!["ns1.example.com", "ns2.example.com"]);
    }

    #[test]
    fn test_top_level_date_fallback() {
        let resp = json!({
            "WhoisRecord": {
                "registrarName": "R",
                "createdDate": "2001-01-01",
                "updatedDate": "2020-06-01",
                "expiresDate": "2030-01-01"
            }
        });

        let record = normalize_whois(&resp, "example.com");

        assert_eq!(record.whois.created.as_deref(), Some("2001-01-01"));
        assert_eq!(record.whois.updated.as_deref(), Some("2020-06-01"));
        assert_eq!(record.whois.expires.as_deref(), Some("2030-01-01"));
    }

    #[test]
    fn test_name_servers_list_fallback() {
        let resp = json!({
            "WhoisRecord": {"nameServersList": ["ns9.example.net"]}
        });

        let record = normalize_whois(&resp, "example.com");
        assert_eq!(record.resolved.ns, vec!["ns9.example.net"]);
    }

    #[test]
    fn test_admin_country_fallback() {
        let resp = json!({
            "WhoisRecord": {
                "administrativeContact": {"country": "DE", "email": "ops@example.de"}
            }
        });

        let record = normalize_whois(&resp, "example.de");
        assert_eq!(record.whois.country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_ip_whois_record() {
        let resp = json!({
            "IpWhoisRecord": {
                "org": "GOGL",
                "orgName": "Google LLC",
                "country": "US",
                "asn": 15169,
                "asnName": "GOOGLE",
                "city": "Mountain View",
                "region": "California",
                "contacts": [
                    {"email": "noc@google.com"},
                    {"email": "noc@google.com"},
                    {"name": "no email here"}
                ],
                "createdDate": "2000-03-30",
                "updatedDate": "2019-10-31"
            }
        });

        let record = normalize_whois_ip(&resp, "8.8.8.8");

        assert_eq!(record.target_type, TargetType::Ip);
        assert_eq!(record.network.isp.as_deref(), Some("GOGL"));
        assert_eq!(record.whois.org.as_deref(), Some("Google LLC"));
        assert_eq!(record.network.asn.as_deref(), Some("AS15169"));
        assert_eq!(record.network.asn_name.as_deref(), Some("GOOGLE"));
        assert_eq!(record.whois.emails, vec!["noc@google.com"]);
        assert_eq!(record.whois.created.as_deref(), Some("2000-03-30"));
    }

    #[test]
    fn test_malformed_payload_kept_as_raw() {
        let resp = json!({"unexpected": true});
        let record = normalize_whois(&resp, "example.com");

        assert!(record.whois.registrar.is_none());
        assert!(record.resolved.ns.is_empty());
        assert_eq!(record.raw, resp);
        assert!(record.validate());
    }

    #[test]
    fn test_is_whois_response() {
        assert!(is_whois_response(&json!({"WhoisRecord": {}})));
        assert!(is_whois_response(&json!({"IpWhoisRecord": {}})));
        assert!(!is_whois_response(&json!({"data": {}})));
    }
}
