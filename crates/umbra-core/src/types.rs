//! Shared types used across the umbra workspace.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::UmbraError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for provider identifiers with validation.
///
/// Provider IDs must be lowercase alphanumeric with underscores,
/// 2-50 characters (e.g. `dns`, `passive_dns`, `tor_check`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a new `ProviderId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, UmbraError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate provider ID format: lowercase alphanumeric with underscores, 2-50 chars.
    fn validate(id: &str) -> Result<(), UmbraError> {
        static PROVIDER_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PROVIDER_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_]*[a-z0-9]$").expect("valid regex"));

        if id.len() < 2 || id.len() > 50 {
            return Err(UmbraError::Validation(format!(
                "invalid provider ID: must be 2-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(UmbraError::Validation(format!(
                "invalid provider ID: must be lowercase alphanumeric with underscores, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of scan target.
///
/// Every canonical record carries one of these three values; normalizers
/// infer it from the target string when the provider doesn't say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// A DNS domain name
    #[default]
    Domain,
    /// An IP address
    Ip,
    /// A full URL
    Url,
}

impl TargetType {
    /// Infer the target type from the target string.
    ///
    /// URLs are recognized by scheme prefix, IPv4 addresses by dotted-quad
    /// shape; everything else is treated as a domain.
    #[must_use]
    pub fn infer(target: &str) -> Self {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Self::Url;
        }

        let parts: Vec<&str> = target.split('.').collect();
        if parts.len() == 4 && parts.iter().all(|p| p.parse::<u8>().is_ok()) {
            return Self::Ip;
        }

        Self::Domain
    }

    /// String form as used in serialized records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Ip => "ip",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_valid() {
        for id in ["dns", "passive_dns", "tor_check", "whoisxml", "ip2"] {
            assert!(ProviderId::new(id).is_ok(), "expected '{id}' to be valid");
        }
    }

    #[test]
    fn test_provider_id_invalid() {
        for id in ["", "x", "DNS", "has space", "-leading", "trailing_", "a"] {
            assert!(ProviderId::new(id).is_err(), "expected '{id}' to be rejected");
        }
    }

    #[test]
    fn test_provider_id_display() {
        let id = ProviderId::new("virustotal").expect("valid provider ID");
        assert_eq!(id.to_string(), "virustotal");
        assert_eq!(id.as_str(), "virustotal");
    }

    #[test]
    fn test_target_type_infer() {
        assert_eq!(TargetType::infer("example.com"), TargetType::Domain);
        assert_eq!(TargetType::infer("8.8.8.8"), TargetType::Ip);
        assert_eq!(TargetType::infer("https://example.com/x"), TargetType::Url);
        assert_eq!(TargetType::infer("http://8.8.8.8"), TargetType::Url);
        // Out-of-range octets are not an IP
        assert_eq!(TargetType::infer("999.1.1.1"), TargetType::Domain);
    }

    #[test]
    fn test_target_type_serde() {
        let json = serde_json::to_string(&TargetType::Ip).expect("serialize");
        assert_eq!(json, "\"ip\"");
        let back: TargetType = serde_json::from_str("\"domain\"").expect("deserialize");
        assert_eq!(back, TargetType::Domain);
    }
}
