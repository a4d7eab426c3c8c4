//! Named scan profiles.
//!
//! A profile is a reusable named subset of providers. The sentinel entry
//! `"all"` expands to every currently-registered provider at resolution
//! time.

use std::collections::HashMap;

/// Sentinel provider entry meaning "every registered provider".
pub const ALL_PROVIDERS: &str = "all";

/// Name of the fast profile.
pub const FAST: &str = "fast";
/// Name of the full profile.
pub const FULL: &str = "full";
/// Name of the privacy profile.
pub const PRIVACY: &str = "privacy";

/// Table of named provider subsets.
///
/// Ships with the built-in `fast`, `full` and `privacy` profiles; callers
/// may add or override named profiles before handing the table to the
/// orchestrator.
#[derive(Clone, Debug)]
pub struct ScanProfiles {
    profiles: HashMap<String, Vec<String>>,
}

impl Default for ScanProfiles {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            FAST.to_string(),
            vec![
                "dns".to_string(),
                "passive_dns".to_string(),
                "whois".to_string(),
                "tor_check".to_string(),
            ],
        );
        profiles.insert(FULL.to_string(), vec![ALL_PROVIDERS.to_string()]);
        profiles.insert(
            PRIVACY.to_string(),
            vec!["tor_check".to_string(), "dns".to_string()],
        );
        Self { profiles }
    }
}

impl ScanProfiles {
    /// Create the built-in profile table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider list for a profile, falling back to `full` for unknown names.
    #[must_use]
    pub fn providers_for(&self, profile: &str) -> Vec<String> {
        self.profiles
            .get(profile)
            .or_else(|| self.profiles.get(FULL))
            .cloned()
            .unwrap_or_default()
    }

    /// Provider list for a profile, or `None` when the name is unknown.
    #[must_use]
    pub fn get(&self, profile: &str) -> Option<&[String]> {
        self.profiles.get(profile).map(Vec::as_slice)
    }

    /// Add or replace a named profile.
    pub fn insert(&mut self, name: impl Into<String>, providers: Vec<String>) {
        self.profiles.insert(name.into(), providers);
    }

    /// Names of all known profiles, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether a profile name is defined.
    #[must_use]
    pub fn contains(&self, profile: &str) -> bool {
        self.profiles.contains_key(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let profiles = ScanProfiles::new();

        assert_eq!(
            profiles.providers_for(FAST),
            vec!["dns", "passive_dns", "whois", "tor_check"]
        );
        assert_eq!(profiles.providers_for(FULL), vec![ALL_PROVIDERS]);
        assert_eq!(profiles.providers_for(PRIVACY), vec!["tor_check", "dns"]);
    }

    #[test]
    fn test_unknown_profile_falls_back_to_full() {
        let profiles = ScanProfiles::new();
        assert_eq!(profiles.providers_for("nonsense"), vec![ALL_PROVIDERS]);
        assert!(profiles.get("nonsense").is_none());
    }

    #[test]
    fn test_caller_defined_profile() {
        let mut profiles = ScanProfiles::new();
        profiles.insert("web", vec!["dns".to_string(), "http_fingerprint".to_string()]);

        assert!(profiles.contains("web"));
        assert_eq!(profiles.providers_for("web"), vec!["dns", "http_fingerprint"]);
    }

    #[test]
    fn test_override_builtin() {
        let mut profiles = ScanProfiles::new();
        profiles.insert(FAST, vec!["dns".to_string()]);
        assert_eq!(profiles.providers_for(FAST), vec!["dns"]);
    }

    #[test]
    fn test_names_sorted() {
        let profiles = ScanProfiles::new();
        assert_eq!(profiles.names(), vec!["fast", "full", "privacy"]);
    }
}
