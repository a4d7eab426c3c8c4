//! The record merge engine.
//!
//! Combines canonical records from different providers into a single,
//! deduplicated record with deterministic tie-break rules: first-seen order
//! for lists, first non-empty for scalars, earliest created / latest
//! updated dates, maximum risk score, any-malicious.

use crate::record::{CanonicalRecord, NetworkData, ResolvedData, RiskData, WhoisData, MERGED_SOURCE};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use umbra_core::TargetType;

/// Date formats tried, in order, when comparing WHOIS date strings.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d", "%Y-%m-%dT%H:%M:%S"];

/// Merge canonical records from multiple providers into one.
///
/// A single-record input is returned unchanged, source included. Invalid
/// records (empty source or target) are dropped silently; when none
/// survive, an empty merged record is returned. The merged record takes
/// its target and type from the first valid record and its `raw` field
/// maps each contributing source to that record's raw payload.
#[must_use]
pub fn merge_records(records: &[CanonicalRecord]) -> CanonicalRecord {
    if records.is_empty() {
        warn!("merge_records called with empty list");
        return CanonicalRecord::new(MERGED_SOURCE, "", TargetType::Domain);
    }

    if records.len() == 1 {
        debug!(source = %records[0].source, "only one record to merge");
        return records[0].clone();
    }

    let valid: Vec<&CanonicalRecord> = records.iter().filter(|r| r.validate()).collect();

    if valid.is_empty() {
        warn!("no valid records to merge");
        return CanonicalRecord::new(MERGED_SOURCE, "", TargetType::Domain);
    }

    let base = valid[0];
    let mut merged = CanonicalRecord::new(MERGED_SOURCE, base.target.clone(), base.target_type);

    merged.resolved = merge_resolved(&valid);
    merged.whois = merge_whois(&valid);
    merged.network = merge_network(&valid);
    merged.risk = merge_risk(&valid);
    merged.raw = merge_raw(&valid);

    info!(count = valid.len(), target = %merged.target, "merged records");

    merged
}

fn merge_resolved(records: &[&CanonicalRecord]) -> ResolvedData {
    let mut merged = ResolvedData::default();
    let mut seen_ip = HashSet::new();
    let mut seen_mx = HashSet::new();
    let mut seen_ns = HashSet::new();
    let mut seen_txt = HashSet::new();

    for record in records {
        extend_unique(&mut merged.ip, &mut seen_ip, &record.resolved.ip);
        extend_unique(&mut merged.mx, &mut seen_mx, &record.resolved.mx);
        extend_unique(&mut merged.ns, &mut seen_ns, &record.resolved.ns);
        extend_unique(&mut merged.txt, &mut seen_txt, &record.resolved.txt);
    }

    merged
}

fn merge_whois(records: &[&CanonicalRecord]) -> WhoisData {
    let mut merged = WhoisData::default();
    let mut seen_emails = HashSet::new();

    let mut created_dates = Vec::new();
    let mut updated_dates = Vec::new();
    let mut expires_dates = Vec::new();

    for record in records {
        let whois = &record.whois;

        if merged.registrar.is_none() {
            merged.registrar = non_empty(&whois.registrar);
        }
        if merged.org.is_none() {
            merged.org = non_empty(&whois.org);
        }
        if merged.country.is_none() {
            merged.country = non_empty(&whois.country);
        }

        extend_unique(&mut merged.emails, &mut seen_emails, &whois.emails);

        if let Some(created) = non_empty(&whois.created) {
            created_dates.push(created);
        }
        if let Some(updated) = non_empty(&whois.updated) {
            updated_dates.push(updated);
        }
        if let Some(expires) = non_empty(&whois.expires) {
            expires_dates.push(expires);
        }
    }

    merged.created = select_earliest_date(&created_dates);
    merged.updated = select_latest_date(&updated_dates);
    merged.expires = select_latest_date(&expires_dates);

    merged
}

fn merge_network(records: &[&CanonicalRecord]) -> NetworkData {
    let mut merged = NetworkData::default();

    for record in records {
        let network = &record.network;

        if merged.asn.is_none() {
            merged.asn = non_empty(&network.asn);
        }
        if merged.asn_name.is_none() {
            merged.asn_name = non_empty(&network.asn_name);
        }
        if merged.isp.is_none() {
            merged.isp = non_empty(&network.isp);
        }
        if merged.city.is_none() {
            merged.city = non_empty(&network.city);
        }
        if merged.region.is_none() {
            merged.region = non_empty(&network.region);
        }
        if merged.country.is_none() {
            merged.country = non_empty(&network.country);
        }
    }

    merged
}

fn merge_risk(records: &[&CanonicalRecord]) -> RiskData {
    let mut merged = RiskData::default();
    let mut seen_categories = HashSet::new();

    for record in records {
        let risk = &record.risk;

        // Maximum score across providers is the most conservative estimate
        if let Some(score) = risk.score {
            merged.score = Some(merged.score.map_or(score, |current: f64| current.max(score)));
        }

        extend_unique(&mut merged.categories, &mut seen_categories, &risk.categories);

        if risk.malicious {
            merged.malicious = true;
        }
    }

    merged
}

fn merge_raw(records: &[&CanonicalRecord]) -> Value {
    let mut merged = Map::new();

    for record in records {
        if record.has_raw() {
            merged.insert(record.source.clone(), record.raw.clone());
        }
    }

    Value::Object(merged)
}

fn extend_unique(dst: &mut Vec<String>, seen: &mut HashSet<String>, items: &[String]) {
    for item in items {
        if !item.is_empty() && seen.insert(item.clone()) {
            dst.push(item.clone());
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Parse a date string with the known formats, in order.
fn parse_date(value: &str) -> Option<NaiveDateTime> {
    for format in DATE_FORMATS {
        if format == "%Y-%m-%d" {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date.and_time(NaiveTime::MIN));
            }
        } else if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }
    None
}

/// Earliest parseable date string; when nothing parses, the first
/// collected string is returned as-is.
fn select_earliest_date(dates: &[String]) -> Option<String> {
    select_date(dates, |a, b| a < b)
}

/// Latest parseable date string; when nothing parses, the first
/// collected string is returned as-is.
fn select_latest_date(dates: &[String]) -> Option<String> {
    select_date(dates, |a, b| a > b)
}

fn select_date(dates: &[String], better: impl Fn(NaiveDateTime, NaiveDateTime) -> bool) -> Option<String> {
    if dates.is_empty() {
        return None;
    }

    let mut best: Option<(NaiveDateTime, &String)> = None;
    for date in dates {
        if let Some(parsed) = parse_date(date) {
            match best {
                Some((current, _)) if !better(parsed, current) => {}
                _ => best = Some((parsed, date)),
            }
        }
    }

    match best {
        Some((_, date)) => Some(date.clone()),
        // Nothing parsed: keep the first string rather than dropping the
        // field, even though a later record might have parsed
        None => dates.first().cloned(),
    }
}
