//! Identity rule engine — evaluates configured clustering rules in order,
//! first matching rule wins per record.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::config::{IdentityRule, RuleKind};
use crate::ident::cluster_id;
use crate::model::{ClusterAssignment, FlowRecord};

/// Output of one identity pass: assignments in input record order, plus the
/// rules skipped batch-wide because a required column was absent.
#[derive(Debug, Default)]
pub struct IdentityOutput {
    pub assignments: Vec<ClusterAssignment>,
    pub skipped_rules: Vec<String>,
}

/// Evaluate rules in configuration order against each record.
///
/// A rule whose required columns are missing from the batch header is skipped
/// for the entire run, not per row. Records matching no rule are absent from
/// the output.
pub fn compute_clusters(
    columns: &[String],
    records: &[FlowRecord],
    rules: &[IdentityRule],
) -> IdentityOutput {
    let has_column = |name: &str| columns.iter().any(|c| c == name);

    let mut active: Vec<&IdentityRule> = Vec::new();
    let mut skipped_rules = Vec::new();
    for rule in rules {
        let present = match &rule.kind {
            RuleKind::SimpleKey { when } => when.iter().all(|c| has_column(c)),
            RuleKind::Temporal {
                rotation_column,
                timestamp_column,
                ..
            } => has_column(rotation_column) && has_column(timestamp_column),
        };
        if present {
            active.push(rule);
        } else {
            skipped_rules.push(rule.name.clone());
        }
    }

    let mut assignments = Vec::new();
    for (row_index, record) in records.iter().enumerate() {
        for rule in &active {
            if let Some(id) = evaluate(rule, record) {
                assignments.push(ClusterAssignment {
                    row_index,
                    cluster_id: id,
                    cluster_type: rule.cluster_as.clone(),
                    rule_name: rule.name.clone(),
                });
                break;
            }
        }
    }

    IdentityOutput {
        assignments,
        skipped_rules,
    }
}

fn evaluate(rule: &IdentityRule, record: &FlowRecord) -> Option<String> {
    match &rule.kind {
        RuleKind::SimpleKey { when } => {
            let parts: Vec<&str> = when.iter().map(|c| record.field(c)).collect();
            // Blank values stay in the key, but a fully blank key would lump
            // unrelated records into one cluster; fall through instead.
            if parts.iter().all(|p| p.is_empty()) {
                return None;
            }
            Some(cluster_id(&rule.name, &parts))
        }
        RuleKind::Temporal {
            rotation_column,
            timestamp_column,
            window_days,
            ..
        } => {
            let rotation = record.field(rotation_column);
            if rotation.is_empty() {
                return None;
            }
            let date = parse_day(record.field(timestamp_column))?;
            let bucket = window_start(date, *window_days);
            Some(cluster_id(&rule.name, &[rotation, &bucket.to_string()]))
        }
    }
}

/// Truncate a timestamp value to day granularity. Accepts the formats the
/// ingestion collaborator emits; anything else makes the record fall through
/// to later rules.
fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Window start: subtract `day_of_year mod window_days` days.
///
/// Window origins reset at each year boundary, so buckets spanning Jan 1 can
/// be narrower than `window_days`. Kept as-is for id stability with prior
/// runs.
fn window_start(date: NaiveDate, window_days: u32) -> NaiveDate {
    let offset = date.ordinal() % window_days;
    date - Duration::days(i64::from(offset))
}
