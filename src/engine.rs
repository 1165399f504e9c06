use std::collections::HashMap;

use crate::classify::{classify_records, MAX_FLOW_CODE};
use crate::cluster::assign_clusters;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::identity::compute_clusters;
use crate::linkset::build_linkset;
use crate::model::{
    FlowInput, FlowMeta, FlowRecord, FlowResult, TransportMode, ValidationReport,
};
use crate::summary::compute_summary;

/// Run both pipelines over one batch: flow-code classification with site
/// overrides, then identity clustering and linkset building.
///
/// Pure with respect to its inputs: the batch is never mutated, and an
/// unchanged batch + config yields identical flow codes and cluster ids on
/// every run.
pub fn run(config: &FlowConfig, input: &FlowInput) -> Result<FlowResult, FlowError> {
    // Callers constructing FlowConfig directly bypass from_toml, so the run
    // entry point re-checks before touching any record.
    config.validate()?;

    let records = classify_records(&input.records, &config.overrides);
    let identity = compute_clusters(&input.columns, &records, &config.rules);
    let clusters = assign_clusters(&identity.assignments);
    let linkset = build_linkset(&clusters, &records, &config.linkset);
    let summary = compute_summary(
        &records,
        &identity.assignments,
        &clusters,
        &linkset,
        &identity.skipped_rules,
    );

    Ok(FlowResult {
        meta: FlowMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            rule_count: config.rules.len(),
        },
        summary,
        records,
        assignments: identity.assignments,
        clusters,
        linkset,
    })
}

/// QA entry point over a batch that carries stored flow codes (map the
/// `flow_code` column when loading). Read-only; see [`crate::validate`].
pub fn validate_stored(config: &FlowConfig, input: &FlowInput) -> ValidationReport {
    crate::validate::validate(&input.records, &config.overrides)
}

/// Load a CSV batch, applying the configured column mapping.
///
/// Every column is preserved as a raw string field so identity rules and
/// subject derivation can reference columns the mapping does not name.
pub fn load_csv_rows(csv_data: &str, config: &FlowConfig) -> Result<FlowInput, FlowError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| FlowError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let col = &config.columns;

    let idx = |name: &str| -> Result<usize, FlowError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FlowError::MissingColumn {
                column: name.into(),
            })
    };

    let flow_id_idx = idx(&col.flow_id)?;
    let mode_idx = idx(&col.transport_mode)?;
    let wh_idx = idx(&col.wh_handling)?;
    let offshore_idx = idx(&col.offshore)?;
    let pre_arrival_idx = idx(&col.pre_arrival)?;
    let final_location_idx = idx(&col.final_location)?;
    let flow_code_idx = match &col.flow_code {
        Some(name) => Some(idx(name)?),
        None => None,
    };

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| FlowError::Io(e.to_string()))?;

        let flow_id = row.get(flow_id_idx).unwrap_or("").trim().to_string();

        let mode_value = row.get(mode_idx).unwrap_or("");
        let transport_mode =
            TransportMode::parse(mode_value).ok_or_else(|| FlowError::ModeParse {
                record: flow_id.clone(),
                value: mode_value.trim().into(),
            })?;

        // Empty hop counts mean "no warehouse handling". Anything else must
        // parse as a non-negative integer; negatives fail here rather than
        // being clipped downstream.
        let wh_value = row.get(wh_idx).unwrap_or("").trim();
        let wh_handling: u32 = if wh_value.is_empty() {
            0
        } else {
            wh_value.parse().map_err(|_| FlowError::IntParse {
                record: flow_id.clone(),
                column: col.wh_handling.clone(),
                value: wh_value.into(),
            })?
        };

        let offshore_flag = parse_flag(row.get(offshore_idx).unwrap_or("")).ok_or_else(|| {
            FlowError::BoolParse {
                record: flow_id.clone(),
                column: col.offshore.clone(),
                value: row.get(offshore_idx).unwrap_or("").into(),
            }
        })?;

        let is_pre_arrival =
            parse_flag(row.get(pre_arrival_idx).unwrap_or("")).ok_or_else(|| {
                FlowError::BoolParse {
                    record: flow_id.clone(),
                    column: col.pre_arrival.clone(),
                    value: row.get(pre_arrival_idx).unwrap_or("").into(),
                }
            })?;

        let final_location = {
            let value = row.get(final_location_idx).unwrap_or("").trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        let flow_code = match flow_code_idx {
            Some(i) => {
                let value = row.get(i).unwrap_or("").trim();
                let code: u8 = if value.is_empty() {
                    0
                } else {
                    value.parse().map_err(|_| FlowError::IntParse {
                        record: flow_id.clone(),
                        column: col.flow_code.clone().unwrap_or_default(),
                        value: value.into(),
                    })?
                };
                if code > MAX_FLOW_CODE {
                    return Err(FlowError::IntParse {
                        record: flow_id.clone(),
                        column: col.flow_code.clone().unwrap_or_default(),
                        value: value.into(),
                    });
                }
                code
            }
            None => 0,
        };

        let mut fields = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(value) = row.get(i) {
                fields.insert(header.clone(), value.trim().to_string());
            }
        }

        records.push(FlowRecord {
            flow_id,
            transport_mode,
            wh_handling,
            offshore_flag,
            is_pre_arrival,
            final_location,
            flow_code,
            flow_code_original: None,
            override_reason: None,
            fields,
        });
    }

    Ok(FlowInput {
        columns: headers,
        records,
    })
}

/// Permissive boolean: true/1/yes/y vs false/0/no/n. Blank means false.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}
