//! Consistency validation — recomputes expected codes and reports mismatches.
//!
//! Read-only QA: never corrects. A mismatch may be a stale batch or
//! hand-verified data worth keeping; that call belongs to the caller.

use crate::classify::{apply_override, classify};
use crate::config::OverrideConfig;
use crate::model::{FlowRecord, ValidationReport};

/// Recompute every record's expected effective code (classification plus
/// site override, ignoring any stored override fields) and compare it to the
/// stored `flow_code`.
pub fn validate(records: &[FlowRecord], config: &OverrideConfig) -> ValidationReport {
    let mut valid_count = 0;
    let mut violations = Vec::new();

    for record in records {
        let computed = classify(
            record.wh_handling,
            record.offshore_flag,
            record.is_pre_arrival,
        );
        let expected = if record.is_pre_arrival {
            computed
        } else {
            apply_override(record.final_location.as_deref(), computed, config).effective
        };

        if record.flow_code == expected {
            valid_count += 1;
        } else {
            violations.push(format!(
                "record '{}': stored flow_code {} but expected {}",
                record.flow_id, record.flow_code, expected
            ));
        }
    }

    ValidationReport {
        valid_count,
        violations,
    }
}
