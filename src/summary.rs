use std::collections::BTreeMap;

use crate::model::{Cluster, ClusterAssignment, FlowRecord, FlowSummary, LinkKind, Linkset};

/// Compute run evidence from the outputs of both pipelines.
pub fn compute_summary(
    records: &[FlowRecord],
    assignments: &[ClusterAssignment],
    clusters: &[Cluster],
    linkset: &Linkset,
    skipped_rules: &[String],
) -> FlowSummary {
    let mut code_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut mode_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut overrides_applied = 0;
    let mut pre_arrival = 0;

    for record in records {
        *code_counts.entry(record.flow_code.to_string()).or_insert(0) += 1;
        *mode_counts
            .entry(record.transport_mode.to_string())
            .or_insert(0) += 1;
        if record.flow_code_original.is_some() {
            overrides_applied += 1;
        }
        if record.is_pre_arrival {
            pre_arrival += 1;
        }
    }

    let membership_edges = linkset
        .edges
        .iter()
        .filter(|e| e.kind == LinkKind::Membership)
        .count();

    FlowSummary {
        total_records: records.len(),
        code_counts,
        mode_counts,
        overrides_applied,
        pre_arrival,
        clustered_records: assignments.len(),
        unclustered_records: records.len() - assignments.len(),
        cluster_count: clusters.len(),
        membership_edges,
        equivalence_edges: linkset.edges.len() - membership_edges,
        rules_skipped: skipped_rules.to_vec(),
    }
}
