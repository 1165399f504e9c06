use std::collections::BTreeMap;

use crate::model::{Cluster, ClusterAssignment};

/// Explicit accumulator for cluster membership.
///
/// Keyed by cluster id. Merge is associative, so maps built from separate
/// assignment slices combine into the same result as one pass over the
/// concatenation. Rows are kept deduplicated in ascending (input) order.
#[derive(Debug, Default)]
pub struct ClusterMap {
    groups: BTreeMap<String, Cluster>,
}

impl ClusterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, assignment: &ClusterAssignment) {
        let entry = self
            .groups
            .entry(assignment.cluster_id.clone())
            .or_insert_with(|| Cluster {
                cluster_id: assignment.cluster_id.clone(),
                cluster_type: assignment.cluster_type.clone(),
                rule_name: assignment.rule_name.clone(),
                rows: Vec::new(),
            });
        if !entry.rows.contains(&assignment.row_index) {
            entry.rows.push(assignment.row_index);
        }
    }

    pub fn merge(&mut self, other: ClusterMap) {
        for (id, cluster) in other.groups {
            match self.groups.get_mut(&id) {
                Some(existing) => {
                    for row in cluster.rows {
                        if !existing.rows.contains(&row) {
                            existing.rows.push(row);
                        }
                    }
                    existing.rows.sort_unstable();
                }
                None => {
                    self.groups.insert(id, cluster);
                }
            }
        }
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.groups.into_values().collect()
    }
}

/// Group a flat assignment list into clusters, ordered by cluster id.
pub fn assign_clusters(assignments: &[ClusterAssignment]) -> Vec<Cluster> {
    let mut map = ClusterMap::new();
    for assignment in assignments {
        map.insert(assignment);
    }
    map.into_clusters()
}
