//! Linkset building — turns cluster membership into graph edges.

use crate::config::LinksetConfig;
use crate::model::{Cluster, FlowRecord, LinkEdge, LinkKind, Linkset};

/// Derive the graph subject for one member record.
///
/// Priority: project + case, then bill-of-lading + container, then
/// bill-of-lading alone. Members with none of these contribute no subject.
fn subject_for(record: &FlowRecord, config: &LinksetConfig) -> Option<String> {
    let project = record.field(&config.project_column);
    let case = record.field(&config.case_column);
    if !project.is_empty() && !case.is_empty() {
        return Some(format!("{project}_{case}"));
    }

    let bol = record.field(&config.bol_column);
    let container = record.field(&config.container_column);
    if !bol.is_empty() && !container.is_empty() {
        return Some(format!("{bol}_{container}"));
    }
    if !bol.is_empty() {
        return Some(bol.to_string());
    }

    None
}

/// Build membership and equivalence edges for every cluster.
///
/// Each included subject gets one membership edge to the synthesized cluster
/// node. Equivalence is a star: the first included member (row order) is the
/// hub and every later member links to it once — not a pairwise closure, so
/// equivalence between two non-hub members goes through the hub.
pub fn build_linkset(
    clusters: &[Cluster],
    records: &[FlowRecord],
    config: &LinksetConfig,
) -> Linkset {
    let mut edges = Vec::new();
    let mut member_count = 0;
    let mut excluded_members = 0;

    for cluster in clusters {
        let cluster_node = format!("cluster:{}", cluster.cluster_id);
        let mut hub: Option<String> = None;

        for &row in &cluster.rows {
            member_count += 1;
            let subject = records.get(row).and_then(|r| subject_for(r, config));
            let Some(subject) = subject else {
                excluded_members += 1;
                continue;
            };

            edges.push(LinkEdge {
                kind: LinkKind::Membership,
                subject: subject.clone(),
                object: cluster_node.clone(),
                cluster_type: cluster.cluster_type.clone(),
            });

            if let Some(h) = &hub {
                // Same subject as the hub gets no self-edge.
                if subject != *h {
                    edges.push(LinkEdge {
                        kind: LinkKind::EquivalentTo,
                        subject,
                        object: h.clone(),
                        cluster_type: cluster.cluster_type.clone(),
                    });
                }
            } else {
                hub = Some(subject);
            }
        }
    }

    Linkset {
        edges,
        cluster_count: clusters.len(),
        member_count,
        excluded_members,
    }
}
