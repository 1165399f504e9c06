//! Deterministic identifier generation.

use sha2::{Digest, Sha256};

/// Fixed namespace for cluster identifiers. Changing it changes every id.
const CLUSTER_NAMESPACE: &str = "shipflow/cluster/v1";

/// Deterministic cluster id: SHA-256 of namespace, rule name and ordered key
/// parts joined by newlines, truncated to 32 hex chars.
///
/// Empty parts are hashed as empty strings rather than omitted, so the key
/// shape is stable. No process-wide state is involved: the same inputs yield
/// the same id in this run and any future run.
pub fn cluster_id(rule_name: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(CLUSTER_NAMESPACE.as_bytes());
    hasher.update(b"\n");
    hasher.update(rule_name.as_bytes());
    for part in parts {
        hasher.update(b"\n");
        hasher.update(part.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_identical_id() {
        let a = cluster_id("project_case", &["P100", "C-42"]);
        let b = cluster_id("project_case", &["P100", "C-42"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_values_different_id() {
        let a = cluster_id("project_case", &["P100", "C-42"]);
        let b = cluster_id("project_case", &["P100", "C-43"]);
        assert_ne!(a, b);
    }

    #[test]
    fn rule_name_partitions_ids() {
        let a = cluster_id("rule_a", &["P100", "C-42"]);
        let b = cluster_id("rule_b", &["P100", "C-42"]);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_parts_are_significant() {
        let a = cluster_id("r", &["x", ""]);
        let b = cluster_id("r", &["", "x"]);
        assert_ne!(a, b);
    }
}
