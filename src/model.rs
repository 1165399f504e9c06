use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Transport mode of a movement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Container,
    Bulk,
    Land,
    Lct,
}

impl TransportMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "container" => Some(Self::Container),
            "bulk" => Some(Self::Bulk),
            "land" => Some(Self::Land),
            "lct" => Some(Self::Lct),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Bulk => write!(f, "bulk"),
            Self::Land => write!(f, "land"),
            Self::Lct => write!(f, "lct"),
        }
    }
}

/// One normalized logistics movement unit.
///
/// `flow_code` is the effective (possibly overridden) classification, always
/// in [0,4]. `flow_code_original` and `override_reason` are both present or
/// both absent; they are set only when a site override changed the code.
#[derive(Debug, Clone, Serialize)]
pub struct FlowRecord {
    pub flow_id: String,
    pub transport_mode: TransportMode,
    pub wh_handling: u32,
    pub offshore_flag: bool,
    pub is_pre_arrival: bool,
    pub final_location: Option<String>,
    pub flow_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_code_original: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    /// Raw row fields, preserved for identity rules and subject derivation.
    #[serde(skip)]
    pub fields: HashMap<String, String>,
}

impl FlowRecord {
    /// Raw field value, empty string when the column is absent or blank.
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Pre-loaded record batch plus the column header it was loaded with.
/// Rule column-presence checks are batch-level, so the header travels with
/// the records.
#[derive(Debug, Clone)]
pub struct FlowInput {
    pub columns: Vec<String>,
    pub records: Vec<FlowRecord>,
}

// ---------------------------------------------------------------------------
// Identity clustering
// ---------------------------------------------------------------------------

/// One record→cluster assignment produced by the winning identity rule.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAssignment {
    pub row_index: usize,
    pub cluster_id: String,
    pub cluster_type: String,
    pub rule_name: String,
}

/// Records judged to be the same identity, rows in input order.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub cluster_id: String,
    pub cluster_type: String,
    pub rule_name: String,
    pub rows: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Linkset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Membership,
    EquivalentTo,
}

/// One graph edge handed to the serialization collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct LinkEdge {
    pub kind: LinkKind,
    pub subject: String,
    pub object: String,
    pub cluster_type: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Linkset {
    pub edges: Vec<LinkEdge>,
    pub cluster_count: usize,
    pub member_count: usize,
    /// Members with no derivable subject. Still counted in their cluster.
    pub excluded_members: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Read-only QA output. Violations are data for the caller, never corrected.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid_count: usize,
    pub violations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FlowSummary {
    pub total_records: usize,
    pub code_counts: BTreeMap<String, usize>,
    pub mode_counts: BTreeMap<String, usize>,
    pub overrides_applied: usize,
    pub pre_arrival: usize,
    pub clustered_records: usize,
    pub unclustered_records: usize,
    pub cluster_count: usize,
    pub membership_edges: usize,
    pub equivalence_edges: usize,
    /// Rules skipped batch-wide because a required column was absent.
    pub rules_skipped: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub rule_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowResult {
    pub meta: FlowMeta,
    pub summary: FlowSummary,
    pub records: Vec<FlowRecord>,
    pub assignments: Vec<ClusterAssignment>,
    pub clusters: Vec<Cluster>,
    pub linkset: Linkset,
}

impl FlowResult {
    /// Pretty JSON for the downstream serialization collaborator.
    pub fn to_json(&self) -> Result<String, crate::error::FlowError> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::FlowError::Io(e.to_string()))
    }
}
