use serde::Deserialize;

use crate::error::FlowError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FlowConfig {
    pub name: String,
    pub columns: ColumnMapping,
    #[serde(default, rename = "override")]
    pub overrides: OverrideConfig,
    #[serde(default)]
    pub rules: Vec<IdentityRule>,
    #[serde(default)]
    pub linkset: LinksetConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Maps engine fields to input column names.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub flow_id: String,
    pub transport_mode: String,
    pub wh_handling: String,
    pub offshore: String,
    pub pre_arrival: String,
    pub final_location: String,
    /// Stored flow code column, only needed for validation runs.
    #[serde(default)]
    pub flow_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Site override
// ---------------------------------------------------------------------------

/// Protected-site minimum-code constraint.
///
/// Cargo bound to these sites can never be recorded below `min_code`, so the
/// site set and the floor live in config rather than in the algorithm.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideConfig {
    #[serde(default = "default_protected_sites")]
    pub sites: Vec<String>,
    #[serde(default = "default_min_code")]
    pub min_code: u8,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            sites: default_protected_sites(),
            min_code: default_min_code(),
        }
    }
}

fn default_protected_sites() -> Vec<String> {
    vec!["AGI".into(), "DAS".into()]
}

fn default_min_code() -> u8 {
    3
}

// ---------------------------------------------------------------------------
// Identity rules
// ---------------------------------------------------------------------------

/// One configured clustering strategy. Rules are evaluated in file order and
/// the first rule producing a cluster id wins for a record.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRule {
    pub name: String,
    pub cluster_as: String,
    #[serde(flatten)]
    pub kind: RuleKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Cluster on the ordered concatenation of the `when` column values.
    SimpleKey { when: Vec<String> },
    /// Cluster on rotation id + day-windowed timestamp bucket.
    Temporal {
        rotation_column: String,
        timestamp_column: String,
        window_days: u32,
        /// Reserved by existing rule files; does not affect bucketing.
        #[serde(default)]
        same_port: bool,
    },
}

// ---------------------------------------------------------------------------
// Linkset
// ---------------------------------------------------------------------------

/// Columns used to derive a member record's graph subject.
#[derive(Debug, Clone, Deserialize)]
pub struct LinksetConfig {
    #[serde(default = "default_project_column")]
    pub project_column: String,
    #[serde(default = "default_case_column")]
    pub case_column: String,
    #[serde(default = "default_bol_column")]
    pub bol_column: String,
    #[serde(default = "default_container_column")]
    pub container_column: String,
}

impl Default for LinksetConfig {
    fn default() -> Self {
        Self {
            project_column: default_project_column(),
            case_column: default_case_column(),
            bol_column: default_bol_column(),
            container_column: default_container_column(),
        }
    }
}

fn default_project_column() -> String {
    "project_code".into()
}

fn default_case_column() -> String {
    "case_number".into()
}

fn default_bol_column() -> String {
    "bl_number".into()
}

fn default_container_column() -> String {
    "container_no".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl FlowConfig {
    pub fn from_toml(input: &str) -> Result<Self, FlowError> {
        let config: FlowConfig =
            toml::from_str(input).map_err(|e| FlowError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Eager validation: malformed rules fail here, before any record is
    /// processed.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.overrides.min_code > crate::classify::MAX_FLOW_CODE {
            return Err(FlowError::ConfigValidation(format!(
                "override min_code must be <= {}, got {}",
                crate::classify::MAX_FLOW_CODE,
                self.overrides.min_code
            )));
        }

        let mut seen = Vec::new();
        for rule in &self.rules {
            if rule.name.is_empty() {
                return Err(FlowError::ConfigValidation(
                    "rule with empty name".into(),
                ));
            }
            if seen.contains(&&rule.name) {
                return Err(FlowError::ConfigValidation(format!(
                    "duplicate rule name '{}'",
                    rule.name
                )));
            }
            seen.push(&rule.name);

            if rule.cluster_as.is_empty() {
                return Err(FlowError::ConfigValidation(format!(
                    "rule '{}': cluster_as must not be empty",
                    rule.name
                )));
            }

            match &rule.kind {
                RuleKind::SimpleKey { when } => {
                    if when.is_empty() {
                        return Err(FlowError::ConfigValidation(format!(
                            "rule '{}': when must list at least one column",
                            rule.name
                        )));
                    }
                    if when.iter().any(|c| c.is_empty()) {
                        return Err(FlowError::ConfigValidation(format!(
                            "rule '{}': when contains an empty column name",
                            rule.name
                        )));
                    }
                }
                RuleKind::Temporal {
                    rotation_column,
                    timestamp_column,
                    window_days,
                    ..
                } => {
                    if rotation_column.is_empty() || timestamp_column.is_empty() {
                        return Err(FlowError::ConfigValidation(format!(
                            "rule '{}': rotation_column and timestamp_column must not be empty",
                            rule.name
                        )));
                    }
                    if *window_days == 0 {
                        return Err(FlowError::ConfigValidation(format!(
                            "rule '{}': window_days must be >= 1",
                            rule.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Logistics Flow"

[columns]
flow_id        = "case_no"
transport_mode = "mode"
wh_handling    = "wh_handling"
offshore       = "offshore"
pre_arrival    = "pre_arrival"
final_location = "final_location"

[override]
sites = ["AGI", "DAS"]
min_code = 3

[[rules]]
name = "project_case"
kind = "simple_key"
cluster_as = "case"
when = ["project_code", "case_number"]

[[rules]]
name = "rotation_eta"
kind = "temporal"
cluster_as = "voyage"
rotation_column = "rotation_no"
timestamp_column = "eta"
window_days = 7
same_port = true
"#;

    #[test]
    fn parse_valid() {
        let config = FlowConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Logistics Flow");
        assert_eq!(config.columns.flow_id, "case_no");
        assert!(config.columns.flow_code.is_none());
        assert_eq!(config.overrides.sites, vec!["AGI", "DAS"]);
        assert_eq!(config.overrides.min_code, 3);
        assert_eq!(config.rules.len(), 2);

        match &config.rules[0].kind {
            RuleKind::SimpleKey { when } => {
                assert_eq!(when, &["project_code", "case_number"]);
            }
            other => panic!("expected simple_key, got {other:?}"),
        }
        match &config.rules[1].kind {
            RuleKind::Temporal { window_days, same_port, .. } => {
                assert_eq!(*window_days, 7);
                assert!(same_port);
            }
            other => panic!("expected temporal, got {other:?}"),
        }
    }

    #[test]
    fn override_defaults_apply() {
        let input = r#"
name = "Minimal"

[columns]
flow_id        = "case_no"
transport_mode = "mode"
wh_handling    = "wh_handling"
offshore       = "offshore"
pre_arrival    = "pre_arrival"
final_location = "final_location"
"#;
        let config = FlowConfig::from_toml(input).unwrap();
        assert_eq!(config.overrides.sites, vec!["AGI", "DAS"]);
        assert_eq!(config.overrides.min_code, 3);
        assert!(config.rules.is_empty());
        assert_eq!(config.linkset.bol_column, "bl_number");
    }

    #[test]
    fn reject_missing_cluster_as() {
        let input = format!(
            "{VALID}\n[[rules]]\nname = \"broken\"\nkind = \"simple_key\"\nwhen = [\"x\"]\n"
        );
        let err = FlowConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, FlowError::ConfigParse(_)), "got {err}");
    }

    #[test]
    fn reject_unknown_rule_kind() {
        let input = format!(
            "{VALID}\n[[rules]]\nname = \"broken\"\nkind = \"phonetic\"\ncluster_as = \"x\"\n"
        );
        let err = FlowConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, FlowError::ConfigParse(_)), "got {err}");
    }

    #[test]
    fn reject_empty_when() {
        let input = format!(
            "{VALID}\n[[rules]]\nname = \"broken\"\nkind = \"simple_key\"\ncluster_as = \"x\"\nwhen = []\n"
        );
        let err = FlowConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("at least one column"));
    }

    #[test]
    fn reject_zero_window() {
        let input = format!(
            "{VALID}\n[[rules]]\nname = \"w0\"\nkind = \"temporal\"\ncluster_as = \"x\"\nrotation_column = \"r\"\ntimestamp_column = \"t\"\nwindow_days = 0\n"
        );
        let err = FlowConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("w0"));
        assert!(err.to_string().contains("window_days"));
    }

    #[test]
    fn reject_duplicate_rule_names() {
        let input = format!(
            "{VALID}\n[[rules]]\nname = \"project_case\"\nkind = \"simple_key\"\ncluster_as = \"x\"\nwhen = [\"a\"]\n"
        );
        let err = FlowConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate rule name"));
    }

    #[test]
    fn reject_min_code_out_of_range() {
        let input = r#"
name = "Bad"

[columns]
flow_id        = "case_no"
transport_mode = "mode"
wh_handling    = "wh_handling"
offshore       = "offshore"
pre_arrival    = "pre_arrival"
final_location = "final_location"

[override]
min_code = 9
"#;
        let err = FlowConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("min_code"));
    }
}
