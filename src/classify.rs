use crate::config::OverrideConfig;
use crate::model::FlowRecord;

/// Ceiling of the flow-code scale. Raw codes saturate here.
pub const MAX_FLOW_CODE: u8 = 4;

/// Compute the handling-complexity code for one movement.
///
/// Pre-arrival dominates: goods that have not physically arrived are code 0
/// regardless of routing. Otherwise the code is `1 + hops + offshore`,
/// saturating at [`MAX_FLOW_CODE`]. Monotonic in both `wh_hops` and
/// `offshore`; never below 1 once pre-arrival is excluded.
pub fn classify(wh_hops: u32, offshore: bool, pre_arrival: bool) -> u8 {
    if pre_arrival {
        return 0;
    }
    let raw = 1u64 + u64::from(wh_hops) + u64::from(offshore);
    raw.min(u64::from(MAX_FLOW_CODE)) as u8
}

/// Outcome of the protected-site override check.
///
/// `original` and `reason` are both set when the code was raised, both `None`
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub effective: u8,
    pub original: Option<u8>,
    pub reason: Option<String>,
}

impl Override {
    fn unchanged(code: u8) -> Self {
        Self {
            effective: code,
            original: None,
            reason: None,
        }
    }
}

/// Force the configured minimum code for protected sites.
///
/// One-directional: never lowers a code. `computed` must be the pre-override
/// value, which makes re-application a no-op.
pub fn apply_override(
    final_location: Option<&str>,
    computed: u8,
    config: &OverrideConfig,
) -> Override {
    if let Some(site) = final_location {
        if computed < config.min_code && config.sites.iter().any(|s| s == site) {
            return Override {
                effective: config.min_code,
                original: Some(computed),
                reason: Some(format!("{site} requires FlowCode>={}", config.min_code)),
            };
        }
    }
    Override::unchanged(computed)
}

/// Classify a batch, returning enriched copies. The input is never mutated.
pub fn classify_records(records: &[FlowRecord], config: &OverrideConfig) -> Vec<FlowRecord> {
    records
        .iter()
        .map(|record| {
            let computed = classify(
                record.wh_handling,
                record.offshore_flag,
                record.is_pre_arrival,
            );
            // Pre-arrival dominates the site override too: code 0 stands
            // until the goods arrive.
            let outcome = if record.is_pre_arrival {
                Override::unchanged(computed)
            } else {
                apply_override(record.final_location.as_deref(), computed, config)
            };

            let mut out = record.clone();
            out.flow_code = outcome.effective;
            out.flow_code_original = outcome.original;
            out.override_reason = outcome.reason;
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransportMode;
    use std::collections::HashMap;

    fn record(
        id: &str,
        hops: u32,
        offshore: bool,
        pre_arrival: bool,
        location: Option<&str>,
    ) -> FlowRecord {
        FlowRecord {
            flow_id: id.into(),
            transport_mode: TransportMode::Container,
            wh_handling: hops,
            offshore_flag: offshore,
            is_pre_arrival: pre_arrival,
            final_location: location.map(String::from),
            flow_code: 0,
            flow_code_original: None,
            override_reason: None,
            fields: HashMap::new(),
        }
    }

    #[test]
    fn in_range_and_monotonic() {
        for offshore in [false, true] {
            let mut prev = 0;
            for hops in 0..=10 {
                let code = classify(hops, offshore, false);
                assert!((1..=4).contains(&code));
                assert!(code >= prev, "non-decreasing in hops");
                assert!(code >= classify(hops, false, false), "non-decreasing in offshore");
                prev = code;
            }
        }
    }

    #[test]
    fn pre_arrival_is_always_zero() {
        assert_eq!(classify(0, false, true), 0);
        assert_eq!(classify(5, true, true), 0);
    }

    #[test]
    fn one_hop_offshore_is_three() {
        // wh_hops=1, offshore, arrived
        assert_eq!(classify(1, true, false), 3);
    }

    #[test]
    fn deep_routing_saturates_at_four() {
        assert_eq!(classify(10, false, false), 4);
        assert_eq!(classify(3, true, false), 4);
        assert_eq!(classify(u32::MAX, true, false), 4);
    }

    #[test]
    fn direct_delivery_is_one() {
        assert_eq!(classify(0, false, false), 1);
    }

    #[test]
    fn protected_site_raises_low_code() {
        let config = OverrideConfig::default();
        let outcome = apply_override(Some("AGI"), 1, &config);
        assert_eq!(outcome.effective, 3);
        assert_eq!(outcome.original, Some(1));
        assert!(outcome.reason.as_deref().unwrap().contains("AGI"));
    }

    #[test]
    fn override_never_lowers() {
        let config = OverrideConfig::default();
        let outcome = apply_override(Some("DAS"), 4, &config);
        assert_eq!(outcome.effective, 4);
        assert!(outcome.original.is_none());
        assert!(outcome.reason.is_none());
    }

    #[test]
    fn unprotected_site_untouched() {
        let config = OverrideConfig::default();
        let outcome = apply_override(Some("SHU"), 1, &config);
        assert_eq!(outcome, Override::unchanged(1));
        assert_eq!(apply_override(None, 2, &config), Override::unchanged(2));
    }

    #[test]
    fn reapplying_to_pre_override_value_is_idempotent() {
        let config = OverrideConfig::default();
        let first = apply_override(Some("AGI"), 1, &config);
        let second = apply_override(Some("AGI"), first.original.unwrap(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn batch_enriches_without_mutating_input() {
        let config = OverrideConfig::default();
        let input = vec![
            record("a", 1, true, false, None),
            record("b", 0, false, false, Some("AGI")),
        ];
        let out = classify_records(&input, &config);

        // scenario: 1 hop + offshore = 3, no override fields
        assert_eq!(out[0].flow_code, 3);
        assert!(out[0].flow_code_original.is_none());
        assert!(out[0].override_reason.is_none());

        // scenario: direct to AGI forced to 3
        assert_eq!(out[1].flow_code, 3);
        assert_eq!(out[1].flow_code_original, Some(1));
        assert!(out[1].override_reason.as_deref().unwrap().contains("AGI"));

        // originals untouched
        assert_eq!(input[0].flow_code, 0);
        assert!(input[1].override_reason.is_none());
    }

    #[test]
    fn pre_arrival_wins_over_protected_site() {
        let config = OverrideConfig::default();
        let out = classify_records(&[record("p", 2, true, true, Some("DAS"))], &config);
        assert_eq!(out[0].flow_code, 0);
        assert!(out[0].flow_code_original.is_none());
    }
}
