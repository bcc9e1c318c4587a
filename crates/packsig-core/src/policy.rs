//! Threshold policy and its evaluation over a set of verified signers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::reason::Reason;
use crate::types::{Kid, SignerId};

/// The M-of-N rule plus ban and require lists.
///
/// Wire form: `{min, allowLegacy?, bannedKids?, requireKids?, retiredGraceMs?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPolicy {
    /// Minimum number of valid signatures.
    pub min: u32,

    /// Accept entries that embed a raw public key instead of a kid.
    #[serde(default)]
    pub allow_legacy: bool,

    /// Kids whose valid signature fails the whole verification.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub banned_kids: BTreeSet<Kid>,

    /// Kids that must be among the valid signers.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub require_kids: BTreeSet<Kid>,

    /// How long after retirement a retired signer is still honored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_grace_ms: Option<u64>,
}

impl ThresholdPolicy {
    /// A policy requiring `min` valid signatures and nothing else.
    pub fn new(min: u32) -> Self {
        Self {
            min,
            ..Self::default()
        }
    }

    pub fn allow_legacy(mut self) -> Self {
        self.allow_legacy = true;
        self
    }

    pub fn ban(mut self, kid: impl Into<Kid>) -> Self {
        self.banned_kids.insert(kid.into());
        self
    }

    pub fn require(mut self, kid: impl Into<Kid>) -> Self {
        self.require_kids.insert(kid.into());
        self
    }

    pub fn retired_grace_ms(mut self, grace_ms: u64) -> Self {
        self.retired_grace_ms = Some(grace_ms);
        self
    }
}

/// Apply ban list, require list and threshold to the verified signers.
///
/// Returns the policy reasons in that order; banned and required kids are
/// visited in sorted order. An empty result means the policy is satisfied.
pub fn evaluate_threshold(
    policy: &ThresholdPolicy,
    valid: &BTreeSet<SignerId>,
    count: u32,
) -> Vec<Reason> {
    let mut reasons = Vec::new();

    for kid in &policy.banned_kids {
        if valid.contains(&SignerId::Kid(kid.clone())) {
            reasons.push(Reason::BannedKid(kid.clone()));
        }
    }

    for kid in &policy.require_kids {
        if !valid.contains(&SignerId::Kid(kid.clone())) {
            reasons.push(Reason::RequireKidMissing(kid.clone()));
        }
    }

    if count < policy.min {
        reasons.push(Reason::ThresholdNotMet {
            min: policy.min,
            count,
        });
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_set(kids: &[&str]) -> BTreeSet<SignerId> {
        kids.iter().map(|k| SignerId::Kid(Kid::from(*k))).collect()
    }

    #[test]
    fn test_threshold_met() {
        let reasons = evaluate_threshold(&ThresholdPolicy::new(2), &valid_set(&["s1", "s2"]), 2);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_threshold_not_met() {
        let reasons = evaluate_threshold(&ThresholdPolicy::new(4), &valid_set(&["s1", "s2", "s3"]), 3);
        assert_eq!(reasons, vec![Reason::ThresholdNotMet { min: 4, count: 3 }]);
    }

    #[test]
    fn test_banned_only_when_valid() {
        let policy = ThresholdPolicy::new(1).ban("s2").ban("s9");
        let reasons = evaluate_threshold(&policy, &valid_set(&["s1", "s2"]), 2);
        assert_eq!(reasons, vec![Reason::BannedKid(Kid::from("s2"))]);
    }

    #[test]
    fn test_require_missing() {
        let policy = ThresholdPolicy::new(1).require("s1").require("s4");
        let reasons = evaluate_threshold(&policy, &valid_set(&["s1", "s2"]), 2);
        assert_eq!(reasons, vec![Reason::RequireKidMissing(Kid::from("s4"))]);
    }

    #[test]
    fn test_legacy_ids_never_match_kids() {
        let mut valid = BTreeSet::new();
        valid.insert(SignerId::Legacy("s1".into()));
        let policy = ThresholdPolicy::new(0).require("s1");
        let reasons = evaluate_threshold(&policy, &valid, 1);
        assert_eq!(reasons, vec![Reason::RequireKidMissing(Kid::from("s1"))]);
    }

    #[test]
    fn test_policy_wire_form() {
        let policy: ThresholdPolicy = serde_json::from_str(
            r#"{"min":2,"allowLegacy":true,"bannedKids":["s2"],"requireKids":["s1"],"retiredGraceMs":10000}"#,
        )
        .unwrap();
        assert_eq!(
            policy,
            ThresholdPolicy::new(2)
                .allow_legacy()
                .ban("s2")
                .require("s1")
                .retired_grace_ms(10_000)
        );

        let minimal: ThresholdPolicy = serde_json::from_str(r#"{"min":1}"#).unwrap();
        assert_eq!(minimal, ThresholdPolicy::new(1));
        assert_eq!(serde_json::to_string(&minimal).unwrap(), r#"{"min":1,"allowLegacy":false}"#);
    }

    proptest! {
        #[test]
        fn test_threshold_reason_iff_count_below_min(min in 0u32..10, count in 0u32..10) {
            let reasons = evaluate_threshold(&ThresholdPolicy::new(min), &BTreeSet::new(), count);
            prop_assert_eq!(reasons.is_empty(), count >= min);
        }
    }
}
