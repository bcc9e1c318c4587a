//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

use packsig_core::{Keypair, Kid, Pack, PackMeta, ThresholdPolicy};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a kid.
pub fn kid() -> impl Strategy<Value = Kid> {
    "[a-z][a-z0-9-]{0,15}".prop_map(Kid::from)
}

/// Generate a JSON leaf value.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

/// Generate a nested JSON value, up to three levels deep.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z_]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate an event record (always a JSON object).
pub fn event() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}", json_value(), 1..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

/// Generate pack metadata.
pub fn pack_meta() -> impl Strategy<Value = PackMeta> {
    (
        "sha256:[0-9a-f]{8}",
        0u64..10_000,
        0i64..=1_700_000_000_000,
        prop::collection::vec("[a-z]{1,8}", 0..3),
    )
        .prop_map(|(hash, count, ts, tags)| {
            let mut meta = PackMeta::new(hash, count, ts);
            meta.tags = tags;
            meta
        })
}

/// Generate a pack with up to `max_events` events.
pub fn pack(max_events: usize) -> impl Strategy<Value = Pack> {
    (pack_meta(), prop::collection::vec(event(), 0..=max_events))
        .prop_map(|(meta, events)| Pack::new(meta, events))
}

/// Generate a threshold policy with `min` in `0..=max_min` and no lists.
pub fn threshold_policy(max_min: u32) -> impl Strategy<Value = ThresholdPolicy> {
    (0..=max_min, any::<bool>()).prop_map(|(min, allow_legacy)| ThresholdPolicy {
        allow_legacy,
        ..ThresholdPolicy::new(min)
    })
}

/// Generate a non-empty selection of indices into a signer set of size `n`,
/// with repeats allowed.
pub fn signer_selection(n: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..n, 1..=n * 2)
}
