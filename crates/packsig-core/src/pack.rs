//! Pack: the content bundle being attested.
//!
//! Only `meta` and `events` are signed. Any other fields a richer pack
//! object carries are kept in [`Pack::extra`] and never reach the
//! canonicalizer, so the signed payload stays stable as the pack type grows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::canonical_pack_bytes;
use crate::crypto::Blake3Hash;

/// Pack metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackMeta {
    /// Self-declared hash of the pack content. Informational only.
    pub content_hash: String,

    /// Number of content items.
    pub content_count: u64,

    /// Last update time (Unix milliseconds).
    pub last_update_ms: i64,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Additional metadata fields. These are signed.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackMeta {
    /// Create metadata with no tags or extra fields.
    pub fn new(content_hash: impl Into<String>, content_count: u64, last_update_ms: i64) -> Self {
        Self {
            content_hash: content_hash.into(),
            content_count,
            last_update_ms,
            tags: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// The JSON value of the metadata as it is signed.
    ///
    /// Typed fields win over same-named entries in `extra`.
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("contentHash".into(), Value::String(self.content_hash.clone()));
        map.insert("contentCount".into(), Value::from(self.content_count));
        map.insert("lastUpdateMs".into(), Value::from(self.last_update_ms));
        map.insert(
            "tags".into(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(map)
    }
}

/// A content-addressed bundle of metadata and ordered event records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    pub meta: PackMeta,

    /// Ordered, opaque event records.
    #[serde(default)]
    pub events: Vec<Value>,

    /// Unsigned fields. Ignored by the canonicalizer.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Pack {
    /// Create a pack from metadata and events.
    pub fn new(meta: PackMeta, events: Vec<Value>) -> Self {
        Self {
            meta,
            events,
            extra: Map::new(),
        }
    }

    /// The self-declared content hash from `meta`.
    pub fn content_hash(&self) -> &str {
        &self.meta.content_hash
    }

    /// The signable sub-structure: `{ "meta": ..., "events": [...] }`.
    pub fn signable_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("meta".into(), self.meta.to_value());
        map.insert("events".into(), Value::Array(self.events.clone()));
        Value::Object(map)
    }

    /// The canonical signing bytes of this pack.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_pack_bytes(self)
    }

    /// Blake3 digest of the canonical signing bytes.
    pub fn canonical_digest(&self) -> Blake3Hash {
        Blake3Hash::hash(&self.canonical_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pack_deserializes_extra_fields() {
        let pack: Pack = serde_json::from_value(json!({
            "meta": {
                "contentHash": "abc",
                "contentCount": 2,
                "lastUpdateMs": 1700000000000i64,
                "tags": ["a"],
                "origin": "node-7"
            },
            "events": [{"op": "put"}],
            "attachments": ["ignored"]
        }))
        .unwrap();

        assert_eq!(pack.meta.content_count, 2);
        assert_eq!(pack.meta.extra.get("origin"), Some(&json!("node-7")));
        assert!(pack.extra.contains_key("attachments"));
        assert!(!pack.extra.contains_key("meta"));
    }

    #[test]
    fn test_signable_value_excludes_unsigned_fields() {
        let mut pack = Pack::new(PackMeta::new("h", 0, 0), vec![]);
        pack.extra.insert("cache".into(), json!(true));

        let value = pack.signable_value();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("meta"));
        assert!(obj.contains_key("events"));
    }

    #[test]
    fn test_typed_meta_fields_win_over_extra() {
        let mut meta = PackMeta::new("real", 1, 2);
        meta.extra.insert("contentHash".into(), json!("spoofed"));
        assert_eq!(meta.to_value()["contentHash"], json!("real"));
    }
}
