//! Golden test vectors for deterministic canonicalization.
//!
//! These vectors pin the exact signing bytes for a set of packs. Any
//! implementation that signs or verifies packs must reproduce them.

use packsig_core::Pack;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// What the vector exercises.
    pub description: &'static str,
    /// The pack as received (JSON, any key order).
    pub pack_json: &'static str,
    /// Expected canonical bytes (UTF-8).
    pub expected_canonical: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "minimal",
            description: "empty event list, tags defaulted",
            pack_json: r#"{"meta":{"contentHash":"h","contentCount":0,"lastUpdateMs":0},"events":[]}"#,
            expected_canonical: r#"{"events":[],"meta":{"contentCount":0,"contentHash":"h","lastUpdateMs":0,"tags":[]}}"#,
        },
        GoldenVector {
            name: "nested key order",
            description: "keys sorted at every depth, arrays and tags keep their order",
            pack_json: r#"{"events":[{"z":1,"a":{"y":[3,1],"b":null}}],"meta":{"tags":["b","a"],"lastUpdateMs":1700000000000,"contentCount":1,"contentHash":"sha256:ab"}}"#,
            expected_canonical: r#"{"events":[{"a":{"b":null,"y":[3,1]},"z":1}],"meta":{"contentCount":1,"contentHash":"sha256:ab","lastUpdateMs":1700000000000,"tags":["b","a"]}}"#,
        },
        GoldenVector {
            name: "escaping and byte order",
            description: "string escapes; non-ASCII keys sort after ASCII",
            pack_json: r#"{"meta":{"contentHash":"h3","contentCount":1,"lastUpdateMs":0},"events":[{"é":"x","e":"line\nbreak","Z":"\"q\""}]}"#,
            expected_canonical: r#"{"events":[{"Z":"\"q\"","e":"line\nbreak","é":"x"}],"meta":{"contentCount":1,"contentHash":"h3","lastUpdateMs":0,"tags":[]}}"#,
        },
        GoldenVector {
            name: "extra meta fields",
            description: "unknown meta fields are signed; events need not be objects",
            pack_json: r#"{"meta":{"contentHash":"h4","contentCount":3,"lastUpdateMs":-5,"channel":"stable"},"events":[1,"two",[3]]}"#,
            expected_canonical: r#"{"events":[1,"two",[3]],"meta":{"channel":"stable","contentCount":3,"contentHash":"h4","lastUpdateMs":-5,"tags":[]}}"#,
        },
        GoldenVector {
            name: "unsigned pack fields",
            description: "fields outside meta and events are not signed",
            pack_json: r#"{"meta":{"contentHash":"h5","contentCount":0,"lastUpdateMs":0,"tags":["t"]},"events":[],"localCache":{"hits":1}}"#,
            expected_canonical: r#"{"events":[],"meta":{"contentCount":0,"contentHash":"h5","lastUpdateMs":0,"tags":["t"]}}"#,
        },
        GoldenVector {
            name: "float forms",
            description: "integral floats lose their fraction, negative zero prints as 0, large exponents carry a sign",
            pack_json: r#"{"meta":{"contentHash":"h6","contentCount":1,"lastUpdateMs":0},"events":[{"x":1.0,"y":1e21,"z":-0.0,"w":0.5,"v":2.5e-7}]}"#,
            expected_canonical: r#"{"events":[{"v":2.5e-7,"w":0.5,"x":1,"y":1e+21,"z":0}],"meta":{"contentCount":1,"contentHash":"h6","lastUpdateMs":0,"tags":[]}}"#,
        },
        GoldenVector {
            name: "utf16 key order",
            description: "astral-plane keys sort by surrogate code units, before U+E000..U+FFFF",
            pack_json: "{\"meta\":{\"contentHash\":\"h7\",\"contentCount\":1,\"lastUpdateMs\":0},\"events\":[{\"\u{FF61}\":2,\"\u{1F600}\":1,\"a\":0}]}",
            expected_canonical: "{\"events\":[{\"a\":0,\"\u{1F600}\":1,\"\u{FF61}\":2}],\"meta\":{\"contentCount\":1,\"contentHash\":\"h7\",\"lastUpdateMs\":0,\"tags\":[]}}",
        },
    ]
}

/// Parse a vector's pack.
pub fn pack_from_vector(vector: &GoldenVector) -> Result<Pack, serde_json::Error> {
    serde_json::from_str(vector.pack_json)
}

/// Check one vector. Returns a description of the mismatch, if any.
pub fn verify_vector(vector: &GoldenVector) -> Result<(), String> {
    let pack = pack_from_vector(vector).map_err(|e| format!("{}: {}", vector.name, e))?;
    let canonical = pack.canonical_bytes();
    if canonical == vector.expected_canonical.as_bytes() {
        Ok(())
    } else {
        Err(format!(
            "{}: expected {}, got {}",
            vector.name,
            vector.expected_canonical,
            String::from_utf8_lossy(&canonical)
        ))
    }
}

/// Check every vector.
pub fn verify_all_vectors() -> Result<(), String> {
    all_vectors().iter().try_for_each(verify_vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        for vector in all_vectors() {
            if let Err(mismatch) = verify_vector(&vector) {
                panic!("{}", mismatch);
            }
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }

    #[test]
    fn test_digest_is_stable() {
        for vector in all_vectors() {
            let pack = pack_from_vector(&vector).unwrap();
            let reparsed: Pack = serde_json::from_str(&serde_json::to_string(&pack).unwrap()).unwrap();
            assert_eq!(pack.canonical_digest(), reparsed.canonical_digest(), "{}", vector.name);
        }
    }
}
