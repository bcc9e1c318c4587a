//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use async_trait::async_trait;
use serde_json::json;

use packsig_core::{
    Attestation, Keypair, Kid, LegacyAttestation, Namespace, Pack, PackMeta, SignatureEntry,
    SignerRecord, LEGACY_ALGORITHM,
};
use packsig_registry::{MemoryRegistry, RegistryError, SignerRegistry};

/// A set of named signers with deterministic keys.
pub struct SignerSet {
    namespace: Namespace,
    signers: Vec<(Kid, Keypair)>,
}

impl SignerSet {
    /// Signers `s1..=sN` in the given namespace.
    pub fn new(namespace: &str, count: usize) -> Self {
        let kids: Vec<String> = (1..=count).map(|i| format!("s{}", i)).collect();
        Self::with_kids(namespace, &kids.iter().map(String::as_str).collect::<Vec<_>>())
    }

    /// Signers with the given kids. The i-th kid's seed is `[i + 1, 0, ..]`.
    pub fn with_kids(namespace: &str, kids: &[&str]) -> Self {
        let signers = kids
            .iter()
            .enumerate()
            .map(|(i, kid)| {
                let mut seed = [0u8; 32];
                seed[0] = (i + 1) as u8;
                (Kid::from(*kid), Keypair::from_seed(&seed))
            })
            .collect();
        Self {
            namespace: Namespace::from(namespace),
            signers,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// All kids in creation order.
    pub fn kids(&self) -> Vec<Kid> {
        self.signers.iter().map(|(kid, _)| kid.clone()).collect()
    }

    /// Kids by name, for building emission requests.
    pub fn select(&self, kids: &[&str]) -> Vec<Kid> {
        kids.iter().map(|k| Kid::from(*k)).collect()
    }

    /// The keypair behind a kid.
    ///
    /// # Panics
    ///
    /// Panics if the kid is not in the set.
    pub fn keypair(&self, kid: &str) -> &Keypair {
        self.signers
            .iter()
            .find(|(k, _)| k.as_str() == kid)
            .map(|(_, keypair)| keypair)
            .unwrap_or_else(|| panic!("no signer {} in fixture", kid))
    }

    /// Active records for every signer.
    pub fn records(&self, created_at: i64) -> Vec<SignerRecord> {
        self.signers
            .iter()
            .map(|(kid, keypair)| SignerRecord::active(kid.clone(), keypair, created_at))
            .collect()
    }

    /// Insert every signer as active into a registry.
    pub fn populate(&self, registry: &MemoryRegistry) {
        for record in self.records(0) {
            registry.insert(&self.namespace, record);
        }
    }

    /// A memory registry holding every signer as active.
    pub fn registry(&self) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        self.populate(&registry);
        registry
    }

    /// A V2 entry signed by `kid` over the pack.
    pub fn entry(&self, kid: &str, pack: &Pack) -> SignatureEntry {
        let signature = self.keypair(kid).sign(&pack.canonical_bytes());
        SignatureEntry::for_kid(Kid::from(kid), signature.0.to_vec())
    }

    /// A V2 entry that embeds `kid`'s public key instead of naming it.
    pub fn embedded_entry(&self, kid: &str, pack: &Pack) -> SignatureEntry {
        let keypair = self.keypair(kid);
        let signature = keypair.sign(&pack.canonical_bytes());
        SignatureEntry::embedded(keypair.public_key().as_bytes().to_vec(), signature.0.to_vec())
    }

    /// A V1 attestation signed by `kid`. The kid is carried only if
    /// `name_kid` is set; the public key is always embedded.
    pub fn legacy_attestation(&self, kid: &str, pack: &Pack, name_kid: bool) -> Attestation {
        let keypair = self.keypair(kid);
        Attestation::V1(LegacyAttestation {
            manifest: json!({ "contentHash": pack.content_hash() }),
            algorithm: LEGACY_ALGORITHM.to_string(),
            signer: keypair.public_key().as_bytes().to_vec().into(),
            kid: name_kid.then(|| Kid::from(kid)),
            signature: keypair.sign(&pack.canonical_bytes()).0.to_vec().into(),
            timestamp: 1_700_000_000_000,
        })
    }
}

/// A small pack with two events.
pub fn sample_pack() -> Pack {
    Pack::new(
        PackMeta::new("sha256:5f2b", 2, 1_700_000_000_000).tag("release"),
        vec![
            json!({"op": "put", "key": "config/a", "value": {"enabled": true}}),
            json!({"op": "delete", "key": "config/b"}),
        ],
    )
}

/// A pack with `count` numbered events.
pub fn pack_with_events(count: usize) -> Pack {
    let events = (0..count)
        .map(|i| json!({"seq": i, "op": "put", "key": format!("k{}", i)}))
        .collect();
    Pack::new(PackMeta::new(format!("sha256:{:04x}", count), count as u64, 0), events)
}

/// A registry that cannot answer.
#[derive(Debug, Clone, Default)]
pub struct FailingRegistry;

#[async_trait]
impl SignerRegistry for FailingRegistry {
    async fn get_signer(
        &self,
        _namespace: &Namespace,
        _kid: &Kid,
    ) -> Result<Option<SignerRecord>, RegistryError> {
        Err(RegistryError::Unavailable("connection refused".into()))
    }
}
