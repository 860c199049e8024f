use aura_types::Digest;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"aura-entry-v1"`) that is
/// prepended to every hash computation, so the same bytes hashed under two
/// domains never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for ledger entries.
    pub const ENTRY: Self = Self {
        domain: "aura-entry-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value as compact JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<Digest, HasherError> {
        Ok(self.hash(&canonical_json(value)?))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Compact JSON encoding used as the canonical byte form of hashed values.
///
/// Struct fields serialize in declaration order and floats use the shortest
/// round-trip representation, so equal values always encode identically.
pub fn canonical_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, HasherError> {
    serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
