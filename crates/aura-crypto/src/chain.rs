use aura_types::Digest;

use crate::hasher::{ContentHasher, HasherError};

/// Trait for records that participate in a hash chain.
pub trait Chained {
    /// Position in the chain, starting at 0 for genesis.
    fn sequence(&self) -> u64;
    /// The record's stored digest.
    fn digest(&self) -> Digest;
    /// The previous record's digest (zero for genesis).
    fn previous_digest(&self) -> Digest;
    /// Canonical bytes the digest commits to. Must include the sequence and
    /// previous digest so position and linkage are covered by the hash.
    fn canonical_bytes(&self) -> Result<Vec<u8>, HasherError>;
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of records forms a valid hash chain: every
/// record's digest matches a recomputation over its own fields, and each
/// record's previous digest equals the digest of the record before it.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain of records, stopping at the first failure.
    ///
    /// Checks, in order, for each record:
    /// 1. Sequence equals its position
    /// 2. Stored digest matches the recomputed digest
    /// 3. Previous digest is zero for genesis, else the prior record's digest
    pub fn verify_chain<T: Chained>(records: &[T]) -> Result<(), ChainError> {
        for (index, record) in records.iter().enumerate() {
            let sequence = record.sequence();
            if sequence != index as u64 {
                return Err(ChainError::SequenceGap {
                    expected: index as u64,
                    found: sequence,
                });
            }

            if Self::compute_digest(record)? != record.digest() {
                return Err(ChainError::HashMismatch { sequence });
            }

            match index.checked_sub(1).map(|prev| &records[prev]) {
                None if !record.previous_digest().is_zero() => {
                    return Err(ChainError::GenesisHasParent);
                }
                Some(prev) if record.previous_digest() != prev.digest() => {
                    return Err(ChainError::BrokenLink { sequence });
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Compute the expected digest for a record from its canonical bytes.
    pub fn compute_digest<T: Chained>(record: &T) -> Result<Digest, ChainError> {
        let bytes = record
            .canonical_bytes()
            .map_err(|e| ChainError::Encoding(e.to_string()))?;
        Ok(ContentHasher::ENTRY.hash(&bytes))
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis record has a non-zero previous digest")]
    GenesisHasParent,

    #[error("sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    #[error("broken link at sequence {sequence}: previous digest does not match")]
    BrokenLink { sequence: u64 },

    #[error("digest mismatch at sequence {sequence}: computed digest differs from stored")]
    HashMismatch { sequence: u64 },

    #[error("canonical encoding failed: {0}")]
    Encoding(String),
}

impl ChainError {
    /// Sequence number the failure was detected at, if it names one.
    pub fn sequence(&self) -> Option<u64> {
        match self {
            Self::GenesisHasParent => Some(0),
            Self::SequenceGap { found, .. } => Some(*found),
            Self::BrokenLink { sequence } | Self::HashMismatch { sequence } => Some(*sequence),
            Self::Encoding(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test record for chain verification.
    struct TestRecord {
        sequence: u64,
        digest: Digest,
        prev: Digest,
        payload: String,
    }

    impl TestRecord {
        fn bytes(sequence: u64, prev: &Digest, payload: &str) -> Vec<u8> {
            format!("{sequence}:{prev}:{payload}").into_bytes()
        }
    }

    impl Chained for TestRecord {
        fn sequence(&self) -> u64 {
            self.sequence
        }
        fn digest(&self) -> Digest {
            self.digest
        }
        fn previous_digest(&self) -> Digest {
            self.prev
        }
        fn canonical_bytes(&self) -> Result<Vec<u8>, HasherError> {
            Ok(Self::bytes(self.sequence, &self.prev, &self.payload))
        }
    }

    fn build_chain(count: u64) -> Vec<TestRecord> {
        let mut chain = Vec::new();
        let mut prev = Digest::zero();

        for sequence in 0..count {
            let payload = format!("record-{sequence}");
            let digest = ContentHasher::ENTRY.hash(&TestRecord::bytes(sequence, &prev, &payload));
            chain.push(TestRecord {
                sequence,
                digest,
                prev,
                payload,
            });
            prev = digest;
        }

        chain
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestRecord> = vec![];
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn multi_record_chain() {
        assert!(HashChainVerifier::verify_chain(&build_chain(1)).is_ok());
        assert!(HashChainVerifier::verify_chain(&build_chain(10)).is_ok());
    }

    #[test]
    fn genesis_with_parent_fails() {
        let mut chain = build_chain(1);
        chain[0].prev = Digest::from_hash([1; 32]);
        chain[0].digest = HashChainVerifier::compute_digest(&chain[0]).unwrap();
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::GenesisHasParent);
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = Digest::from_hash([99; 32]);
        chain[2].digest = HashChainVerifier::compute_digest(&chain[2]).unwrap();
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::BrokenLink { sequence: 2 });
    }

    #[test]
    fn tampered_payload_detected() {
        let mut chain = build_chain(3);
        chain[1].payload = "tampered".into();
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { sequence: 1 });
        assert_eq!(err.sequence(), Some(1));
    }

    #[test]
    fn tampered_genesis_detected() {
        let mut chain = build_chain(2);
        chain[0].payload = "rewritten".into();
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { sequence: 0 });
    }

    #[test]
    fn sequence_gap_detected() {
        let mut chain = build_chain(3);
        chain.remove(1);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(
            err,
            ChainError::SequenceGap {
                expected: 1,
                found: 2
            }
        );
    }
}
