use aura_crypto::HashChainVerifier;
use serde::Serialize;
use tracing::warn;

use crate::entry::Entry;
use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of a full ledger audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub entry_count: u64,
    pub hash_chain_valid: bool,
    pub sequence_contiguous: bool,
    pub indexes_consistent: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub sequence: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    SequenceGap,
    HashMismatch,
    HashChainBreak,
    GenesisParent,
    IndexDivergence,
}

/// Whole-ledger auditor.
///
/// Unlike [`LedgerReader::is_valid`], which stops at the first failure, this
/// keeps scanning and reports every violation it finds.
pub struct ChainValidator;

impl ChainValidator {
    pub fn validate<R: LedgerReader>(reader: &R) -> Result<ValidationReport, LedgerError> {
        let entries = reader.all_entries()?;
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut sequence_contiguous = true;

        for (index, entry) in entries.iter().enumerate() {
            let sequence = entry.sequence_number();
            if sequence != index as u64 {
                sequence_contiguous = false;
                violations.push(Violation {
                    sequence,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected sequence {index}, found {sequence}"),
                });
            }

            // Recompute and verify digest
            if HashChainVerifier::compute_digest(entry)? != entry.digest() {
                hash_chain_valid = false;
                violations.push(Violation {
                    sequence,
                    kind: ViolationKind::HashMismatch,
                    description: "stored digest does not match recomputed digest".into(),
                });
            }

            // Check previous-digest link
            match index.checked_sub(1).map(|prev| &entries[prev]) {
                None if !entry.previous_digest().is_zero() => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        sequence,
                        kind: ViolationKind::GenesisParent,
                        description: "genesis entry has a non-zero previous digest".into(),
                    });
                }
                Some(prev) if entry.previous_digest() != prev.digest() => {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        sequence,
                        kind: ViolationKind::HashChainBreak,
                        description: format!(
                            "previous digest does not match entry {}",
                            prev.sequence_number()
                        ),
                    });
                }
                _ => {}
            }
        }

        let index_violations = Self::check_indexes(reader, &entries)?;
        let indexes_consistent = index_violations.is_empty();
        violations.extend(index_violations);

        for violation in &violations {
            warn!(
                sequence = violation.sequence,
                kind = ?violation.kind,
                "{}",
                violation.description
            );
        }

        Ok(ValidationReport {
            entry_count: entries.len() as u64,
            hash_chain_valid,
            sequence_contiguous,
            indexes_consistent,
            violations,
        })
    }

    /// Compare each index bucket against the entry sequence filtered by the
    /// same key.
    fn check_indexes<R: LedgerReader>(
        reader: &R,
        entries: &[Entry],
    ) -> Result<Vec<Violation>, LedgerError> {
        let mut violations = Vec::new();

        for subject in reader.subjects()? {
            let expected = positions(entries, |e| e.payload().subject_id == subject);
            let actual: Vec<u64> = reader
                .entries_by_subject(&subject)?
                .iter()
                .map(Entry::sequence_number)
                .collect();
            if actual != expected {
                violations.push(divergence("subject", &subject, &expected, &actual));
            }
        }

        for condition in reader.conditions()? {
            let expected = positions(entries, |e| e.payload().condition == condition);
            let actual: Vec<u64> = reader
                .entries_by_condition(&condition)?
                .iter()
                .filter(|e| e.payload().condition == condition)
                .map(Entry::sequence_number)
                .collect();
            if actual != expected {
                violations.push(divergence("condition", &condition, &expected, &actual));
            }
        }

        Ok(violations)
    }
}

fn positions(entries: &[Entry], matches: impl Fn(&Entry) -> bool) -> Vec<u64> {
    entries
        .iter()
        .filter(|e| matches(e))
        .map(Entry::sequence_number)
        .collect()
}

fn divergence(index: &str, key: &str, expected: &[u64], actual: &[u64]) -> Violation {
    let first_bad = expected
        .iter()
        .zip(actual)
        .find(|(e, a)| e != a)
        .map(|(e, _)| *e)
        .or_else(|| expected.get(actual.len()).copied())
        .or_else(|| actual.get(expected.len()).copied())
        .unwrap_or_default();

    Violation {
        sequence: first_bad,
        kind: ViolationKind::IndexDivergence,
        description: format!(
            "{index} index bucket {key:?} holds {actual:?}, chain has {expected:?}"
        ),
    }
}
