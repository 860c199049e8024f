use aura_crypto::{canonical_json, Chained, HashChainVerifier, HasherError};
use aura_types::{Digest, HealthEvent, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One immutable, hash-committed record in the ledger.
///
/// The digest commits to `(sequence, previous_digest, recorded_at, payload)`.
/// Fields are read-only; any change requires building a new entry, which
/// yields a new digest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    sequence_number: u64,
    recorded_at: Timestamp,
    payload: HealthEvent,
    previous_digest: Digest,
    digest: Digest,
}

/// Borrowed view hashed to produce an entry's digest. Field order is fixed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalEntry<'a> {
    sequence_number: u64,
    previous_digest: &'a Digest,
    recorded_at: Timestamp,
    payload: &'a HealthEvent,
}

impl Entry {
    /// Build an entry and compute its digest.
    ///
    /// `recorded_at` is copied into the payload so downstream consumers see
    /// the event time without consulting the envelope.
    pub fn new(
        sequence_number: u64,
        recorded_at: Timestamp,
        mut payload: HealthEvent,
        previous_digest: Digest,
    ) -> Result<Self, LedgerError> {
        if let Some(field) = non_finite_field(&payload) {
            return Err(LedgerError::NonFinite { field });
        }
        payload.recorded_at = Some(recorded_at);
        let mut entry = Self {
            sequence_number,
            recorded_at,
            payload,
            previous_digest,
            digest: Digest::zero(),
        };
        entry.digest = entry.compute_digest()?;
        Ok(entry)
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn recorded_at(&self) -> Timestamp {
        self.recorded_at
    }

    pub fn payload(&self) -> &HealthEvent {
        &self.payload
    }

    pub fn previous_digest(&self) -> Digest {
        self.previous_digest
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// Returns `true` for the sentinel first entry.
    pub fn is_genesis(&self) -> bool {
        self.sequence_number == 0
    }

    /// Recompute the digest from the entry's current fields.
    pub fn compute_digest(&self) -> Result<Digest, LedgerError> {
        Ok(HashChainVerifier::compute_digest(self)?)
    }

    /// Returns `true` if the stored digest matches a recomputation.
    pub fn has_valid_digest(&self) -> bool {
        self.compute_digest()
            .map(|computed| computed == self.digest)
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn payload_mut(&mut self) -> &mut HealthEvent {
        &mut self.payload
    }

    #[cfg(test)]
    pub(crate) fn set_previous_digest(&mut self, previous_digest: Digest) {
        self.previous_digest = previous_digest;
    }
}

/// NaN and the infinities all serialize as `null`, so they cannot be hashed
/// distinctly.
fn non_finite_field(payload: &HealthEvent) -> Option<&'static str> {
    [
        ("confidence", payload.confidence),
        ("heartRate", payload.heart_rate),
        ("temperature", payload.temperature),
        ("respiratoryRate", payload.respiratory_rate),
        ("spo2", payload.spo2),
    ]
    .into_iter()
    .find(|(_, value)| !value.is_finite())
    .map(|(field, _)| field)
}

impl Chained for Entry {
    fn sequence(&self) -> u64 {
        self.sequence_number
    }

    fn digest(&self) -> Digest {
        self.digest
    }

    fn previous_digest(&self) -> Digest {
        self.previous_digest
    }

    fn canonical_bytes(&self) -> Result<Vec<u8>, HasherError> {
        canonical_json(&CanonicalEntry {
            sequence_number: self.sequence_number,
            previous_digest: &self.previous_digest,
            recorded_at: self.recorded_at,
            payload: &self.payload,
        })
    }
}
