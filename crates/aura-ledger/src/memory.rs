use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use aura_crypto::HashChainVerifier;
use aura_types::{Digest, HealthEvent, Timestamp};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::entry::Entry;
use crate::error::LedgerError;
use crate::index::BucketIndex;
use crate::seed;
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory, append-only health event ledger.
///
/// Single logical writer, many readers: `append` holds the write lock across
/// read-tail, digest, push, and index update, so those steps are atomic as a
/// unit. Readers take the read lock and receive clones.
pub struct Ledger {
    clock: Box<dyn Clock>,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    entries: Vec<Entry>,
    subjects: BucketIndex,
    conditions: BucketIndex,
}

impl LedgerState {
    /// Build the entry following the tail and index it.
    fn push(&mut self, mut event: HealthEvent, now: Timestamp) -> Result<Entry, LedgerError> {
        let (sequence, previous_digest) = match self.entries.last() {
            Some(tail) => (tail.sequence_number() + 1, tail.digest()),
            None => (0, Digest::zero()),
        };
        let recorded_at = event
            .recorded_at
            .take()
            .filter(|ts| !ts.is_zero())
            .unwrap_or(now);

        let entry = Entry::new(sequence, recorded_at, event, previous_digest)?;
        self.entries.push(entry.clone());
        self.index(self.entries.len() - 1);
        Ok(entry)
    }

    fn index(&mut self, position: usize) {
        let payload = self.entries[position].payload();
        self.subjects.insert(&payload.subject_id, position);
        self.conditions.insert(&payload.condition, position);
    }

    fn collect(&self, positions: &[usize]) -> Vec<Entry> {
        positions.iter().map(|p| self.entries[*p].clone()).collect()
    }
}

impl Ledger {
    /// A ledger holding only the genesis entry, on the wall clock.
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_clock(SystemClock)
    }

    /// A ledger holding only the genesis entry.
    pub fn with_clock(clock: impl Clock + 'static) -> Result<Self, LedgerError> {
        let now = clock.now();
        let mut state = LedgerState::default();
        state.push(
            seed::genesis_event().at(now.saturating_sub(seed::GENESIS_AGE)),
            now,
        )?;

        Ok(Self {
            clock: Box::new(clock),
            inner: RwLock::new(state),
        })
    }

    /// A ledger with genesis followed by the illustrative history, on the
    /// wall clock.
    pub fn seeded() -> Result<Self, LedgerError> {
        Self::seeded_with_clock(SystemClock)
    }

    /// A ledger with genesis followed by the illustrative history. Each
    /// historical event goes through the normal append path.
    pub fn seeded_with_clock(clock: impl Clock + 'static) -> Result<Self, LedgerError> {
        let ledger = Self::with_clock(clock)?;
        for event in seed::historical_events(ledger.clock.now()) {
            ledger.append(event)?;
        }
        debug!(entries = ledger.read()?.entries.len(), "seeded ledger");
        Ok(ledger)
    }

    /// Rebuild a ledger from an existing chain of entries.
    ///
    /// The chain is verified first and both indexes are recomputed from the
    /// entries alone.
    pub fn from_entries(
        entries: Vec<Entry>,
        clock: impl Clock + 'static,
    ) -> Result<Self, LedgerError> {
        match entries.first() {
            Some(first) if first.is_genesis() => {}
            _ => return Err(LedgerError::MissingGenesis),
        }
        HashChainVerifier::verify_chain(&entries)?;

        let mut state = LedgerState {
            entries,
            ..LedgerState::default()
        };
        for position in 0..state.entries.len() {
            state.index(position);
        }

        Ok(Self {
            clock: Box::new(clock),
            inner: RwLock::new(state),
        })
    }

    /// The genesis entry.
    pub fn genesis(&self) -> Result<Entry, LedgerError> {
        self.read()?
            .entries
            .first()
            .cloned()
            .ok_or(LedgerError::MissingGenesis)
    }

    /// Walk the chain, stopping at the first bad digest or broken link.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let state = self.read()?;
        HashChainVerifier::verify_chain(&state.entries).map_err(|err| {
            warn!(sequence = ?err.sequence(), error = %err, "chain integrity check failed");
            LedgerError::from(err)
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::LockPoisoned("read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner
            .write()
            .map_err(|_| LedgerError::LockPoisoned("write"))
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Ledger");
        match self.inner.read() {
            Ok(state) => debug
                .field("entries", &state.entries.len())
                .field("subjects", &state.subjects.keys().count())
                .field("conditions", &state.conditions.keys().count()),
            Err(_) => debug.field("entries", &"<poisoned>"),
        };
        debug.finish_non_exhaustive()
    }
}

impl LedgerWriter for Ledger {
    fn append(&self, event: HealthEvent) -> Result<Entry, LedgerError> {
        let mut state = self.write()?;
        let entry = state.push(event, self.clock.now())?;
        debug!(
            sequence = entry.sequence_number(),
            subject = %entry.payload().subject_id,
            condition = %entry.payload().condition,
            digest = %entry.digest().short_hex(),
            "entry appended"
        );
        Ok(entry)
    }
}

impl LedgerReader for Ledger {
    fn all_entries(&self) -> Result<Vec<Entry>, LedgerError> {
        Ok(self.read()?.entries.clone())
    }

    fn entries_by_subject(&self, subject_id: &str) -> Result<Vec<Entry>, LedgerError> {
        let state = self.read()?;
        Ok(state.collect(state.subjects.get(subject_id)))
    }

    fn entries_by_condition(&self, query: &str) -> Result<Vec<Entry>, LedgerError> {
        let needle = query.to_lowercase();
        let state = self.read()?;
        Ok(state
            .conditions
            .iter()
            .filter(|(label, _)| label.to_lowercase().contains(&needle))
            .flat_map(|(_, positions)| state.collect(positions))
            .collect())
    }

    fn head(&self) -> Result<Option<Entry>, LedgerError> {
        Ok(self.read()?.entries.last().cloned())
    }

    fn get(&self, sequence: u64) -> Result<Option<Entry>, LedgerError> {
        let state = self.read()?;
        Ok(usize::try_from(sequence)
            .ok()
            .and_then(|position| state.entries.get(position))
            .cloned())
    }

    fn entry_count(&self) -> Result<u64, LedgerError> {
        Ok(self.read()?.entries.len() as u64)
    }

    fn subjects(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self.read()?.subjects.keys().map(str::to_string).collect())
    }

    fn conditions(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self.read()?.conditions.keys().map(str::to_string).collect())
    }

    fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }
}
