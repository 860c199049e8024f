use aura_types::HealthEvent;

use crate::entry::Entry;
use crate::error::LedgerError;

/// Write boundary for ledger append operations.
pub trait LedgerWriter: Send + Sync {
    /// Append one event, assigning its sequence number, linkage, and digest.
    fn append(&self, event: HealthEvent) -> Result<Entry, LedgerError>;
}

/// Read boundary for ledger queries and verification.
///
/// Every query returns owned entries; callers never see internal state.
pub trait LedgerReader: Send + Sync {
    /// The full chain, genesis included.
    fn all_entries(&self) -> Result<Vec<Entry>, LedgerError>;

    /// Entries for exactly `subject_id`, in append order.
    fn entries_by_subject(&self, subject_id: &str) -> Result<Vec<Entry>, LedgerError>;

    /// Entries whose condition label contains `query`, ignoring case.
    ///
    /// Results are grouped by matching label in first-seen label order, not
    /// merged by time.
    fn entries_by_condition(&self, query: &str) -> Result<Vec<Entry>, LedgerError>;

    /// The most recently appended entry.
    fn head(&self) -> Result<Option<Entry>, LedgerError>;

    /// The entry at `sequence`, if any.
    fn get(&self, sequence: u64) -> Result<Option<Entry>, LedgerError>;

    /// Number of entries, genesis included.
    fn entry_count(&self) -> Result<u64, LedgerError>;

    /// Distinct subject identifiers in first-seen order.
    fn subjects(&self) -> Result<Vec<String>, LedgerError>;

    /// Distinct condition labels in first-seen order.
    fn conditions(&self) -> Result<Vec<String>, LedgerError>;

    /// Walk the chain and confirm every digest and link.
    fn is_valid(&self) -> bool;
}
