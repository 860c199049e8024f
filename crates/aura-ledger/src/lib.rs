//! Append-only, hash-linked health event ledger for AuraChain.
//!
//! This crate is the heart of Aura. It provides:
//! - The immutable [`Entry`] with a digest over its position and content
//! - The in-memory [`Ledger`] with genesis, optional seeding, and subject and
//!   condition indexes
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - Short-circuit verification (`is_valid`) and a full audit report
//! - Read-side projections (dashboard records, aggregate statistics)

pub mod clock;
pub mod entry;
pub mod error;
mod index;
pub mod memory;
pub mod projection;
pub mod seed;
pub mod traits;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::Entry;
pub use error::LedgerError;
pub use memory::Ledger;
pub use projection::{DailyCount, EventRecord, LedgerStats, ProjectionBuilder, SensorData};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
