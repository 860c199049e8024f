//! Foundation types for AuraChain.
//!
//! This crate provides the value types shared by the ledger, the HTTP
//! boundary, and the CLI. Every other Aura crate depends on `aura-types`.
//!
//! # Key Types
//!
//! - [`Digest`]: 32-byte BLAKE3 digest committing an entry's content and position
//! - [`Timestamp`]: Milliseconds since the UNIX epoch
//! - [`HealthEvent`]: Payload of a ledger entry (subject, condition, sensor aggregates)
//! - [`AnomalyClass`]: Open classification of an event ("Normal", "Warning", ...)
//! - [`SensorReading`]: The four numeric sensor aggregates

pub mod digest;
pub mod error;
pub mod event;
pub mod reading;
pub mod temporal;

pub use digest::Digest;
pub use error::TypeError;
pub use event::{AnomalyClass, HealthEvent};
pub use reading::SensorReading;
pub use temporal::Timestamp;
