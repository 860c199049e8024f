//! Cryptographic primitives for AuraChain.
//!
//! Provides domain-separated BLAKE3 hashing and hash chain verification.
//! All crypto operations wrap established libraries; there is no custom
//! cryptography here.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, Chained, HashChainVerifier};
pub use hasher::{canonical_json, ContentHasher, HasherError};
