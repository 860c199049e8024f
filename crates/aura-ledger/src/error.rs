use aura_crypto::ChainError;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger {0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("chain does not start with a genesis entry")]
    MissingGenesis,

    #[error("field {field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("integrity violation: {0}")]
    Integrity(#[from] ChainError),
}
