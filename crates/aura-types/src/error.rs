use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {0} must not be empty")]
    EmptyField(&'static str),

    #[error("field {field} is not a finite number")]
    NonFinite { field: &'static str },

    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}
