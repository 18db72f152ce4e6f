//! Error types for the Fitness RPG domain crate

use thiserror::Error;

/// A stored or caller-supplied string did not name a known enum variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Caller input rejected before it reaches storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("{field} must be a valid number")]
    NotFinite { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("Invalid date bucket '{0}', expected YYYY-MM-DD")]
    DateBucket(String),

    #[error(transparent)]
    UnknownVariant(#[from] ParseEnumError),
}
