//! Error types for the catalog resolver

use thiserror::Error;

/// Errors related to participant identity
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid identity format: {0}")]
    InvalidFormat(String),
}

/// Errors raised by a collaborator store (definition source, asset index, policy store)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Query rejected: {0}")]
    InvalidQuery(#[from] SelectorError),
}

impl StorageError {
    /// Create a new I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Create a new Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Errors raised when a store cannot interpret a selector
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Operator '{operator}' expects {expected} operand")]
    InvalidOperand {
        operator: String,
        expected: &'static str,
    },
}

/// Errors parsing a contract offer id
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OfferIdError {
    #[error("Expected 3 segments, got {0}")]
    SegmentCount(usize),

    #[error("Segment is not valid base64: {0}")]
    Encoding(String),

    #[error("Segment is not valid UTF-8")]
    Utf8,
}
