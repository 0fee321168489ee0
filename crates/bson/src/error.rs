//! BSON reader/writer error type.

use thiserror::Error;

use crate::types::BsonType;

/// Error type for BSON reading and writing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unsupported BSON element type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    /// A token was written or read out of order.
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("expected BSON type {expected}, found {actual:?}")]
    TypeMismatch {
        expected: BsonType,
        actual: Option<BsonType>,
    },
    #[error("invalid size {0}")]
    InvalidSize(i64),
    /// A container did not end where its declared size said it would.
    #[error("size mismatch: container should end at {expected}, ended at {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BsonError>;
