//! Codec error type.

use dbdoc_bson::{BsonError, BsonType};
use thiserror::Error;

use crate::value::ValueKind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors produced while encoding or decoding documents.
///
/// Failures raised by a writer, reader or scalar codec are wrapped in
/// [`CodecError::Encode`] / [`CodecError::Decode`] with the original error
/// kept as the source.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Operation not valid for the document's current contents.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("encoding failed: {0}")]
    Encode(#[source] BsonError),
    #[error("decoding failed: {0}")]
    Decode(#[source] BsonError),
    /// The registry has no codec for a value kind.
    #[error("no codec registered for {0}")]
    CodecNotFound(ValueKind),
    #[error("no value kind mapped for BSON type {0}")]
    UnmappedBsonType(BsonType),
    /// A `$ref`/`$id` document that cannot be read as a reference.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}
