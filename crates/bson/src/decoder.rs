//! BSON document decoder.
//!
//! Whole-document convenience over [`BsonBinaryReader`].

use crate::binary_reader::BsonBinaryReader;
use crate::error::{BsonError, Result};
use crate::reader::read_bson_document;
use crate::values::BsonValue;

/// BSON document decoder.
#[derive(Debug, Default)]
pub struct BsonDecoder;

impl BsonDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a BSON document from bytes, returning an error on malformed
    /// input or trailing bytes.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<(String, BsonValue)>> {
        let mut reader = BsonBinaryReader::new(data);
        let fields = read_bson_document(&mut reader)?;
        if !reader.is_exhausted() {
            return Err(BsonError::InvalidState(format!(
                "{} trailing bytes after document",
                data.len() - reader.position()
            )));
        }
        Ok(fields)
    }
}
