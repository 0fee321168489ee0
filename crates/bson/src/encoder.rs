//! BSON document encoder.
//!
//! Whole-document convenience over [`BsonBinaryWriter`]: the top level must
//! always be a document (list of key-value pairs). BSON does not have a
//! scalar top-level encoding.

use crate::binary_writer::BsonBinaryWriter;
use crate::error::Result;
use crate::values::BsonValue;
use crate::writer::write_bson_document;

/// Encodes a BSON document (a slice of key-value pairs) to bytes.
#[derive(Debug, Default)]
pub struct BsonEncoder;

impl BsonEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes a BSON document to bytes.
    pub fn encode(&self, fields: &[(String, BsonValue)]) -> Result<Vec<u8>> {
        let mut writer = BsonBinaryWriter::new();
        write_bson_document(&mut writer, fields)?;
        Ok(writer.into_bytes())
    }
}
