//! BSON (Binary JSON) value model and token-level readers and writers.
//!
//! The [`BsonWriter`] and [`BsonReader`] traits are the token interface a
//! document codec drives. Two writer implementations are provided, one
//! producing bytes ([`BsonBinaryWriter`]) and one producing an in-memory
//! [`BsonValue`] document ([`BsonDocumentWriter`]), plus a byte reader
//! ([`BsonBinaryReader`]).

pub mod binary_reader;
pub mod binary_writer;
pub mod decoder;
pub mod document_writer;
pub mod encoder;
pub mod error;
mod object_id;
pub mod reader;
pub mod types;
pub mod values;
pub mod writer;

pub use binary_reader::BsonBinaryReader;
pub use binary_writer::BsonBinaryWriter;
pub use decoder::BsonDecoder;
pub use document_writer::BsonDocumentWriter;
pub use encoder::BsonEncoder;
pub use error::BsonError;
pub use reader::{read_bson_document, read_bson_value, BsonReader};
pub use types::{subtype, BsonType};
pub use values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonObjectId, BsonSymbol, BsonTimestamp, BsonValue,
};
pub use writer::{write_bson_document, write_bson_value, BsonWriter};
