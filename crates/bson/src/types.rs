//! BSON element type tags and binary subtypes.

use std::fmt;

/// One-byte element type tag preceding every BSON field.
///
/// `EndOfDocument` is the `0x00` terminator returned by readers once a
/// document or array has no more elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BsonType {
    EndOfDocument = 0x00,
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0a,
    RegularExpression = 0x0b,
    DbPointer = 0x0c,
    JavaScript = 0x0d,
    Symbol = 0x0e,
    JavaScriptWithScope = 0x0f,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MaxKey = 0x7f,
    MinKey = 0xff,
}

impl BsonType {
    /// Maps a wire tag to its type, `None` for unknown tags.
    pub fn from_u8(tag: u8) -> Option<Self> {
        let typ = match tag {
            0x00 => BsonType::EndOfDocument,
            0x01 => BsonType::Double,
            0x02 => BsonType::String,
            0x03 => BsonType::Document,
            0x04 => BsonType::Array,
            0x05 => BsonType::Binary,
            0x06 => BsonType::Undefined,
            0x07 => BsonType::ObjectId,
            0x08 => BsonType::Boolean,
            0x09 => BsonType::DateTime,
            0x0a => BsonType::Null,
            0x0b => BsonType::RegularExpression,
            0x0c => BsonType::DbPointer,
            0x0d => BsonType::JavaScript,
            0x0e => BsonType::Symbol,
            0x0f => BsonType::JavaScriptWithScope,
            0x10 => BsonType::Int32,
            0x11 => BsonType::Timestamp,
            0x12 => BsonType::Int64,
            0x13 => BsonType::Decimal128,
            0x7f => BsonType::MaxKey,
            0xff => BsonType::MinKey,
            _ => return None,
        };
        Some(typ)
    }

    /// Wire tag of this type.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Documents and arrays are containers; everything else is a leaf.
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, BsonType::Document | BsonType::Array)
    }
}

impl fmt::Display for BsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Binary subtype tags.
pub mod subtype {
    /// Generic binary payload.
    pub const BINARY: u8 = 0x00;
    pub const FUNCTION: u8 = 0x01;
    /// Deprecated generic binary, prefixed on the wire by an inner length.
    pub const OLD_BINARY: u8 = 0x02;
    /// Legacy UUID in the Java driver's byte order.
    pub const UUID_LEGACY: u8 = 0x03;
    pub const UUID_STANDARD: u8 = 0x04;
    pub const MD5: u8 = 0x05;
    pub const USER_DEFINED: u8 = 0x80;
}
