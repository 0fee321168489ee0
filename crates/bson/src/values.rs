//! BSON-specific value types.

use crate::types::BsonType;

/// BSON ObjectId (12 bytes: 4-byte timestamp + 5-byte process unique + 3-byte counter).
///
/// All three parts are stored big-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BsonObjectId {
    pub timestamp: u32,
    pub process: u64,
    pub counter: u32,
}

/// BSON DBPointer (deprecated BSON type).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonDbPointer {
    pub name: String,
    pub id: BsonObjectId,
}

/// BSON JavaScript code (without scope).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavascriptCode {
    pub code: String,
}

/// BSON Symbol (deprecated BSON type).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonSymbol {
    pub symbol: String,
}

/// BSON JavaScript code with scope (deprecated).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavascriptCodeWithScope {
    pub code: String,
    pub scope: Vec<(String, BsonValue)>,
}

/// BSON Timestamp (MongoDB internal replication timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BsonTimestamp {
    pub increment: i32,
    pub timestamp: i32,
}

/// BSON Decimal128 (16-byte IEEE 754 decimal floating-point).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonDecimal128 {
    pub data: Vec<u8>,
}

/// BSON Binary data (subtype + raw bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

impl BsonBinary {
    /// Generic-subtype binary.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            subtype: crate::types::subtype::BINARY,
            data,
        }
    }
}

/// A BSON value that can appear as a document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// BSON double (0x01)
    Float(f64),
    /// BSON UTF-8 string (0x02)
    Str(String),
    /// Embedded BSON document (0x03)
    Document(Vec<(String, BsonValue)>),
    /// BSON array (0x04)
    Array(Vec<BsonValue>),
    /// BSON binary data (0x05)
    Binary(BsonBinary),
    /// BSON undefined (deprecated) (0x06)
    Undefined,
    /// BSON ObjectId (0x07)
    ObjectId(BsonObjectId),
    /// BSON boolean (0x08)
    Boolean(bool),
    /// BSON UTC datetime (milliseconds since epoch) (0x09)
    DateTime(i64),
    /// BSON null (0x0a)
    Null,
    /// BSON regular expression: pattern, options (0x0b)
    Regex(String, String),
    /// BSON DBPointer (deprecated) (0x0c)
    DbPointer(BsonDbPointer),
    /// BSON JavaScript code (0x0d)
    JavaScriptCode(BsonJavascriptCode),
    /// BSON Symbol (deprecated) (0x0e)
    Symbol(BsonSymbol),
    /// BSON JavaScript code with scope (deprecated) (0x0f)
    JavaScriptCodeWithScope(BsonJavascriptCodeWithScope),
    /// BSON int32 (0x10)
    Int32(i32),
    /// BSON Timestamp (0x11)
    Timestamp(BsonTimestamp),
    /// BSON int64 (0x12)
    Int64(i64),
    /// BSON Decimal128 (0x13)
    Decimal128(BsonDecimal128),
    /// BSON MinKey (0xFF)
    MinKey,
    /// BSON MaxKey (0x7F)
    MaxKey,
}

impl BsonValue {
    /// The element type this value is written as.
    pub fn bson_type(&self) -> BsonType {
        match self {
            BsonValue::Float(_) => BsonType::Double,
            BsonValue::Str(_) => BsonType::String,
            BsonValue::Document(_) => BsonType::Document,
            BsonValue::Array(_) => BsonType::Array,
            BsonValue::Binary(_) => BsonType::Binary,
            BsonValue::Undefined => BsonType::Undefined,
            BsonValue::ObjectId(_) => BsonType::ObjectId,
            BsonValue::Boolean(_) => BsonType::Boolean,
            BsonValue::DateTime(_) => BsonType::DateTime,
            BsonValue::Null => BsonType::Null,
            BsonValue::Regex(..) => BsonType::RegularExpression,
            BsonValue::DbPointer(_) => BsonType::DbPointer,
            BsonValue::JavaScriptCode(_) => BsonType::JavaScript,
            BsonValue::Symbol(_) => BsonType::Symbol,
            BsonValue::JavaScriptCodeWithScope(_) => BsonType::JavaScriptWithScope,
            BsonValue::Int32(_) => BsonType::Int32,
            BsonValue::Timestamp(_) => BsonType::Timestamp,
            BsonValue::Int64(_) => BsonType::Int64,
            BsonValue::Decimal128(_) => BsonType::Decimal128,
            BsonValue::MinKey => BsonType::MinKey,
            BsonValue::MaxKey => BsonType::MaxKey,
        }
    }

    /// Looks up a field when this value is a document.
    pub fn get(&self, key: &str) -> Option<&BsonValue> {
        match self {
            BsonValue::Document(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}
