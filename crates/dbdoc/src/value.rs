//! Dynamically-typed document values.
//!
//! [`Value`] is the closed set of things a [`Document`] field can hold. The
//! first eight variants are handled structurally by the document codec; every
//! other variant is a leaf written and read through a
//! [`ScalarCodec`](crate::ScalarCodec) looked up by its [`ValueKind`].

use std::collections::BTreeMap;
use std::fmt;

use dbdoc_bson::{BsonBinary, BsonDecimal128, BsonObjectId, BsonTimestamp, BsonValue};
use uuid::Uuid;

use crate::document::Document;

// ── Value ─────────────────────────────────────────────────────────────────

/// A document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// Reference to a document in another collection.
    Ref(DbRef),
    /// Ordered sequence, encoded as a BSON array.
    List(Vec<Value>),
    Document(Document),
    /// Plain string-keyed map, encoded as an embedded document.
    Map(BTreeMap<String, Value>),
    CodeWithScope(CodeWithScope),
    /// Raw bytes, encoded as binary subtype 0.
    Bytes(Vec<u8>),
    Symbol(String),
    Double(f64),
    String(String),
    ObjectId(BsonObjectId),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Regex {
        pattern: String,
        options: String,
    },
    /// JavaScript code without scope.
    Code(String),
    Int32(i32),
    Timestamp(BsonTimestamp),
    Int64(i64),
    Decimal128(BsonDecimal128),
    MinKey,
    MaxKey,
    Undefined,
    /// Binary data with a subtype other than generic or legacy UUID.
    Binary(BsonBinary),
    /// UUID, encoded as binary subtype 3 in legacy byte order.
    Uuid(Uuid),
    /// A raw BSON value passed through unchanged.
    Bson(BsonValue),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Ref(_) => ValueKind::Ref,
            Value::List(_) => ValueKind::List,
            Value::Document(_) => ValueKind::Document,
            Value::Map(_) => ValueKind::Map,
            Value::CodeWithScope(_) => ValueKind::CodeWithScope,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::ObjectId(_) => ValueKind::ObjectId,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Regex { .. } => ValueKind::Regex,
            Value::Code(_) => ValueKind::Code,
            Value::Int32(_) => ValueKind::Int32,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Int64(_) => ValueKind::Int64,
            Value::Decimal128(_) => ValueKind::Decimal128,
            Value::MinKey => ValueKind::MinKey,
            Value::MaxKey => ValueKind::MaxKey,
            Value::Undefined => ValueKind::Undefined,
            Value::Binary(_) => ValueKind::Binary,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Bson(_) => ValueKind::Bson,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Structural conversion of a raw BSON value.
    ///
    /// Nested documents and arrays become [`Value::Document`] and
    /// [`Value::List`]; a DB pointer becomes a [`DbRef`].
    pub fn from_bson(value: BsonValue) -> Value {
        match value {
            BsonValue::Float(f) => Value::Double(f),
            BsonValue::Str(s) => Value::String(s),
            BsonValue::Document(fields) => Value::Document(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_bson(v)))
                    .collect(),
            ),
            BsonValue::Array(items) => {
                Value::List(items.into_iter().map(Value::from_bson).collect())
            }
            BsonValue::Binary(binary) => Value::Binary(binary),
            BsonValue::Undefined => Value::Undefined,
            BsonValue::ObjectId(id) => Value::ObjectId(id),
            BsonValue::Boolean(b) => Value::Boolean(b),
            BsonValue::DateTime(ms) => Value::DateTime(ms),
            BsonValue::Null => Value::Null,
            BsonValue::Regex(pattern, options) => Value::Regex { pattern, options },
            BsonValue::DbPointer(pointer) => {
                Value::Ref(DbRef::new(pointer.name, Value::ObjectId(pointer.id)))
            }
            BsonValue::JavaScriptCode(code) => Value::Code(code.code),
            BsonValue::Symbol(symbol) => Value::Symbol(symbol.symbol),
            BsonValue::JavaScriptCodeWithScope(cws) => Value::CodeWithScope(CodeWithScope {
                code: cws.code,
                scope: cws
                    .scope
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_bson(v)))
                    .collect(),
            }),
            BsonValue::Int32(i) => Value::Int32(i),
            BsonValue::Timestamp(ts) => Value::Timestamp(ts),
            BsonValue::Int64(i) => Value::Int64(i),
            BsonValue::Decimal128(d) => Value::Decimal128(d),
            BsonValue::MinKey => Value::MinKey,
            BsonValue::MaxKey => Value::MaxKey,
        }
    }
}

// ── ValueKind ─────────────────────────────────────────────────────────────

/// Discriminant of a [`Value`], used as the codec registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Null,
    Ref,
    List,
    Document,
    Map,
    CodeWithScope,
    Bytes,
    Symbol,
    Double,
    String,
    ObjectId,
    Boolean,
    DateTime,
    Regex,
    Code,
    Int32,
    Timestamp,
    Int64,
    Decimal128,
    MinKey,
    MaxKey,
    Undefined,
    Binary,
    Uuid,
    Bson,
}

impl ValueKind {
    /// Kinds written and read through a scalar codec.
    pub const SCALARS: [ValueKind; 17] = [
        ValueKind::Double,
        ValueKind::String,
        ValueKind::ObjectId,
        ValueKind::Boolean,
        ValueKind::DateTime,
        ValueKind::Regex,
        ValueKind::Code,
        ValueKind::Int32,
        ValueKind::Timestamp,
        ValueKind::Int64,
        ValueKind::Decimal128,
        ValueKind::MinKey,
        ValueKind::MaxKey,
        ValueKind::Undefined,
        ValueKind::Binary,
        ValueKind::Uuid,
        ValueKind::Bson,
    ];
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ── DbRef ─────────────────────────────────────────────────────────────────

/// Reference to a document by collection name and identifier.
///
/// Encoded as `{"$ref": namespace, "$id": id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRef {
    pub namespace: String,
    pub id: Box<Value>,
    /// Database the reference was resolved against, if the codec has one.
    pub database: Option<String>,
}

impl DbRef {
    pub fn new(namespace: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            namespace: namespace.into(),
            id: Box::new(id.into()),
            database: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// JavaScript code paired with a scope document.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeWithScope {
    pub code: String,
    pub scope: Document,
}

impl CodeWithScope {
    pub fn new(code: impl Into<String>, scope: Document) -> Self {
        Self {
            code: code.into(),
            scope,
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Boolean,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    Vec<Value> => List,
    Document => Document,
    BTreeMap<String, Value> => Map,
    DbRef => Ref,
    CodeWithScope => CodeWithScope,
    BsonObjectId => ObjectId,
    BsonTimestamp => Timestamp,
    BsonDecimal128 => Decimal128,
    BsonBinary => Binary,
    Uuid => Uuid,
    BsonValue => Bson,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

/// Fixed-size arrays are encoded like any other list.
impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdoc_bson::{subtype, BsonDbPointer};

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(1).kind(), ValueKind::Int32);
        assert_eq!(Value::from(1i64).kind(), ValueKind::Int64);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::from(vec![1u8]).kind(), ValueKind::Bytes);
        assert_eq!(Value::from([1, 2]).kind(), ValueKind::List);
        assert_eq!(Value::from(Uuid::nil()).kind(), ValueKind::Uuid);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Boolean(true));
    }

    #[test]
    fn from_bson_maps_structure() {
        let id = BsonObjectId {
            timestamp: 1,
            process: 2,
            counter: 3,
        };
        let value = Value::from_bson(BsonValue::Document(vec![
            ("a".into(), BsonValue::Array(vec![BsonValue::Int32(1)])),
            (
                "p".into(),
                BsonValue::DbPointer(BsonDbPointer {
                    name: "coll".into(),
                    id,
                }),
            ),
            (
                "b".into(),
                BsonValue::Binary(BsonBinary {
                    subtype: subtype::MD5,
                    data: vec![0; 16],
                }),
            ),
        ]));
        let doc = value.as_document().unwrap();
        assert_eq!(doc["a"], Value::List(vec![Value::Int32(1)]));
        assert_eq!(doc["p"], Value::Ref(DbRef::new("coll", id)));
        assert_eq!(doc["b"].kind(), ValueKind::Binary);
    }
}
