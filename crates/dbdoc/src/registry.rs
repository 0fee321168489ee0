//! Scalar codecs and the lookup tables that select them.
//!
//! The document codec handles containers itself and delegates every leaf
//! value to a [`ScalarCodec`]. On encode the codec is chosen by the value's
//! [`ValueKind`]; on decode the wire [`BsonType`] is first mapped to a kind
//! through a [`BsonTypeClassMap`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dbdoc_bson::{
    read_bson_value, subtype, write_bson_value, BsonError, BsonReader, BsonType, BsonWriter,
};

use crate::binary::{legacy_uuid_from_bytes, legacy_uuid_to_binary};
use crate::error::{CodecError, Result};
use crate::value::{Value, ValueKind};

/// Writes and reads a single leaf value.
pub trait ScalarCodec: Send + Sync {
    fn encode(&self, writer: &mut dyn BsonWriter, value: &Value) -> std::result::Result<(), BsonError>;
    fn decode(&self, reader: &mut dyn BsonReader) -> std::result::Result<Value, BsonError>;
}

// ── StandardCodec ─────────────────────────────────────────────────────────

/// The built-in codec for one scalar [`ValueKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCodec {
    kind: ValueKind,
}

impl StandardCodec {
    pub fn new(kind: ValueKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    fn mismatch(&self, value: &Value) -> BsonError {
        BsonError::InvalidValue(format!(
            "{} codec cannot encode a {} value",
            self.kind,
            value.kind()
        ))
    }
}

impl ScalarCodec for StandardCodec {
    fn encode(&self, writer: &mut dyn BsonWriter, value: &Value) -> std::result::Result<(), BsonError> {
        if value.kind() != self.kind {
            return Err(self.mismatch(value));
        }
        match value {
            Value::Double(f) => writer.write_double(*f),
            Value::String(s) => writer.write_string(s),
            Value::ObjectId(id) => writer.write_object_id(id),
            Value::Boolean(b) => writer.write_boolean(*b),
            Value::DateTime(ms) => writer.write_date_time(*ms),
            Value::Regex { pattern, options } => writer.write_regular_expression(pattern, options),
            Value::Code(code) => writer.write_javascript(code),
            Value::Int32(i) => writer.write_int32(*i),
            Value::Timestamp(ts) => writer.write_timestamp(ts),
            Value::Int64(i) => writer.write_int64(*i),
            Value::Decimal128(d) => writer.write_decimal128(d),
            Value::MinKey => writer.write_min_key(),
            Value::MaxKey => writer.write_max_key(),
            Value::Undefined => writer.write_undefined(),
            Value::Binary(binary) => writer.write_binary_data(binary),
            Value::Uuid(uuid) => writer.write_binary_data(&legacy_uuid_to_binary(uuid)),
            Value::Bson(bson) => write_bson_value(writer, bson),
            Value::Symbol(s) => writer.write_symbol(s),
            other => Err(self.mismatch(other)),
        }
    }

    fn decode(&self, reader: &mut dyn BsonReader) -> std::result::Result<Value, BsonError> {
        let value = match self.kind {
            ValueKind::Double => Value::Double(reader.read_double()?),
            ValueKind::String => Value::String(reader.read_string()?),
            ValueKind::ObjectId => Value::ObjectId(reader.read_object_id()?),
            ValueKind::Boolean => Value::Boolean(reader.read_boolean()?),
            ValueKind::DateTime => Value::DateTime(reader.read_date_time()?),
            ValueKind::Regex => {
                let (pattern, options) = reader.read_regular_expression()?;
                Value::Regex { pattern, options }
            }
            ValueKind::Code => Value::Code(reader.read_javascript()?),
            ValueKind::Symbol => Value::Symbol(reader.read_symbol()?),
            ValueKind::Int32 => Value::Int32(reader.read_int32()?),
            ValueKind::Timestamp => Value::Timestamp(reader.read_timestamp()?),
            ValueKind::Int64 => Value::Int64(reader.read_int64()?),
            ValueKind::Decimal128 => Value::Decimal128(reader.read_decimal128()?),
            ValueKind::MinKey => {
                reader.read_min_key()?;
                Value::MinKey
            }
            ValueKind::MaxKey => {
                reader.read_max_key()?;
                Value::MaxKey
            }
            ValueKind::Undefined => {
                reader.read_undefined()?;
                Value::Undefined
            }
            ValueKind::Binary => Value::Binary(reader.read_binary_data()?),
            ValueKind::Uuid => {
                let binary = reader.read_binary_data()?;
                if binary.subtype != subtype::UUID_LEGACY && binary.subtype != subtype::UUID_STANDARD {
                    return Err(BsonError::InvalidValue(format!(
                        "binary subtype {:#04x} is not a UUID",
                        binary.subtype
                    )));
                }
                Value::Uuid(legacy_uuid_from_bytes(&binary.data)?)
            }
            ValueKind::Bson => Value::Bson(read_bson_value(reader)?),
            other => {
                return Err(BsonError::InvalidState(format!(
                    "{other} values are not decoded by a scalar codec"
                )))
            }
        };
        Ok(value)
    }
}

// ── CodecRegistry ─────────────────────────────────────────────────────────

/// Scalar codecs keyed by value kind.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: HashMap<ValueKind, Arc<dyn ScalarCodec>>,
}

impl CodecRegistry {
    /// A registry with no codecs at all.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// Registers `codec` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: ValueKind, codec: impl ScalarCodec + 'static) -> &mut Self {
        self.codecs.insert(kind, Arc::new(codec));
        self
    }

    pub fn with(mut self, kind: ValueKind, codec: impl ScalarCodec + 'static) -> Self {
        self.register(kind, codec);
        self
    }

    pub fn remove(&mut self, kind: ValueKind) -> Option<Arc<dyn ScalarCodec>> {
        self.codecs.remove(&kind)
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.codecs.contains_key(&kind)
    }

    pub fn get(&self, kind: ValueKind) -> Result<&dyn ScalarCodec> {
        self.codecs
            .get(&kind)
            .map(|codec| &**codec)
            .ok_or(CodecError::CodecNotFound(kind))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in ValueKind::SCALARS {
            registry.register(kind, StandardCodec::new(kind));
        }
        registry.register(ValueKind::Symbol, StandardCodec::new(ValueKind::Symbol));
        registry
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.codecs.keys().collect();
        kinds.sort();
        f.debug_struct("CodecRegistry").field("kinds", &kinds).finish()
    }
}

// ── BsonTypeClassMap ──────────────────────────────────────────────────────

/// Maps wire types to the value kind they decode to.
///
/// Documents, arrays, binary data, code with scope, DB pointers and nulls
/// are decoded structurally and never consult the map.
#[derive(Debug, Clone)]
pub struct BsonTypeClassMap {
    map: HashMap<BsonType, ValueKind>,
}

impl BsonTypeClassMap {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, bson_type: BsonType) -> Option<ValueKind> {
        self.map.get(&bson_type).copied()
    }

    pub fn with(mut self, bson_type: BsonType, kind: ValueKind) -> Self {
        self.map.insert(bson_type, kind);
        self
    }
}

impl Default for BsonTypeClassMap {
    fn default() -> Self {
        Self::empty()
            .with(BsonType::Double, ValueKind::Double)
            .with(BsonType::String, ValueKind::String)
            .with(BsonType::Binary, ValueKind::Binary)
            .with(BsonType::Undefined, ValueKind::Undefined)
            .with(BsonType::ObjectId, ValueKind::ObjectId)
            .with(BsonType::Boolean, ValueKind::Boolean)
            .with(BsonType::DateTime, ValueKind::DateTime)
            .with(BsonType::RegularExpression, ValueKind::Regex)
            .with(BsonType::JavaScript, ValueKind::Code)
            .with(BsonType::Symbol, ValueKind::Symbol)
            .with(BsonType::Int32, ValueKind::Int32)
            .with(BsonType::Timestamp, ValueKind::Timestamp)
            .with(BsonType::Int64, ValueKind::Int64)
            .with(BsonType::Decimal128, ValueKind::Decimal128)
            .with(BsonType::MinKey, ValueKind::MinKey)
            .with(BsonType::MaxKey, ValueKind::MaxKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbdoc_bson::{BsonBinaryReader, BsonBinaryWriter};

    fn roundtrip(value: Value) -> Value {
        let codec = StandardCodec::new(value.kind());
        let mut writer = BsonBinaryWriter::new();
        writer.write_start_document().unwrap();
        writer.write_name("v").unwrap();
        codec.encode(&mut writer, &value).unwrap();
        writer.write_end_document().unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BsonBinaryReader::new(&bytes);
        reader.read_start_document().unwrap();
        reader.read_bson_type().unwrap();
        reader.read_name().unwrap();
        codec.decode(&mut reader).unwrap()
    }

    #[test]
    fn standard_codecs_roundtrip() {
        for value in [
            Value::Double(2.5),
            Value::from("s"),
            Value::Boolean(true),
            Value::DateTime(-1),
            Value::Regex {
                pattern: "a+".into(),
                options: "im".into(),
            },
            Value::Code("f()".into()),
            Value::Int32(-7),
            Value::Int64(1 << 40),
            Value::MinKey,
            Value::MaxKey,
            Value::Undefined,
            Value::Uuid(uuid::Uuid::from_u128(42)),
        ] {
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn codec_rejects_other_kinds() {
        let codec = StandardCodec::new(ValueKind::Int32);
        let mut writer = BsonBinaryWriter::new();
        writer.write_start_document().unwrap();
        writer.write_name("v").unwrap();
        assert!(codec.encode(&mut writer, &Value::from("x")).is_err());
    }

    #[test]
    fn default_registry_covers_scalars() {
        let registry = CodecRegistry::default();
        for kind in ValueKind::SCALARS {
            assert!(registry.contains(kind), "{kind}");
        }
        assert!(matches!(
            registry.get(ValueKind::List),
            Err(CodecError::CodecNotFound(ValueKind::List))
        ));
    }

    #[test]
    fn class_map_overrides() {
        let map = BsonTypeClassMap::default().with(BsonType::Int32, ValueKind::Int64);
        assert_eq!(map.get(BsonType::Int32), Some(ValueKind::Int64));
        assert_eq!(map.get(BsonType::Document), None);
    }
}
