use dbdoc_bson::{subtype, BsonError, BsonReader, BsonType};
use tracing::{debug, trace};

use super::DocumentCodec;
use crate::binary::legacy_uuid_from_bytes;
use crate::document::Document;
use crate::error::{CodecError, Result};
use crate::path::Path;
use crate::value::{CodeWithScope, DbRef, Value};

impl DocumentCodec {
    /// Reads a BSON document from `reader`.
    pub fn decode(&self, reader: &mut dyn BsonReader) -> Result<Document> {
        let mut path = Path::new();
        self.decode_at(reader, &mut path)
    }

    /// Reads a BSON document that sits at `path` in an enclosing tree.
    ///
    /// Nested documents are created by the factory with `path` extended by
    /// their field names. `path` is back to its original contents when this
    /// returns, whether or not decoding succeeded.
    pub fn decode_at(&self, reader: &mut dyn BsonReader, path: &mut Path) -> Result<Document> {
        trace!(%path, "decoding document");
        self.read_document(reader, path)
    }

    fn read_document(&self, reader: &mut dyn BsonReader, path: &mut Path) -> Result<Document> {
        let mut document = self.factory.create(path);
        reader.read_start_document().map_err(CodecError::Decode)?;
        while reader.read_bson_type().map_err(CodecError::Decode)? != BsonType::EndOfDocument {
            let name = reader.read_name().map_err(CodecError::Decode)?;
            let value = self.read_value(reader, Some(name.as_str()), path)?;
            document.put(name, value);
        }
        reader.read_end_document().map_err(CodecError::Decode)?;
        Ok(document)
    }

    /// Reads the current element. `field_name` is `None` for array elements,
    /// which do not extend the path.
    fn read_value(
        &self,
        reader: &mut dyn BsonReader,
        field_name: Option<&str>,
        path: &mut Path,
    ) -> Result<Value> {
        let bson_type = reader.current_bson_type().ok_or_else(|| {
            CodecError::Decode(BsonError::InvalidState("no current element".into()))
        })?;
        let value = match field_name {
            Some(name) if bson_type.is_container() => {
                let mut scope = path.enter(name);
                self.read_typed(reader, bson_type, &mut scope)?
            }
            _ => self.read_typed(reader, bson_type, path)?,
        };
        Ok(self.hooks.after_decode(value))
    }

    fn read_typed(
        &self,
        reader: &mut dyn BsonReader,
        bson_type: BsonType,
        path: &mut Path,
    ) -> Result<Value> {
        match bson_type {
            BsonType::Document => {
                let document = self.read_document(reader, path)?;
                self.verify_for_db_ref(document)
            }
            BsonType::Array => self.read_list(reader, path),
            BsonType::JavaScriptWithScope => {
                let code = reader
                    .read_javascript_with_scope()
                    .map_err(CodecError::Decode)?;
                let scope = self.read_document(reader, path)?;
                Ok(Value::CodeWithScope(CodeWithScope { code, scope }))
            }
            BsonType::DbPointer => {
                let pointer = reader.read_db_pointer().map_err(CodecError::Decode)?;
                Ok(Value::Ref(DbRef {
                    namespace: pointer.name,
                    id: Box::new(Value::ObjectId(pointer.id)),
                    database: self.database.clone(),
                }))
            }
            BsonType::Binary => self.read_binary(reader),
            BsonType::Null => {
                reader.read_null().map_err(CodecError::Decode)?;
                Ok(Value::Null)
            }
            other => {
                let kind = self
                    .type_map
                    .get(other)
                    .ok_or(CodecError::UnmappedBsonType(other))?;
                self.registry
                    .get(kind)?
                    .decode(reader)
                    .map_err(CodecError::Decode)
            }
        }
    }

    fn read_list(&self, reader: &mut dyn BsonReader, path: &mut Path) -> Result<Value> {
        reader.read_start_array().map_err(CodecError::Decode)?;
        let mut items = Vec::new();
        while reader.read_bson_type().map_err(CodecError::Decode)? != BsonType::EndOfDocument {
            items.push(self.read_value(reader, None, path)?);
        }
        reader.read_end_array().map_err(CodecError::Decode)?;
        Ok(Value::List(items))
    }

    fn read_binary(&self, reader: &mut dyn BsonReader) -> Result<Value> {
        let binary = reader.read_binary_data().map_err(CodecError::Decode)?;
        let value = match binary.subtype {
            subtype::BINARY | subtype::OLD_BINARY => Value::Bytes(binary.data),
            subtype::UUID_LEGACY if binary.data.len() == 16 => {
                Value::Uuid(legacy_uuid_from_bytes(&binary.data).map_err(CodecError::Decode)?)
            }
            _ => Value::Binary(binary),
        };
        Ok(value)
    }

    /// A document holding both `$ref` and `$id` is read as a reference; any
    /// other fields it has are dropped.
    fn verify_for_db_ref(&self, mut document: Document) -> Result<Value> {
        if !(document.contains_field("$ref") && document.contains_field("$id")) {
            return Ok(Value::Document(document));
        }
        let namespace = match document.remove("$ref") {
            Some(Value::String(namespace)) => namespace,
            Some(other) => {
                return Err(CodecError::InvalidReference(format!(
                    "$ref must be a string, found {}",
                    other.kind()
                )))
            }
            None => return Err(CodecError::InvalidReference("missing $ref".into())),
        };
        let id = document.remove("$id").unwrap_or(Value::Null);
        debug!(%namespace, "reading document as a reference");
        Ok(Value::Ref(DbRef {
            namespace,
            id: Box::new(id),
            database: self.database.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BsonTypeClassMap;
    use dbdoc_bson::{BsonBinary, BsonDecimal128, BsonEncoder, BsonValue};

    fn bytes_of(fields: Vec<(&str, BsonValue)>) -> Vec<u8> {
        let fields: Vec<_> = fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect();
        BsonEncoder::new().encode(&fields).unwrap()
    }

    #[test]
    fn ref_and_id_become_reference() {
        let bytes = bytes_of(vec![(
            "r",
            BsonValue::Document(vec![
                ("$id".into(), BsonValue::Int32(1)),
                ("extra".into(), BsonValue::Boolean(true)),
                ("$ref".into(), BsonValue::Str("coll".into())),
            ]),
        )]);
        let doc = DocumentCodec::new().decode_from_slice(&bytes).unwrap();
        assert_eq!(doc["r"], Value::Ref(DbRef::new("coll", 1)));
    }

    #[test]
    fn ref_alone_stays_a_document() {
        let bytes = bytes_of(vec![(
            "r",
            BsonValue::Document(vec![("$ref".into(), BsonValue::Str("coll".into()))]),
        )]);
        let doc = DocumentCodec::new().decode_from_slice(&bytes).unwrap();
        assert_eq!(doc["r"].as_document().map(Document::len), Some(1));
    }

    #[test]
    fn non_string_ref_is_invalid() {
        let bytes = bytes_of(vec![(
            "r",
            BsonValue::Document(vec![
                ("$ref".into(), BsonValue::Int32(3)),
                ("$id".into(), BsonValue::Int32(1)),
            ]),
        )]);
        assert!(matches!(
            DocumentCodec::new().decode_from_slice(&bytes),
            Err(CodecError::InvalidReference(_))
        ));
    }

    #[test]
    fn short_legacy_uuid_stays_opaque() {
        let binary = BsonBinary {
            subtype: subtype::UUID_LEGACY,
            data: vec![1, 2, 3],
        };
        let bytes = bytes_of(vec![("u", BsonValue::Binary(binary.clone()))]);
        let doc = DocumentCodec::new().decode_from_slice(&bytes).unwrap();
        assert_eq!(doc["u"], Value::Binary(binary));
    }

    #[test]
    fn unmapped_type_is_reported() {
        let codec = DocumentCodec::builder()
            .type_map(BsonTypeClassMap::empty())
            .build();
        let bytes = bytes_of(vec![(
            "d",
            BsonValue::Decimal128(BsonDecimal128 { data: vec![0; 16] }),
        )]);
        assert!(matches!(
            codec.decode_from_slice(&bytes),
            Err(CodecError::UnmappedBsonType(BsonType::Decimal128))
        ));
    }
}
