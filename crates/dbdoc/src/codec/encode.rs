use dbdoc_bson::{BsonBinary, BsonWriter};
use tracing::trace;

use super::{DocumentCodec, ID_FIELD_NAME};
use crate::document::Document;
use crate::error::{CodecError, Result};
use crate::value::{DbRef, Value};

impl DocumentCodec {
    /// Writes `document` as a BSON document.
    ///
    /// The `_id` field, if present, is written first; all other fields follow
    /// in document order.
    pub fn encode(&self, writer: &mut dyn BsonWriter, document: &Document) -> Result<()> {
        trace!(fields = document.len(), "encoding document");
        writer.write_start_document().map_err(CodecError::Encode)?;
        if let Some(id) = document.get(ID_FIELD_NAME) {
            writer.write_name(ID_FIELD_NAME).map_err(CodecError::Encode)?;
            self.write_value(writer, id)?;
        }
        for (name, value) in document {
            if name == ID_FIELD_NAME {
                continue;
            }
            writer.write_name(name).map_err(CodecError::Encode)?;
            self.write_value(writer, value)?;
        }
        writer.write_end_document().map_err(CodecError::Encode)
    }

    pub(super) fn write_value(&self, writer: &mut dyn BsonWriter, value: &Value) -> Result<()> {
        let value = self.hooks.before_encode(value);
        match &*value {
            Value::Null => writer.write_null().map_err(CodecError::Encode),
            Value::Ref(db_ref) => self.write_db_ref(writer, db_ref),
            Value::List(items) => self.write_list(writer, items),
            Value::Document(doc) => self.write_fields(writer, doc),
            Value::Map(map) => self.write_fields(writer, map),
            Value::CodeWithScope(cws) => {
                writer
                    .write_javascript_with_scope(&cws.code)
                    .map_err(CodecError::Encode)?;
                self.write_fields(writer, &cws.scope)
            }
            Value::Bytes(bytes) => writer
                .write_binary_data(&BsonBinary::new(bytes.clone()))
                .map_err(CodecError::Encode),
            Value::Symbol(symbol) => writer.write_symbol(symbol).map_err(CodecError::Encode),
            other => self
                .registry
                .get(other.kind())?
                .encode(writer, other)
                .map_err(CodecError::Encode),
        }
    }

    /// Embedded document in iteration order. Unlike the top level, `_id` is
    /// not moved to the front.
    fn write_fields<'a, I>(&self, writer: &mut dyn BsonWriter, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        writer.write_start_document().map_err(CodecError::Encode)?;
        for (name, value) in fields {
            writer.write_name(name).map_err(CodecError::Encode)?;
            self.write_value(writer, value)?;
        }
        writer.write_end_document().map_err(CodecError::Encode)
    }

    fn write_list(&self, writer: &mut dyn BsonWriter, items: &[Value]) -> Result<()> {
        writer.write_start_array().map_err(CodecError::Encode)?;
        for item in items {
            self.write_value(writer, item)?;
        }
        writer.write_end_array().map_err(CodecError::Encode)
    }

    fn write_db_ref(&self, writer: &mut dyn BsonWriter, db_ref: &DbRef) -> Result<()> {
        writer.write_start_document().map_err(CodecError::Encode)?;
        writer.write_name("$ref").map_err(CodecError::Encode)?;
        writer
            .write_string(&db_ref.namespace)
            .map_err(CodecError::Encode)?;
        writer.write_name("$id").map_err(CodecError::Encode)?;
        self.write_value(writer, &db_ref.id)?;
        writer.write_end_document().map_err(CodecError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use dbdoc_bson::{BsonDocumentWriter, BsonValue};

    fn encode_fields(codec: &DocumentCodec, document: &Document) -> Vec<(String, BsonValue)> {
        let mut writer = BsonDocumentWriter::new();
        codec.encode(&mut writer, document).unwrap();
        writer.into_document().unwrap()
    }

    #[test]
    fn id_is_written_first() {
        let doc: Document = [("a", Value::Int32(1)), ("_id", Value::Int32(5))]
            .into_iter()
            .collect();
        let fields = encode_fields(&DocumentCodec::new(), &doc);
        let names: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["_id", "a"]);
    }

    #[test]
    fn nested_id_keeps_position() {
        let inner: Document = [("a", 1), ("_id", 2)].into_iter().collect();
        let doc: Document = [("inner", inner)].into_iter().collect();
        let fields = encode_fields(&DocumentCodec::new(), &doc);
        let BsonValue::Document(inner) = &fields[0].1 else {
            panic!("expected embedded document");
        };
        assert_eq!(inner[0].0, "a");
    }

    #[test]
    fn map_is_an_embedded_document() {
        let map: BTreeMap<String, Value> = [("k".to_owned(), Value::from(true))].into();
        let doc: Document = [("m", map)].into_iter().collect();
        let fields = encode_fields(&DocumentCodec::new(), &doc);
        assert_eq!(
            fields[0].1,
            BsonValue::Document(vec![("k".into(), BsonValue::Boolean(true))])
        );
    }

    #[test]
    fn reference_is_written_as_ref_id_document() {
        let doc: Document = [("r", DbRef::new("coll", 42))].into_iter().collect();
        let fields = encode_fields(&DocumentCodec::new(), &doc);
        assert_eq!(
            fields[0].1,
            BsonValue::Document(vec![
                ("$ref".into(), BsonValue::Str("coll".into())),
                ("$id".into(), BsonValue::Int32(42)),
            ])
        );
    }
}
