use dbdoc_bson::{BsonDocumentWriter, BsonValue, BsonWriter};
use tracing::debug;

use super::{DocumentCodec, ID_FIELD_NAME};
use crate::document::Document;
use crate::error::{CodecError, Result};
use crate::value::Value;

/// Identifier management for codecs of documents stored in a collection.
pub trait CollectibleCodec {
    type Document;

    fn has_id(&self, document: &Self::Document) -> bool;

    /// The document's identifier in its encoded BSON form.
    fn get_id(&self, document: &Self::Document) -> Result<BsonValue>;

    /// Assigns a generated identifier if the document has none.
    fn ensure_id(&self, document: &mut Self::Document);
}

impl CollectibleCodec for DocumentCodec {
    type Document = Document;

    fn has_id(&self, document: &Document) -> bool {
        document.contains_field(ID_FIELD_NAME)
    }

    fn get_id(&self, document: &Document) -> Result<BsonValue> {
        let id = document
            .get(ID_FIELD_NAME)
            .ok_or(CodecError::InvalidState("the document does not contain an _id"))?;
        if let Value::Bson(bson) = id {
            return Ok(bson.clone());
        }

        let mut writer = BsonDocumentWriter::new();
        writer.write_start_document().map_err(CodecError::Encode)?;
        writer.write_name(ID_FIELD_NAME).map_err(CodecError::Encode)?;
        self.write_value(&mut writer, id)?;
        writer.write_end_document().map_err(CodecError::Encode)?;
        writer
            .into_document()
            .and_then(|fields| fields.into_iter().next())
            .map(|(_, value)| value)
            .ok_or(CodecError::InvalidState("the _id was not written"))
    }

    fn ensure_id(&self, document: &mut Document) {
        if !self.has_id(document) {
            let id = self.id_generator.generate();
            debug!(id = ?id, "generated document id");
            document.put(ID_FIELD_NAME, id);
        }
    }
}
