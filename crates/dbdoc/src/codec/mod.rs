//! The document codec.
//!
//! [`DocumentCodec`] walks a [`Document`] tree and drives a
//! [`BsonWriter`](dbdoc_bson::BsonWriter), and rebuilds the tree from a
//! [`BsonReader`](dbdoc_bson::BsonReader). Containers (documents, maps,
//! lists, references, code with scope) are handled here; leaf values go
//! through the [`CodecRegistry`].

mod decode;
mod encode;
mod id;

use std::fmt;
use std::sync::Arc;

use dbdoc_bson::{BsonBinaryReader, BsonBinaryWriter, BsonError};

use crate::document::Document;
use crate::error::{CodecError, Result};
use crate::factory::{BasicDocumentFactory, DocumentFactory};
use crate::hooks::{Hooks, NoHooks};
use crate::id_generator::{IdGenerator, ObjectIdGenerator};
use crate::registry::{BsonTypeClassMap, CodecRegistry};

pub use id::CollectibleCodec;

/// Name of the identifier field.
pub const ID_FIELD_NAME: &str = "_id";

/// Converts between [`Document`] and BSON.
///
/// Immutable once built and cheap to clone; share it freely across threads.
#[derive(Clone)]
pub struct DocumentCodec {
    registry: Arc<CodecRegistry>,
    type_map: Arc<BsonTypeClassMap>,
    factory: Arc<dyn DocumentFactory>,
    hooks: Arc<dyn Hooks>,
    id_generator: Arc<dyn IdGenerator>,
    database: Option<String>,
}

impl DocumentCodec {
    /// Codec with the default registry, type map, factory and identifier
    /// generator, and no hooks.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DocumentCodecBuilder {
        DocumentCodecBuilder::default()
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn type_map(&self) -> &BsonTypeClassMap {
        &self.type_map
    }

    /// Database stamped on decoded references.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Encodes `document` into a standalone BSON byte buffer.
    pub fn encode_to_vec(&self, document: &Document) -> Result<Vec<u8>> {
        let mut writer = BsonBinaryWriter::new();
        self.encode(&mut writer, document)?;
        Ok(writer.into_bytes())
    }

    /// Decodes a single BSON document occupying all of `data`.
    pub fn decode_from_slice(&self, data: &[u8]) -> Result<Document> {
        let mut reader = BsonBinaryReader::new(data);
        let document = self.decode(&mut reader)?;
        if !reader.is_exhausted() {
            return Err(CodecError::Decode(BsonError::InvalidState(format!(
                "{} trailing bytes after document",
                data.len() - reader.position()
            ))));
        }
        Ok(document)
    }
}

impl Default for DocumentCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCodec")
            .field("registry", &self.registry)
            .field("type_map", &self.type_map)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

/// Configures a [`DocumentCodec`]. Every setting has a default.
pub struct DocumentCodecBuilder {
    registry: CodecRegistry,
    type_map: BsonTypeClassMap,
    factory: Arc<dyn DocumentFactory>,
    hooks: Arc<dyn Hooks>,
    id_generator: Arc<dyn IdGenerator>,
    database: Option<String>,
}

impl Default for DocumentCodecBuilder {
    fn default() -> Self {
        Self {
            registry: CodecRegistry::default(),
            type_map: BsonTypeClassMap::default(),
            factory: Arc::new(BasicDocumentFactory),
            hooks: Arc::new(NoHooks),
            id_generator: Arc::new(ObjectIdGenerator),
            database: None,
        }
    }
}

impl DocumentCodecBuilder {
    pub fn registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn type_map(mut self, type_map: BsonTypeClassMap) -> Self {
        self.type_map = type_map;
        self
    }

    pub fn factory(mut self, factory: impl DocumentFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(id_generator);
        self
    }

    /// Database recorded on references read from the wire.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn build(self) -> DocumentCodec {
        DocumentCodec {
            registry: Arc::new(self.registry),
            type_map: Arc::new(self.type_map),
            factory: self.factory,
            hooks: self.hooks,
            id_generator: self.id_generator,
            database: self.database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentCodec>();
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let codec = DocumentCodec::new();
        let mut bytes = codec.encode_to_vec(&Document::new()).unwrap();
        bytes.push(0);
        assert!(matches!(
            codec.decode_from_slice(&bytes),
            Err(CodecError::Decode(BsonError::InvalidState(_)))
        ));
    }
}
