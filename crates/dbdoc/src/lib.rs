//! dbdoc: a dynamically-typed document model and its BSON document codec.
//!
//! [`DocumentCodec`] converts between [`Document`] and a stream of BSON
//! tokens driven through the [`BsonWriter`](dbdoc_bson::BsonWriter) and
//! [`BsonReader`](dbdoc_bson::BsonReader) traits. Leaf values are handled by
//! a pluggable [`CodecRegistry`]; decoded documents are instantiated by a
//! [`DocumentFactory`] that sees the [`Path`] of each document in the tree.

pub mod binary;
pub mod codec;
pub mod document;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod id_generator;
pub mod json;
pub mod path;
pub mod registry;
pub mod value;

pub use codec::{CollectibleCodec, DocumentCodec, DocumentCodecBuilder, ID_FIELD_NAME};
pub use document::Document;
pub use error::{CodecError, Result};
pub use factory::{BasicDocumentFactory, DocumentFactory, PathDocumentFactory};
pub use hooks::{Hooks, NoHooks};
pub use id_generator::{IdGenerator, ObjectIdGenerator};
pub use path::{Path, PathGuard};
pub use registry::{BsonTypeClassMap, CodecRegistry, ScalarCodec, StandardCodec};
pub use value::{CodeWithScope, DbRef, Value, ValueKind};

pub use dbdoc_bson as bson;
