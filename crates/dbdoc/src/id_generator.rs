//! Identifier generation for documents without an `_id`.

use dbdoc_bson::BsonObjectId;

use crate::value::Value;

pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Value;
}

/// Generates fresh ObjectIds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdGenerator;

impl IdGenerator for ObjectIdGenerator {
    fn generate(&self) -> Value {
        Value::ObjectId(BsonObjectId::generate())
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> Value + Send + Sync,
{
    fn generate(&self) -> Value {
        self()
    }
}
