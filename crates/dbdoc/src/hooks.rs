//! Value transformation hooks.

use std::borrow::Cow;

use crate::value::Value;

/// Transforms values on their way to and from the wire.
///
/// `before_encode` sees every value before it is written, including the
/// `_id` value and values nested inside lists, documents and maps.
/// `after_decode` sees every value after it is read, innermost first.
pub trait Hooks: Send + Sync {
    fn before_encode<'v>(&self, value: &'v Value) -> Cow<'v, Value> {
        Cow::Borrowed(value)
    }

    fn after_decode(&self, value: Value) -> Value {
        value
    }
}

/// Identity hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl Hooks for NoHooks {}
