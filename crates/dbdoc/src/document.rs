//! Ordered string-keyed document.

use std::ops::Index;

use indexmap::IndexMap;

use crate::value::Value;

/// An insertion-ordered map from field name to [`Value`].
///
/// Re-inserting an existing field replaces its value in place. A document
/// may carry a `type_name` label assigned by the
/// [`DocumentFactory`](crate::DocumentFactory) that created it; the label
/// does not take part in encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: IndexMap<String, Value>,
    type_name: Option<String>,
}

static NULL: Value = Value::Null;

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_name(type_name: impl Into<String>) -> Self {
        Self {
            fields: IndexMap::new(),
            type_name: Some(type_name.into()),
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Index<&str> for Document {
    type Output = Value;

    /// Missing fields read as `Null`.
    fn index(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&NULL)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            type_name: None,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Document {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_keeps_position_of_existing_field() {
        let mut doc = Document::new();
        doc.put("a", 1);
        doc.put("b", 2);
        assert_eq!(doc.put("a", 3), Some(Value::Int32(1)));
        let keys: Vec<_> = doc.keys().cloned().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(doc["a"], Value::Int32(3));
    }

    #[test]
    fn remove_preserves_order() {
        let mut doc: Document = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(doc.remove("b"), Some(Value::Int32(2)));
        let keys: Vec<_> = doc.keys().cloned().collect();
        assert_eq!(keys, ["a", "c"]);
        assert!(doc.remove("missing").is_none());
    }

    #[test]
    fn missing_field_indexes_as_null() {
        let doc = Document::new();
        assert!(doc["nope"].is_null());
        assert!(!doc.contains_field("nope"));
    }

    #[test]
    fn type_name_does_not_affect_contents() {
        let mut doc = Document::with_type_name("Person");
        doc.put("name", "Ada");
        assert_eq!(doc.type_name(), Some("Person"));
        assert_eq!(doc.len(), 1);
    }
}
