//! Document construction during decoding.

use std::collections::HashMap;

use crate::document::Document;
use crate::path::Path;

/// Creates the empty document each decoded document is read into.
///
/// `path` is the field-name path of the document being created; the root
/// document has an empty path.
pub trait DocumentFactory: Send + Sync {
    fn create(&self, path: &Path) -> Document;
}

/// Creates plain untyped documents at every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicDocumentFactory;

impl DocumentFactory for BasicDocumentFactory {
    fn create(&self, _path: &Path) -> Document {
        Document::new()
    }
}

/// Labels documents by their field-name path.
///
/// Paths are matched segment by segment, so a field literally named `"a.b"`
/// is distinct from field `b` nested under `a`.
///
/// ```
/// use dbdoc::{DocumentFactory, Path, PathDocumentFactory};
///
/// let factory = PathDocumentFactory::new()
///     .root("Person")
///     .with_type(["address"], "Address");
/// let path: Path = ["address"].into_iter().collect();
/// assert_eq!(factory.create(&path).type_name(), Some("Address"));
/// assert_eq!(factory.create(&Path::new()).type_name(), Some("Person"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathDocumentFactory {
    types: HashMap<Vec<String>, String>,
}

impl PathDocumentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type name of the root document.
    pub fn root(self, type_name: impl Into<String>) -> Self {
        self.with_type(Vec::<String>::new(), type_name)
    }

    pub fn with_type<I, S>(mut self, path: I, type_name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = path.into_iter().map(Into::into).collect();
        self.types.insert(segments, type_name.into());
        self
    }
}

impl DocumentFactory for PathDocumentFactory {
    fn create(&self, path: &Path) -> Document {
        match self.types.get(path.segments()) {
            Some(type_name) => Document::with_type_name(type_name.clone()),
            None => Document::new(),
        }
    }
}

impl<F> DocumentFactory for F
where
    F: Fn(&Path) -> Document + Send + Sync,
{
    fn create(&self, path: &Path) -> Document {
        self(path)
    }
}
