//! Field-name path of the document being decoded.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Sequence of field names from the root document to the current one.
///
/// Array elements do not add a segment: a document nested in an array sits
/// at the path of the field that holds the array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Pushes `name`; the segment is popped when the guard is dropped.
    pub fn enter(&mut self, name: &str) -> PathGuard<'_> {
        self.segments.push(name.to_owned());
        PathGuard { path: self }
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Dot-joined, e.g. `address.city`; the root path is empty.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Scope of one [`Path::enter`] call.
#[derive(Debug)]
pub struct PathGuard<'a> {
    path: &'a mut Path,
}

impl Deref for PathGuard<'_> {
    type Target = Path;

    fn deref(&self) -> &Path {
        self.path
    }
}

impl DerefMut for PathGuard<'_> {
    fn deref_mut(&mut self) -> &mut Path {
        self.path
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.path.segments.pop();
    }
}
