use std::fmt;
use std::sync::Arc;

use crate::coerce::{Coercible, TypeShape};

/// Ordered `(name, values)` pairs, as produced by form or query decoding.
///
/// A name may carry several values. Binding only ever looks at the first
/// value recorded for a name.
///
/// # Examples
///
/// ```
/// use request_binder::NamedValues;
///
/// let mut query = NamedValues::new();
/// query.append("tag", "red");
/// query.append("page", "2");
/// query.append("tag", "blue");
///
/// assert_eq!(query.get("tag"), Some("red"));
/// assert_eq!(query.get_all("tag"), ["red", "blue"]);
///
/// let firsts: Vec<_> = query.iter_first().collect();
/// assert_eq!(firsts, [("tag", "red"), ("page", "2")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedValues {
    entries: Vec<(String, Vec<String>)>,
}

impl NamedValues {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `name`, keeping the name's first position.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Returns the first value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Returns every value recorded for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// Iterates names in first-seen order, each with its first value.
    pub fn iter_first(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(name, values)| {
            values
                .first()
                .map(|value| (name.as_str(), value.as_str()))
        })
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no value was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NamedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.append(name, value);
        }
        values
    }
}

/// An uploaded file from a multipart form.
///
/// This is the only type form files bind to. It never comes from text, so
/// its shape declares no conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    /// Name of the form field the file was uploaded under.
    pub name: String,
    /// File name supplied by the client.
    pub file_name: String,
    /// Declared content type.
    pub content_type: Option<String>,
    /// File contents.
    pub content: Arc<[u8]>,
}

impl FormFile {
    /// Creates a file upload.
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Length of the contents in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Display for FormFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

impl Coercible for FormFile {
    fn shape() -> TypeShape<Self> {
        TypeShape::new()
    }
}

/// Decoded form content: fields and uploaded files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    /// Form fields in submission order.
    pub fields: NamedValues,
    /// Uploaded files in submission order.
    pub files: Vec<FormFile>,
}

impl FormData {
    /// Creates empty form content.
    pub fn new() -> Self {
        Self::default()
    }
}
