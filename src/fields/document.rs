//! Stored field values

use super::{DocumentError, DocumentResult};
use crate::io::atomic_write;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Field name to value map that keeps insertion order.
///
/// The order is the evaluation order of the fields that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDocument {
    fields: IndexMap<String, String>,
}

impl FieldDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field; an existing field keeps its position
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Field names in document order
    pub fn names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Read a document from a JSON object file
    pub fn load(path: &Path) -> DocumentResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the document as pretty JSON, replacing the file atomically
    pub fn save(&self, path: &Path) -> DocumentResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        atomic_write(path, json.as_bytes()).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut document = Self::new();
        for (name, value) in iter {
            document.set(name, value);
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut doc: FieldDocument = [("A", "1"), ("B", "2"), ("C", "3")].into_iter().collect();
        assert_eq!(doc.set("A", "9"), Some("1".to_string()));
        doc.set("D", "4");
        assert_eq!(doc.names(), vec!["A", "B", "C", "D"]);
        assert_eq!(doc.get("A"), Some("9"));
    }

    #[test]
    fn test_save_and_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("doc.json");
        let doc: FieldDocument = [("Zeta", "z"), ("Alpha", "a")].into_iter().collect();
        doc.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("Zeta").unwrap() < text.find("Alpha").unwrap());
        assert_eq!(FieldDocument::load(&path).unwrap(), doc);
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            FieldDocument::load(&path),
            Err(DocumentError::Parse { .. })
        ));
    }
}
