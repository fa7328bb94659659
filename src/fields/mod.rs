//! Ordered field evaluation
//!
//! A document is described by a list of [`FieldDefinition`]s. Fields are
//! evaluated strictly in the order they are declared: each result is stored
//! in the [`VariableContext`](crate::VariableContext) under the field's name
//! before the next field runs, so a field can reference any field declared
//! above it. References to fields declared further down see the literal
//! `<Name>` token.

#![warn(missing_docs)]

mod dependencies;
mod document;
mod evaluator;

pub use dependencies::{DependencyReport, ForwardReference, analyze_dependencies};
pub use document::FieldDocument;
pub use evaluator::FieldEvaluator;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for field document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors loading or saving field definitions and documents
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read or written
    #[error("Field file {} could not be accessed: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file does not hold the expected JSON
    #[error("Field file {} is not valid: {source}", path.display())]
    Parse {
        /// File path
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized
    #[error("Field document could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where a field's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    /// The expression is evaluated as written
    #[default]
    Expression,
    /// The expression names a script, run through `SCRIPTING`
    #[serde(alias = "skript")]
    Script,
    /// The expression is `connection, query[, column]`, run through `SQL`
    Sql,
}

/// One field of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name, also the variable name later fields use
    #[serde(alias = "field_name")]
    pub name: String,
    /// Expression producing the value
    #[serde(default)]
    pub expression: String,
    /// How the expression is interpreted
    #[serde(default, alias = "source_type")]
    pub source: FieldSource,
}

impl FieldDefinition {
    /// A field evaluated as a plain expression
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            source: FieldSource::Expression,
        }
    }

    /// Change the value source
    pub fn with_source(mut self, source: FieldSource) -> Self {
        self.source = source;
        self
    }

    /// Expression text handed to the engine
    pub fn effective_expression(&self) -> String {
        match self.source {
            FieldSource::Expression => self.expression.clone(),
            FieldSource::Script => format!("SCRIPTING({})", self.expression),
            FieldSource::Sql => format!("SQL({})", self.expression),
        }
    }

    /// Load definitions from a JSON array file
    pub fn load_all(path: &Path) -> DocumentResult<Vec<FieldDefinition>> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effective_expression() {
        let field = FieldDefinition::new("Nr", "C:\\scripts\\nr.bat");
        assert_eq!(field.effective_expression(), "C:\\scripts\\nr.bat");
        assert_eq!(
            field.clone().with_source(FieldSource::Script).effective_expression(),
            "SCRIPTING(C:\\scripts\\nr.bat)"
        );
        let sql = FieldDefinition::new("Kunde", "\"crm\", \"SELECT name FROM k\"")
            .with_source(FieldSource::Sql);
        assert_eq!(
            sql.effective_expression(),
            "SQL(\"crm\", \"SELECT name FROM k\")"
        );
    }

    #[test]
    fn test_load_definitions_with_legacy_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        fs::write(
            &path,
            r#"[
                {"name": "A", "expression": "X"},
                {"field_name": "B", "expression": "run.sh", "source_type": "skript"},
                {"name": "C", "source": "sql", "expression": "\"db\", \"SELECT 1\""},
                {"name": "D"}
            ]"#,
        )
        .unwrap();

        let fields = FieldDefinition::load_all(&path).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[1].name, "B");
        assert_eq!(fields[1].source, FieldSource::Script);
        assert_eq!(fields[2].source, FieldSource::Sql);
        assert_eq!(fields[3].expression, "");
        assert_eq!(fields[3].source, FieldSource::Expression);
    }

    #[test]
    fn test_load_definitions_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FieldDefinition::load_all(&dir.path().join("none.json"));
        assert!(matches!(missing, Err(DocumentError::Io { .. })));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FieldDefinition::load_all(&path),
            Err(DocumentError::Parse { .. })
        ));
    }
}
