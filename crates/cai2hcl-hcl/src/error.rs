//! Error types for normalization, rendering and ingest
//!
//! - [`NormalizeError`]: schema conformance (strict mode)
//! - [`RenderError`]: value trees the serializer cannot render
//! - [`IngestError`]: malformed inventory input
//! - [`SchemaLoadError`]: malformed schema documents

use std::path::PathBuf;

use cai2hcl_model::{FieldPath, SchemaError};

/// Schema-conformance failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// Value shape does not match the declared field kind
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Offending field
        path: FieldPath,
        /// Declared shape, e.g. `list(string)`
        expected: String,
        /// Shape actually present
        found: String,
    },

    /// Required field absent or null
    #[error("{path} is required")]
    MissingRequired {
        /// Missing field
        path: FieldPath,
    },

    /// Key not declared by the governing schema
    #[error("undeclared field {path}")]
    UndeclaredField {
        /// Offending field
        path: FieldPath,
    },
}

impl NormalizeError {
    /// Create type mismatch error
    pub fn type_mismatch(
        path: FieldPath,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Path of the offending field
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::MissingRequired { path }
            | Self::UndeclaredField { path } => path,
        }
    }
}

/// Errors during block rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Block body is not an object or map
    #[error("block {labels:?} has a {found} body; expected object or map")]
    SerializationType {
        /// Labels of the offending block
        labels: Vec<String>,
        /// Kind of the body actually supplied
        found: String,
    },

    /// Block has no header labels
    #[error("block has no labels")]
    MissingLabels,

    /// Formatter failure
    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Errors while decoding an inventory export
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Malformed JSON; `line` is 1-based
    #[error("invalid asset JSON at line {line}: {source}")]
    Json {
        /// Line of the failure
        line: usize,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    /// Create JSON error at line
    pub fn json(line: usize, source: serde_json::Error) -> Self {
        Self::Json { line, source }
    }

    /// Line of the failure
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Json { line, .. } => *line,
        }
    }
}

/// Errors while loading schema documents
#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    /// Malformed YAML
    #[error("invalid schema YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Inconsistent declarations
    #[error(transparent)]
    Invalid(#[from] SchemaError),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl SchemaLoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_display() {
        let err = NormalizeError::type_mismatch(FieldPath::single("name"), "string", "list");
        assert_eq!(
            err.to_string(),
            "type mismatch at name: expected string, found list"
        );
        assert_eq!(err.path().to_string(), "name");
    }

    #[test]
    fn missing_required_display() {
        let err = NormalizeError::MissingRequired {
            path: FieldPath::single("project_id"),
        };
        assert_eq!(err.to_string(), "project_id is required");
    }

    #[test]
    fn serialization_type_display() {
        let err = RenderError::SerializationType {
            labels: vec!["google_project".into(), "p".into()],
            found: "list".into(),
        };
        assert!(err.to_string().contains("list body"));
    }
}
