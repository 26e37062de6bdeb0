//! Error types for the conversion engine
//!
//! - [`TransformError`]: one group's transform failed; collected, never fatal
//! - [`ConversionError`]: the collected, serializable form of a failure
//! - [`ConvertError`]: fatal failures that abort a whole run

use std::fmt;

use cai2hcl_hcl::{NormalizeError, RenderError};
use serde::{Deserialize, Serialize};

/// Failure inside a per-resource transform
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// Transform declared but not implemented
    #[error("transform {transform_id} is not implemented")]
    NotImplemented {
        /// Declared transform
        transform_id: String,
    },

    /// A field needed for the block label is absent
    #[error("{asset_name}: missing identity field {field}")]
    MissingIdentity {
        /// Asset lacking the field
        asset_name: String,
        /// Name of the missing field
        field: String,
    },

    /// Value shape does not match the schema (strict mode)
    #[error("{asset_name}: {source}")]
    TypeMismatch {
        /// Asset whose data is misshapen
        asset_name: String,
        /// Conformance failure
        #[source]
        source: NormalizeError,
    },

    /// No schema registered for a block kind the transform needs
    #[error("no schema for resource kind {kind}")]
    MissingSchema {
        /// Resource kind
        kind: String,
    },
}

impl TransformError {
    /// Create not-implemented error
    pub fn not_implemented(transform_id: impl Into<String>) -> Self {
        Self::NotImplemented {
            transform_id: transform_id.into(),
        }
    }

    /// Create missing-identity error
    pub fn missing_identity(asset_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingIdentity {
            asset_name: asset_name.into(),
            field: field.into(),
        }
    }

    /// Create type-mismatch error
    pub fn type_mismatch(asset_name: impl Into<String>, source: NormalizeError) -> Self {
        Self::TypeMismatch {
            asset_name: asset_name.into(),
            source,
        }
    }

    /// Create missing-schema error
    pub fn missing_schema(kind: impl Into<String>) -> Self {
        Self::MissingSchema { kind: kind.into() }
    }

    /// Asset the failure is attributed to, if any
    #[must_use]
    pub fn asset_name(&self) -> Option<&str> {
        match self {
            Self::MissingIdentity { asset_name, .. } | Self::TypeMismatch { asset_name, .. } => {
                Some(asset_name)
            }
            Self::NotImplemented { .. } | Self::MissingSchema { .. } => None,
        }
    }

    /// Reported error kind
    #[must_use]
    pub fn kind(&self) -> ConversionErrorKind {
        match self {
            Self::NotImplemented { .. } => ConversionErrorKind::TransformNotImplemented,
            Self::MissingIdentity { .. } => ConversionErrorKind::MissingIdentityField,
            Self::TypeMismatch { .. } => ConversionErrorKind::TypeMismatch,
            Self::MissingSchema { .. } => ConversionErrorKind::MissingSchema,
        }
    }
}

/// Category of a collected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionErrorKind {
    /// Transform declared but not implemented
    TransformNotImplemented,
    /// Block label could not be computed
    MissingIdentityField,
    /// Value shape does not match the schema
    TypeMismatch,
    /// No schema for a needed resource kind
    MissingSchema,
}

impl ConversionErrorKind {
    /// Stable name used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransformNotImplemented => "transform_not_implemented",
            Self::MissingIdentityField => "missing_identity_field",
            Self::TypeMismatch => "type_mismatch",
            Self::MissingSchema => "missing_schema",
        }
    }
}

impl fmt::Display for ConversionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collected failure of a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionError {
    /// Transform whose group failed
    pub transform_id: String,
    /// Asset the failure is attributed to, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,
    /// Failure category
    pub kind: ConversionErrorKind,
    /// Human-readable description
    pub message: String,
}

impl ConversionError {
    /// Collected form of a transform failure
    #[must_use]
    pub fn from_transform(transform_id: &str, error: &TransformError) -> Self {
        Self {
            transform_id: transform_id.to_string(),
            asset_name: error.asset_name().map(str::to_string),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.transform_id, self.kind, self.message)
    }
}

/// Fatal conversion failure
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A transform produced a block the serializer cannot render
    #[error("serialization type error: {0}")]
    SerializationType(#[from] RenderError),

    /// Worker pool could not be started
    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
