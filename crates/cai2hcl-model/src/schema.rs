//! Resource schemas
//!
//! A [`ResourceSchema`] declares the legal attributes of one resource kind
//! and how they nest. Schemas are read-only after construction and shared
//! behind `Arc` by [`SchemaSet`].

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// String scalar
    String,
    /// Boolean scalar
    Bool,
    /// Integer number
    Int,
    /// Floating-point number
    Float,
    /// Ordered list of scalars or nested blocks
    List,
    /// Unordered, deduplicated collection of scalars or nested blocks
    Set,
    /// Free-form string-keyed map
    Map,
    /// Single nested block
    Object,
}

impl FieldKind {
    /// Whether the kind holds a single scalar value
    #[inline]
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::String | Self::Bool | Self::Int | Self::Float)
    }

    /// Whether the kind is a list or set
    #[inline]
    #[must_use]
    pub fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set)
    }

    /// Lowercase name as used in schema documents
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element kind of scalar collections and maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElemKind {
    /// String elements
    String,
    /// Boolean elements
    Bool,
    /// Integer elements
    Int,
    /// Floating-point elements
    Float,
}

impl From<ElemKind> for FieldKind {
    fn from(elem: ElemKind) -> Self {
        match elem {
            ElemKind::String => Self::String,
            ElemKind::Bool => Self::Bool,
            ElemKind::Int => Self::Int,
            ElemKind::Float => Self::Float,
        }
    }
}

/// Declaration of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field kind
    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Element kind for scalar lists, sets and maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<ElemKind>,

    /// Nested schema for objects and lists/sets of blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Box<ResourceSchema>>,

    /// Must be present (non-null) in strict mode
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl FieldSchema {
    fn scalar(kind: FieldKind) -> Self {
        Self {
            kind,
            elem: None,
            block: None,
            required: false,
        }
    }

    /// String scalar field
    #[must_use]
    pub fn string() -> Self {
        Self::scalar(FieldKind::String)
    }

    /// Boolean scalar field
    #[must_use]
    pub fn bool() -> Self {
        Self::scalar(FieldKind::Bool)
    }

    /// Integer field
    #[must_use]
    pub fn int() -> Self {
        Self::scalar(FieldKind::Int)
    }

    /// Float field
    #[must_use]
    pub fn float() -> Self {
        Self::scalar(FieldKind::Float)
    }

    /// Scalar field of an element kind
    #[must_use]
    pub fn from_elem(elem: ElemKind) -> Self {
        Self::scalar(elem.into())
    }

    /// Ordered list of scalars
    #[must_use]
    pub fn list(elem: ElemKind) -> Self {
        Self {
            elem: Some(elem),
            ..Self::scalar(FieldKind::List)
        }
    }

    /// Set of scalars
    #[must_use]
    pub fn set(elem: ElemKind) -> Self {
        Self {
            elem: Some(elem),
            ..Self::scalar(FieldKind::Set)
        }
    }

    /// Free-form map with scalar values
    #[must_use]
    pub fn map(elem: ElemKind) -> Self {
        Self {
            elem: Some(elem),
            ..Self::scalar(FieldKind::Map)
        }
    }

    /// Single nested block
    #[must_use]
    pub fn object(schema: ResourceSchema) -> Self {
        Self {
            block: Some(Box::new(schema)),
            ..Self::scalar(FieldKind::Object)
        }
    }

    /// Repeated nested blocks, order significant
    #[must_use]
    pub fn block_list(schema: ResourceSchema) -> Self {
        Self {
            block: Some(Box::new(schema)),
            ..Self::scalar(FieldKind::List)
        }
    }

    /// Repeated nested blocks, order insignificant
    #[must_use]
    pub fn block_set(schema: ResourceSchema) -> Self {
        Self {
            block: Some(Box::new(schema)),
            ..Self::scalar(FieldKind::Set)
        }
    }

    /// Mark field as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Nested schema, if any
    #[inline]
    #[must_use]
    pub fn nested(&self) -> Option<&ResourceSchema> {
        self.block.as_deref()
    }

    /// Human-readable shape for diagnostics, e.g. `list(string)`
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.kind, self.elem, self.block.is_some()) {
            (kind, Some(elem), _) => format!("{kind}({})", FieldKind::from(elem)),
            (FieldKind::Object, _, _) => "object".to_string(),
            (kind, None, true) => format!("{kind}(object)"),
            (kind, None, false) => kind.to_string(),
        }
    }

    fn check(&self, path: &FieldPath) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidField {
            path: path.clone(),
            reason: reason.to_string(),
        };

        match self.kind {
            kind if kind.is_scalar() => {
                if self.elem.is_some() || self.block.is_some() {
                    return Err(invalid("scalar field cannot declare elem or block"));
                }
            }
            FieldKind::Map => {
                if self.block.is_some() {
                    return Err(invalid("map field cannot declare a nested block"));
                }
            }
            FieldKind::Object => {
                if self.elem.is_some() {
                    return Err(invalid("object field cannot declare elem"));
                }
                if self.block.is_none() {
                    return Err(invalid("object field requires a nested block"));
                }
            }
            _ => match (&self.elem, &self.block) {
                (Some(_), Some(_)) => {
                    return Err(invalid("collection declares both elem and block"));
                }
                (None, None) => {
                    return Err(invalid("collection requires elem or block"));
                }
                _ => {}
            },
        }

        if let Some(nested) = self.nested() {
            nested.check_at(path)?;
        }
        Ok(())
    }
}

/// Declared fields of one resource kind, in declaration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Field name → declaration
    #[serde(default)]
    pub fields: IndexMap<String, FieldSchema>,
}

impl ResourceSchema {
    /// Empty schema
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    /// Look up a field declaration
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Whether the schema declares `name`
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Declared field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of declared fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Verify declarations are internally consistent
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] naming the first inconsistent
    /// field.
    pub fn check(&self) -> Result<(), SchemaError> {
        self.check_at(&FieldPath::root())
    }

    fn check_at(&self, base: &FieldPath) -> Result<(), SchemaError> {
        self.fields
            .iter()
            .try_for_each(|(name, field)| field.check(&base.child(name.as_str())))
    }
}

/// Errors in schema declarations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A field declaration is inconsistent
    #[error("invalid schema field {path}: {reason}")]
    InvalidField {
        /// Path to the offending field
        path: FieldPath,
        /// What is wrong with it
        reason: String,
    },

    /// A resource kind has no schema
    #[error("no schema registered for kind: {0}")]
    UnknownKind(String),
}

/// Schema lookup by resource kind
pub trait SchemaProvider: Send + Sync {
    /// Schema for `kind`, if known
    fn schema(&self, kind: &str) -> Option<Arc<ResourceSchema>>;
}

/// Collection of schemas keyed by resource kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSet {
    schemas: BTreeMap<String, Arc<ResourceSchema>>,
}

impl SchemaSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the schema for `kind`
    pub fn insert(&mut self, kind: impl Into<String>, schema: ResourceSchema) {
        self.schemas.insert(kind.into(), Arc::new(schema));
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, schema: ResourceSchema) -> Self {
        self.insert(kind, schema);
        self
    }

    /// Overlay `other` on top of this set; `other` wins per kind
    pub fn overlay(&mut self, other: SchemaSet) {
        self.schemas.extend(other.schemas);
    }

    /// Borrow a schema
    #[inline]
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&Arc<ResourceSchema>> {
        self.schemas.get(kind)
    }

    /// Known kinds in sorted order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Number of schemas
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Check every schema in the set
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`]; its path starts with the kind.
    pub fn check(&self) -> Result<(), SchemaError> {
        for (kind, schema) in &self.schemas {
            schema.check_at(&FieldPath::single(kind.as_str()))?;
        }
        Ok(())
    }

    /// Borrow the raw map (for serialization)
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, Arc<ResourceSchema>> {
        &self.schemas
    }
}

impl SchemaProvider for SchemaSet {
    fn schema(&self, kind: &str) -> Option<Arc<ResourceSchema>> {
        self.schemas.get(kind).cloned()
    }
}

impl<K: Into<String>> FromIterator<(K, ResourceSchema)> for SchemaSet {
    fn from_iter<I: IntoIterator<Item = (K, ResourceSchema)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (kind, schema) in iter {
            set.insert(kind, schema);
        }
        set
    }
}

impl From<BTreeMap<String, ResourceSchema>> for SchemaSet {
    fn from(map: BTreeMap<String, ResourceSchema>) -> Self {
        map.into_iter().collect()
    }
}
