//! Built-in resource schemas
//!
//! Embedded YAML documents covering every built-in transform, including the
//! policy block kinds of resources that carry access policies.

use cai2hcl_hcl::{schema_set_from_yaml, SchemaLoadError};
use cai2hcl_model::SchemaSet;

const DOCUMENTS: &[(&str, &str)] = &[
    ("project.yaml", include_str!("../schemas/project.yaml")),
    ("compute_instance.yaml", include_str!("../schemas/compute_instance.yaml")),
    ("load_balancing.yaml", include_str!("../schemas/load_balancing.yaml")),
];

/// Parse the embedded documents into one set
///
/// # Errors
///
/// Returns the first document's load error.
pub fn try_builtin_schemas() -> Result<SchemaSet, SchemaLoadError> {
    let mut set = SchemaSet::new();
    for (name, text) in DOCUMENTS {
        tracing::trace!("Loading built-in schema document {}", name);
        set.overlay(schema_set_from_yaml(text)?);
    }
    Ok(set)
}

/// Built-in schemas
///
/// The embedded documents are covered by tests; a document that fails to
/// load is logged and contributes no kinds.
#[must_use]
pub fn builtin_schemas() -> SchemaSet {
    let mut set = SchemaSet::new();
    for (name, text) in DOCUMENTS {
        match schema_set_from_yaml(text) {
            Ok(doc) => set.overlay(doc),
            Err(err) => tracing::error!("Built-in schema document {} is invalid: {}", name, err),
        }
    }
    set
}
