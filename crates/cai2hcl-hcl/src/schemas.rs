//! Schema document loading
//!
//! A schema document maps resource kinds to their declarations:
//!
//! ```yaml
//! google_project:
//!   fields:
//!     project_id: { type: string, required: true }
//!     labels: { type: map, elem: string }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use cai2hcl_model::{ResourceSchema, SchemaSet};

use crate::error::SchemaLoadError;

/// Parse a YAML schema document
///
/// # Errors
///
/// Returns [`SchemaLoadError::Yaml`] on malformed input or
/// [`SchemaLoadError::Invalid`] on inconsistent declarations.
pub fn schema_set_from_yaml(text: &str) -> Result<SchemaSet, SchemaLoadError> {
    let map: BTreeMap<String, ResourceSchema> = serde_yaml::from_str(text)?;
    checked(map)
}

/// Parse a JSON schema document
///
/// # Errors
///
/// Returns [`SchemaLoadError::Json`] on malformed input or
/// [`SchemaLoadError::Invalid`] on inconsistent declarations.
pub fn schema_set_from_json(text: &str) -> Result<SchemaSet, SchemaLoadError> {
    let map: BTreeMap<String, ResourceSchema> = serde_json::from_str(text)?;
    checked(map)
}

/// Load a schema file; `.json` files are JSON, everything else YAML
///
/// # Errors
///
/// Returns [`SchemaLoadError::Io`] if the file cannot be read, otherwise as
/// the format-specific loaders.
pub fn load_schema_file(path: &Path) -> Result<SchemaSet, SchemaLoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaLoadError::io_error(path, e))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        schema_set_from_json(&text)
    } else {
        schema_set_from_yaml(&text)
    }
}

fn checked(map: BTreeMap<String, ResourceSchema>) -> Result<SchemaSet, SchemaLoadError> {
    let set = SchemaSet::from(map);
    set.check()?;
    Ok(set)
}
