//! Per-resource transforms
//!
//! Each transform receives every record dispatched to it (so companion
//! records such as billing info are visible together) and returns the blocks
//! for the whole group. Transforms never mutate their input.

use std::sync::Arc;

use cai2hcl_hcl::{validate, Normalizer};
use cai2hcl_model::{
    AssetRecord, JsonMap, JsonValue, OutputBlock, ResourceSchema, SchemaProvider, Value,
};
use tracing::trace;

use crate::error::TransformError;

pub mod backend_service;
pub mod compute_instance;
pub mod container;
pub mod flatten;
pub mod forwarding_rule;
pub mod iam;
pub mod project;
pub mod region_backend_service;
pub mod region_health_check;

/// Shared inputs of one transform invocation
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    transform_id: &'a str,
    schemas: &'a dyn SchemaProvider,
    normalizer: Normalizer,
}

impl std::fmt::Debug for TransformContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("transform_id", &self.transform_id)
            .field("mode", &self.normalizer.mode())
            .finish_non_exhaustive()
    }
}

impl<'a> TransformContext<'a> {
    /// Context for `transform_id`
    #[must_use]
    pub fn new(transform_id: &'a str, schemas: &'a dyn SchemaProvider, normalizer: Normalizer) -> Self {
        Self {
            transform_id,
            schemas,
            normalizer,
        }
    }

    /// Transform being run
    #[inline]
    #[must_use]
    pub fn transform_id(&self) -> &str {
        self.transform_id
    }

    /// Whether strict conformance checks are on
    #[inline]
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.normalizer.mode() == cai2hcl_hcl::Mode::Strict
    }

    /// Schema for a block kind
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingSchema`] if the provider has none.
    pub fn schema(&self, kind: &str) -> Result<Arc<ResourceSchema>, TransformError> {
        self.schemas
            .schema(kind)
            .ok_or_else(|| TransformError::missing_schema(kind))
    }

    /// Normalize config-shaped data of `record` against the schema of `kind`
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingSchema`], or in strict mode
    /// [`TransformError::TypeMismatch`].
    pub fn normalize(
        &self,
        record: &AssetRecord,
        kind: &str,
        data: &JsonMap<String, JsonValue>,
    ) -> Result<Value, TransformError> {
        let schema = self.schema(kind)?;
        self.normalizer
            .normalize(data, &schema)
            .map_err(|err| TransformError::type_mismatch(record.name(), err))
    }

    /// Finish a block for `record`, validating the body in strict mode
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::TypeMismatch`] if a strict check fails.
    pub fn block(
        &self,
        record: &AssetRecord,
        kind: &str,
        id: &str,
        body: Value,
    ) -> Result<OutputBlock, TransformError> {
        if self.is_strict() {
            match self.schemas.schema(kind) {
                Some(schema) => validate(&body, &schema)
                    .map_err(|err| TransformError::type_mismatch(record.name(), err))?,
                None => trace!(kind, "no schema; skipping conformance check"),
            }
        }
        Ok(OutputBlock::resource(kind, id, body))
    }
}

/// String property that must be present and non-empty
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] naming `key`.
pub fn required_str<'r>(record: &'r AssetRecord, key: &str) -> Result<&'r str, TransformError> {
    record
        .property_str(key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TransformError::missing_identity(record.name(), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cai2hcl_model::{FieldSchema, SchemaSet};
    use serde_json::json;

    fn schemas() -> SchemaSet {
        SchemaSet::new().with(
            "simple",
            ResourceSchema::new().field("name", FieldSchema::string().required()),
        )
    }

    #[test]
    fn normalize_uses_kind_schema() {
        let schemas = schemas();
        let ctx = TransformContext::new("simple", &schemas, Normalizer::best_effort());
        let record = AssetRecord::new("//x/a", "simple");
        let data = json!({"name": "a", "unknownField": "x"});
        let body = ctx.normalize(&record, "simple", data.as_object().unwrap()).unwrap();
        assert_eq!(body, Value::object([("name", Value::from("a"))]));
    }

    #[test]
    fn missing_schema() {
        let schemas = schemas();
        let ctx = TransformContext::new("other", &schemas, Normalizer::best_effort());
        assert_eq!(
            ctx.schema("other").unwrap_err(),
            TransformError::missing_schema("other")
        );
    }

    #[test]
    fn strict_block_validates_body() {
        let schemas = schemas();
        let ctx = TransformContext::new("simple", &schemas, Normalizer::strict());
        let record = AssetRecord::new("//x/a", "simple");
        let err = ctx
            .block(&record, "simple", "a", Value::object([("name", Value::Null)]))
            .unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { .. }));

        let lenient = TransformContext::new("simple", &schemas, Normalizer::best_effort());
        assert!(lenient
            .block(&record, "simple", "a", Value::object([("name", Value::Null)]))
            .is_ok());
    }

    #[test]
    fn required_str_rejects_empty() {
        let record = AssetRecord::new("//x/a", "simple").with_data(json!({"name": ""}));
        assert!(matches!(
            required_str(&record, "name"),
            Err(TransformError::MissingIdentity { .. })
        ));
    }
}
