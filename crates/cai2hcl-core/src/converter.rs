//! Conversion driver
//!
//! [`Converter::convert`] dispatches a batch, runs every group's transform
//! (inline, or on a bounded worker pool) and joins the results in
//! transform-id order. A failing group is recorded as a [`ConversionError`]
//! and never stops the others.

use std::sync::Arc;

use cai2hcl_hcl::{render, Mode, Normalizer};
use cai2hcl_iam::{AuthoritativeMerge, MergeRegistry, MergeStrategy};
use cai2hcl_model::{AssetRecord, OutputBlock, SchemaProvider};
use rayon::prelude::*;

use crate::error::{ConversionError, ConvertError, TransformError};
use crate::options::ConvertOptions;
use crate::registry::{build_registry, ConversionRegistry, RegisteredTransform};
use crate::schemas::builtin_schemas;
use crate::transforms::iam::{policy_blocks, policy_kind};
use crate::transforms::TransformContext;

/// Result of one conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    /// Blocks produced, grouped by transform id
    pub blocks: Vec<OutputBlock>,
    /// Groups that failed, in transform-id order
    pub errors: Vec<ConversionError>,
}

impl Conversion {
    /// Whether every group converted
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render the blocks as configuration text
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::SerializationType`] if a block cannot be
    /// rendered.
    pub fn render(&self) -> Result<String, ConvertError> {
        Ok(render(&self.blocks)?)
    }
}

/// Converts asset batches into output blocks
#[derive(Clone)]
pub struct Converter {
    registry: Arc<ConversionRegistry>,
    schemas: Arc<dyn SchemaProvider>,
    merges: MergeRegistry,
    options: ConvertOptions,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("registry", &self.registry)
            .field("merges", &self.merges)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Converter over a registry and schema provider
    #[must_use]
    pub fn new(registry: Arc<ConversionRegistry>, schemas: Arc<dyn SchemaProvider>) -> Self {
        Self {
            registry,
            schemas,
            merges: MergeRegistry::with_defaults(),
            options: ConvertOptions::default(),
        }
    }

    /// Converter with the built-in transforms and schemas
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(Arc::new(build_registry()), Arc::new(builtin_schemas()))
    }

    /// With options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// With merge rules for policy blocks
    #[inline]
    #[must_use]
    pub fn with_merges(mut self, merges: MergeRegistry) -> Self {
        self.merges = merges;
        self
    }

    /// Current options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Dispatch table in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ConversionRegistry {
        &self.registry
    }

    /// Convert a batch
    ///
    /// # Errors
    ///
    /// Only fails if the worker pool cannot be started. Transform failures
    /// are collected in [`Conversion::errors`].
    pub fn convert(&self, records: &[AssetRecord]) -> Result<Conversion, ConvertError> {
        let groups: Vec<_> = self.registry.dispatch(records).into_iter().collect();
        tracing::info!(
            "Converting {} records in {} groups",
            records.len(),
            groups.len()
        );

        let outcomes: Vec<(&str, Result<Vec<OutputBlock>, TransformError>)> =
            if self.options.max_workers > 1 && groups.len() > 1 {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.options.max_workers)
                    .build()?;
                pool.install(|| {
                    groups
                        .par_iter()
                        .map(|(id, group)| (*id, self.run_group(id, group)))
                        .collect()
                })
            } else {
                groups
                    .iter()
                    .map(|(id, group)| (*id, self.run_group(id, group)))
                    .collect()
            };

        let mut conversion = Conversion::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(blocks) => conversion.blocks.extend(blocks),
                Err(err) => {
                    tracing::warn!("Transform {} failed: {}", id, err);
                    conversion.errors.push(ConversionError::from_transform(id, &err));
                }
            }
        }
        tracing::info!(
            "Conversion completed: {} blocks, {} errors",
            conversion.blocks.len(),
            conversion.errors.len()
        );
        Ok(conversion)
    }

    /// Convert and render in one step
    ///
    /// # Errors
    ///
    /// See [`convert`](Self::convert) and [`Conversion::render`].
    pub fn convert_to_text(&self, records: &[AssetRecord]) -> Result<(String, Vec<ConversionError>), ConvertError> {
        let conversion = self.convert(records)?;
        let text = conversion.render()?;
        Ok((text, conversion.errors))
    }

    fn run_group(&self, id: &str, group: &[&AssetRecord]) -> Result<Vec<OutputBlock>, TransformError> {
        let Some(transform) = self.registry.get(id) else {
            return Err(TransformError::not_implemented(id));
        };
        tracing::debug!("Running transform {} over {} records", id, group.len());

        let mode = if self.options.strict {
            Mode::Strict
        } else {
            Mode::BestEffort
        };
        let ctx = TransformContext::new(transform.id(), self.schemas.as_ref(), Normalizer::new(mode));
        let mut blocks = transform.run(&ctx, group)?;
        blocks.extend(self.policy_blocks(&ctx, transform, group)?);
        Ok(blocks)
    }

    fn policy_blocks(
        &self,
        ctx: &TransformContext<'_>,
        transform: &RegisteredTransform,
        group: &[&AssetRecord],
    ) -> Result<Vec<OutputBlock>, TransformError> {
        let Some(target) = transform.policy_target() else {
            return Ok(Vec::new());
        };
        let style = self.options.iam_style;
        let kind = policy_kind(transform.id(), style);
        let fallback = AuthoritativeMerge;
        let strategy: &dyn MergeStrategy = match self.merges.resolve(&kind) {
            Ok(rule) => rule.merge.as_ref(),
            Err(err) => {
                tracing::trace!("{}; folding authoritatively", err);
                &fallback
            }
        };
        policy_blocks(ctx, transform.id(), group, target, style, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionErrorKind;
    use crate::options::IamStyle;
    use cai2hcl_model::{PolicyView, RoleBinding};
    use serde_json::json;

    fn project(id: &str) -> AssetRecord {
        AssetRecord::new(format!("//cloudresourcemanager.googleapis.com/projects/{id}"), crate::transforms::project::PROJECT_ASSET)
            .with_data(json!({"projectId": id, "name": id}))
    }

    fn cluster() -> AssetRecord {
        AssetRecord::new(
            "//container.googleapis.com/projects/p/locations/us-central1/clusters/c1",
            "container.googleapis.com/Cluster",
        )
        .with_data(json!({"name": "c1"}))
    }

    #[test]
    fn partial_failure_keeps_other_groups() {
        let records = vec![cluster(), project("p1")];
        let conversion = Converter::builtin().convert(&records).unwrap();
        assert_eq!(conversion.blocks.len(), 1);
        assert_eq!(conversion.errors.len(), 1);
        assert_eq!(conversion.errors[0].transform_id, "google_container_cluster");
        assert_eq!(conversion.errors[0].kind, ConversionErrorKind::TransformNotImplemented);
        assert!(!conversion.is_clean());
    }

    #[test]
    fn policy_blocks_follow_resource_blocks() {
        let record = project("p1").with_policy(PolicyView::new(vec![RoleBinding::new(
            "roles/viewer",
            ["user:a"],
        )]));
        let converter = Converter::builtin()
            .with_options(ConvertOptions::new().with_iam_style(IamStyle::Binding));
        let conversion = converter.convert(&[record]).unwrap();
        let kinds: Vec<_> = conversion.blocks.iter().filter_map(OutputBlock::kind).collect();
        assert_eq!(kinds, vec!["google_project", "google_project_iam_binding"]);
    }

    #[test]
    fn unknown_merge_kind_falls_back() {
        let record = project("p1").with_policy(PolicyView::new(vec![RoleBinding::new(
            "roles/viewer",
            ["user:a"],
        )]));
        let converter = Converter::builtin().with_merges(MergeRegistry::new());
        let conversion = converter.convert(&[record]).unwrap();
        assert_eq!(conversion.blocks.len(), 2);
    }

    #[test]
    fn empty_batch() {
        let conversion = Converter::builtin().convert(&[]).unwrap();
        assert!(conversion.blocks.is_empty());
        assert!(conversion.is_clean());
        assert_eq!(conversion.render().unwrap(), "");
    }
}
