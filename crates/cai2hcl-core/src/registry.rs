//! Conversion registry and dispatcher
//!
//! [`ConversionRegistry`] maps asset types to transforms. It is built once
//! (see [`build_registry`]) and only read afterwards, so one registry can be
//! shared by concurrent conversions.

use std::collections::BTreeMap;
use std::fmt;

use cai2hcl_model::{AssetRecord, OutputBlock};
use tracing::trace;

use crate::error::TransformError;
use crate::transforms::iam::TargetFn;
use crate::transforms::{
    backend_service, compute_instance, container, forwarding_rule, project, region_backend_service,
    region_health_check, TransformContext,
};

/// Signature shared by all per-resource transforms
pub type TransformFn =
    fn(&TransformContext<'_>, &[&AssetRecord]) -> Result<Vec<OutputBlock>, TransformError>;

/// One registered transform
#[derive(Clone, Copy)]
pub struct RegisteredTransform {
    id: &'static str,
    run: TransformFn,
    policy_target: Option<TargetFn>,
}

impl RegisteredTransform {
    /// Transform without policy support
    #[must_use]
    pub fn new(id: &'static str, run: TransformFn) -> Self {
        Self {
            id,
            run,
            policy_target: None,
        }
    }

    /// Emit policy blocks for records carrying a policy
    #[must_use]
    pub fn with_policy_target(mut self, target: TargetFn) -> Self {
        self.policy_target = Some(target);
        self
    }

    /// Transform id, also the resource block kind
    #[inline]
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Policy identity function, if policies are emitted
    #[inline]
    #[must_use]
    pub fn policy_target(&self) -> Option<TargetFn> {
        self.policy_target
    }

    /// Run over one group
    ///
    /// # Errors
    ///
    /// Whatever the transform reports.
    pub fn run(
        &self,
        ctx: &TransformContext<'_>,
        records: &[&AssetRecord],
    ) -> Result<Vec<OutputBlock>, TransformError> {
        (self.run)(ctx, records)
    }
}

impl fmt::Debug for RegisteredTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTransform")
            .field("id", &self.id)
            .field("policies", &self.policy_target.is_some())
            .finish()
    }
}

/// Asset type → transform dispatch table
#[derive(Debug, Default, Clone)]
pub struct ConversionRegistry {
    dispatch: BTreeMap<String, &'static str>,
    transforms: BTreeMap<&'static str, RegisteredTransform>,
}

impl ConversionRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `asset_type` to `transform`
    ///
    /// Several asset types may share one transform; registering an asset
    /// type twice keeps the later transform.
    pub fn register(&mut self, asset_type: impl Into<String>, transform: RegisteredTransform) {
        self.dispatch.insert(asset_type.into(), transform.id);
        self.transforms.insert(transform.id, transform);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, asset_type: impl Into<String>, transform: RegisteredTransform) -> Self {
        self.register(asset_type, transform);
        self
    }

    /// Transform id an asset type dispatches to
    #[must_use]
    pub fn transform_id_for(&self, asset_type: &str) -> Option<&'static str> {
        self.dispatch.get(asset_type).copied()
    }

    /// Transform by id
    #[must_use]
    pub fn get(&self, transform_id: &str) -> Option<&RegisteredTransform> {
        self.transforms.get(transform_id)
    }

    /// Check if an asset type is routed
    #[inline]
    #[must_use]
    pub fn contains(&self, asset_type: &str) -> bool {
        self.dispatch.contains_key(asset_type)
    }

    /// Get number of routed asset types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dispatch.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dispatch.is_empty()
    }

    /// Registered transform ids, sorted
    pub fn transform_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transforms.keys().copied()
    }

    /// Partition records by destination transform
    ///
    /// Groups are keyed and ordered by transform id; records keep their input
    /// order within a group. Records of unrouted types are dropped; every
    /// routed record reaches its transform, even with an empty property bag.
    #[must_use]
    pub fn dispatch<'r>(&self, records: &'r [AssetRecord]) -> BTreeMap<&'static str, Vec<&'r AssetRecord>> {
        let mut groups: BTreeMap<&'static str, Vec<&'r AssetRecord>> = BTreeMap::new();
        for record in records {
            let Some(id) = self.transform_id_for(record.asset_type()) else {
                trace!(asset_type = record.asset_type(), name = record.name(), "dropping unrouted asset");
                continue;
            };
            groups.entry(id).or_default().push(record);
        }
        groups
    }
}

/// Registry with the built-in transforms
#[must_use]
pub fn build_registry() -> ConversionRegistry {
    let project = RegisteredTransform::new(project::KIND, project::convert)
        .with_policy_target(project::policy_target);
    let instance = RegisteredTransform::new(compute_instance::KIND, compute_instance::convert)
        .with_policy_target(compute_instance::policy_target);

    ConversionRegistry::new()
        .with(project::PROJECT_ASSET, project)
        .with(project::BILLING_ASSET, project)
        .with(compute_instance::ASSET, instance)
        .with(
            forwarding_rule::ASSET,
            RegisteredTransform::new(forwarding_rule::KIND, forwarding_rule::convert),
        )
        .with(
            backend_service::ASSET,
            RegisteredTransform::new(backend_service::KIND, backend_service::convert),
        )
        .with(
            region_backend_service::ASSET,
            RegisteredTransform::new(region_backend_service::KIND, region_backend_service::convert),
        )
        .with(
            region_health_check::ASSET,
            RegisteredTransform::new(region_health_check::KIND, region_health_check::convert),
        )
        .with(
            container::CLUSTER_ASSET,
            RegisteredTransform::new(container::CLUSTER_KIND, container::convert_cluster),
        )
        .with(
            container::NODE_POOL_ASSET,
            RegisteredTransform::new(container::NODE_POOL_KIND, container::convert_node_pool),
        )
}
