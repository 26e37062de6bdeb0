//! Container cluster and node pool
//!
//! Declared so their records are reported rather than silently dropped.

use cai2hcl_model::{AssetRecord, OutputBlock};

use super::TransformContext;
use crate::error::TransformError;

/// Cluster block kind and transform id
pub const CLUSTER_KIND: &str = "google_container_cluster";

/// Node pool block kind and transform id
pub const NODE_POOL_KIND: &str = "google_container_node_pool";

/// Asset type of cluster records
pub const CLUSTER_ASSET: &str = "container.googleapis.com/Cluster";

/// Asset type of node pool records
pub const NODE_POOL_ASSET: &str = "container.googleapis.com/NodePool";

/// Not implemented
///
/// # Errors
///
/// Always returns [`TransformError::NotImplemented`].
pub fn convert_cluster(
    ctx: &TransformContext<'_>,
    _records: &[&AssetRecord],
) -> Result<Vec<OutputBlock>, TransformError> {
    Err(TransformError::not_implemented(ctx.transform_id()))
}

/// Not implemented
///
/// # Errors
///
/// Always returns [`TransformError::NotImplemented`].
pub fn convert_node_pool(
    ctx: &TransformContext<'_>,
    _records: &[&AssetRecord],
) -> Result<Vec<OutputBlock>, TransformError> {
    Err(TransformError::not_implemented(ctx.transform_id()))
}
