//! `google_compute_region_health_check`

use cai2hcl_model::{links, AssetRecord, OutputBlock};

use super::flatten::{flatten, map_str};
use super::{required_str, TransformContext};
use crate::error::TransformError;

/// Block kind and transform id
pub const KIND: &str = "google_compute_region_health_check";

/// Asset type of regional health check records
pub const ASSET: &str = "compute.googleapis.com/RegionHealthCheck";

/// Convert regional health check records, one block each
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] for a check without `name`,
/// [`TransformError::MissingSchema`], or a strict-mode mismatch.
pub fn convert(
    ctx: &TransformContext<'_>,
    records: &[&AssetRecord],
) -> Result<Vec<OutputBlock>, TransformError> {
    let schema = ctx.schema(KIND)?;
    let mut blocks = Vec::with_capacity(records.len());
    for record in records {
        let name = required_str(record, "name")?;
        let mut data = flatten(record.properties(), &schema, &[]);
        map_str(&mut data, "region", |r| links::resource_name_from_self_link(r).to_string());
        let body = ctx.normalize(record, KIND, &data)?;
        blocks.push(ctx.block(record, KIND, name, body)?);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::builtin_schemas;
    use cai2hcl_hcl::{render, Normalizer};
    use serde_json::json;

    #[test]
    fn converts_http2_check() {
        let schemas = builtin_schemas();
        let ctx = TransformContext::new(KIND, &schemas, Normalizer::best_effort());
        let record = AssetRecord::new(
            "//compute.googleapis.com/projects/my-proj/regions/us-east1/healthChecks/hc-1",
            ASSET,
        )
        .with_data(json!({
            "name": "hc-1",
            "region": "https://www.googleapis.com/compute/v1/projects/my-proj/regions/us-east1",
            "checkIntervalSec": 5,
            "timeoutSec": 5,
            "type": "HTTP2",
            "http2HealthCheck": {"port": 443, "portSpecification": "USE_FIXED_PORT", "requestPath": "/healthz"}
        }));
        let blocks = convert(&ctx, &[&record]).unwrap();
        let text = render(&blocks).unwrap();
        assert!(text.starts_with("resource \"google_compute_region_health_check\" \"hc-1\" {\n"));
        assert!(text.contains("  region = \"us-east1\"\n"));
        assert!(text.contains("  http2_health_check {\n    port = 443\n"));
        assert!(text.contains("    request_path = \"/healthz\"\n"));
        assert!(!text.contains("type ="));
    }
}
