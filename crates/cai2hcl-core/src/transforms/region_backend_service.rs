//! `google_compute_region_backend_service`

use cai2hcl_model::{links, AssetRecord, JsonValue, OutputBlock};

use super::flatten::{flatten, map_str, user_labels};
use super::{required_str, TransformContext};
use crate::error::TransformError;

/// Block kind and transform id
pub const KIND: &str = "google_compute_region_backend_service";

/// Asset type of regional backend service records
pub const ASSET: &str = "compute.googleapis.com/RegionBackendService";

const RENAMES: &[(&str, &str)] = &[("backends", "backend"), ("enableCDN", "enable_cdn")];

/// Convert regional backend service records, one block each
///
/// `connectionDraining.drainingTimeoutSec` is lifted to the top-level
/// `connection_draining_timeout_sec` attribute.
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] for a service without `name`,
/// [`TransformError::MissingSchema`], or a strict-mode mismatch.
pub fn convert(
    ctx: &TransformContext<'_>,
    records: &[&AssetRecord],
) -> Result<Vec<OutputBlock>, TransformError> {
    let schema = ctx.schema(KIND)?;
    let mut blocks = Vec::with_capacity(records.len());
    for record in records {
        let name = required_str(record, "name")?;
        let mut data = flatten(record.properties(), &schema, RENAMES);
        map_str(&mut data, "network", links::self_link_to_v1);
        map_str(&mut data, "region", |r| links::resource_name_from_self_link(r).to_string());
        if let Some(JsonValue::Array(checks)) = data.get_mut("health_checks") {
            for check in checks.iter_mut() {
                if let JsonValue::String(link) = check {
                    *link = links::self_link_to_v1(link);
                }
            }
        }
        if let Some(timeout) = record
            .property("connectionDraining")
            .and_then(|draining| draining.get("drainingTimeoutSec"))
        {
            data.insert("connection_draining_timeout_sec".into(), timeout.clone());
        }
        match user_labels(record.property("labels")) {
            Some(labels) => data.insert("labels".into(), labels),
            None => data.remove("labels"),
        };
        let body = ctx.normalize(record, KIND, &data)?;
        blocks.push(ctx.block(record, KIND, name, body)?);
    }
    Ok(blocks)
}
