//! `google_compute_backend_service`

use cai2hcl_model::{AssetRecord, OutputBlock};

use super::flatten::{flatten, user_labels};
use super::{required_str, TransformContext};
use crate::error::TransformError;

/// Block kind and transform id
pub const KIND: &str = "google_compute_backend_service";

/// Asset type of backend service records
pub const ASSET: &str = "compute.googleapis.com/BackendService";

const RENAMES: &[(&str, &str)] = &[
    ("backends", "backend"),
    ("id", "generated_id"),
    ("enableCDN", "enable_cdn"),
];

/// Convert backend service records, one block each
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
        match user_labels(record.property("labels")) {
            Some(labels) => data.insert("labels".into(), labels),
            None => data.remove("labels"),
        };
        let body = ctx.normalize(record, KIND, &data)?;
        blocks.push(ctx.block(record, KIND, name, body)?);
    }
    Ok(blocks)
}
