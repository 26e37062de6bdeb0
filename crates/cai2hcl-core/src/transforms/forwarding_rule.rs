//! `google_compute_forwarding_rule`

use cai2hcl_model::{canonical_number, links, AssetRecord, JsonValue, OutputBlock};

use super::flatten::{flatten, map_str, user_labels};
use super::{required_str, TransformContext};
use crate::error::TransformError;

/// Block kind and transform id
pub const KIND: &str = "google_compute_forwarding_rule";

/// Asset type of forwarding rule records
pub const ASSET: &str = "compute.googleapis.com/ForwardingRule";

/// Convert forwarding rule records, one block each
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] for a rule without `name`,
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
        for key in ["backend_service", "network", "subnetwork"] {
            map_str(&mut data, key, links::self_link_to_v1);
        }
        map_str(&mut data, "region", |r| links::resource_name_from_self_link(r).to_string());
        if let Some(JsonValue::Array(ports)) = data.get_mut("ports") {
            ports.sort_by_cached_key(port_key);
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

/// Sort key matching the string the port coerces to
fn port_key(port: &JsonValue) -> String {
    match port {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => canonical_number(n).to_string(),
        other => other.to_string(),
    }
}
