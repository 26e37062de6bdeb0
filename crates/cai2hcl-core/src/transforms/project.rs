//! `google_project`
//!
//! Project records are combined with their `ProjectBillingInfo` companions,
//! matched on `projectId`.

use std::collections::BTreeMap;

use cai2hcl_model::{links, AssetRecord, Fields, JsonMap, JsonValue, OutputBlock, Value};

use super::flatten::user_labels;
use super::{required_str, TransformContext};
use crate::error::TransformError;

/// Block kind and transform id
pub const KIND: &str = "google_project";

/// Asset type of project records
pub const PROJECT_ASSET: &str = "cloudresourcemanager.googleapis.com/Project";

/// Asset type of billing companion records
pub const BILLING_ASSET: &str = "cloudbilling.googleapis.com/ProjectBillingInfo";

const BILLING_PREFIX: &str = "billingAccounts/";

/// Convert project records, folding in billing companions
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] for a project without
/// `projectId`, or a normalization failure in strict mode.
pub fn convert(
    ctx: &TransformContext<'_>,
    records: &[&AssetRecord],
) -> Result<Vec<OutputBlock>, TransformError> {
    let billing = billing_accounts(records);
    let mut blocks = Vec::new();
    for record in records.iter().filter(|r| r.asset_type() == PROJECT_ASSET) {
        let project_id = required_str(record, "projectId")?;
        let mut data = JsonMap::new();
        copy(record, "name", &mut data);
        data.insert("project_id".into(), project_id.into());
        if let Some(labels) = user_labels(record.property("labels")) {
            data.insert("labels".into(), labels);
        }
        if let Some((field, id)) = parent_field(record) {
            data.insert(field.into(), id.into());
        }
        if let Some(account) = billing.get(project_id) {
            data.insert("billing_account".into(), (*account).into());
        }
        let body = ctx.normalize(record, KIND, &data)?;
        blocks.push(ctx.block(record, KIND, project_id, body)?);
    }
    Ok(blocks)
}

/// Policy identity of a project record
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] without `projectId`.
pub fn policy_target(record: &AssetRecord) -> Result<super::iam::PolicyTarget, TransformError> {
    let project_id = required_str(record, "projectId")?;
    let identity: Fields = [("project".to_string(), Value::from(project_id))]
        .into_iter()
        .collect();
    Ok(super::iam::PolicyTarget::new(project_id, identity))
}

fn billing_accounts<'r>(records: &[&'r AssetRecord]) -> BTreeMap<&'r str, &'r str> {
    records
        .iter()
        .filter(|r| r.asset_type() == BILLING_ASSET)
        .filter_map(|r| {
            let project = r.property_str("projectId")?;
            let account = r.property_str("billingAccountName")?;
            let account = account.strip_prefix(BILLING_PREFIX).unwrap_or(account);
            (!account.is_empty()).then_some((project, account))
        })
        .collect()
}

fn parent_field(record: &AssetRecord) -> Option<(&'static str, &str)> {
    let parent = record.parent();
    if let Some(found) = parent_in(parent) {
        return Some(found);
    }
    record.ancestry().iter().find_map(|ancestor| parent_in(ancestor))
}

fn parent_in(path: &str) -> Option<(&'static str, &str)> {
    links::parse_field_value(path, "folders")
        .map(|id| ("folder_id", id))
        .or_else(|| links::parse_field_value(path, "organizations").map(|id| ("org_id", id)))
}

fn copy(record: &AssetRecord, key: &str, data: &mut JsonMap<String, JsonValue>) {
    if let Some(value) = record.property(key) {
        data.insert(key.to_string(), value.clone());
    }
}
