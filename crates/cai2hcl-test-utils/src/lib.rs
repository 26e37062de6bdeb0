//! Testing utilities for the cai2hcl workspace
//!
//! Shared asset, policy and schema fixtures.

#![allow(missing_docs)]

use cai2hcl_model::{AssetRecord, FieldSchema, PolicyView, ResourceSchema, RoleBinding, SchemaSet};
use serde_json::{json, Value as JsonValue};

pub const PROJECT_ASSET: &str = "cloudresourcemanager.googleapis.com/Project";
pub const BILLING_ASSET: &str = "cloudbilling.googleapis.com/ProjectBillingInfo";
pub const INSTANCE_ASSET: &str = "compute.googleapis.com/Instance";
pub const FORWARDING_RULE_ASSET: &str = "compute.googleapis.com/ForwardingRule";
pub const BACKEND_SERVICE_ASSET: &str = "compute.googleapis.com/BackendService";
pub const CLUSTER_ASSET: &str = "container.googleapis.com/Cluster";

pub fn record(name: &str, asset_type: &str, data: JsonValue) -> AssetRecord {
    AssetRecord::new(name, asset_type).with_data(data)
}

pub fn project_record(project_id: &str) -> AssetRecord {
    record(
        &format!("//cloudresourcemanager.googleapis.com/projects/{project_id}"),
        PROJECT_ASSET,
        json!({
            "projectId": project_id,
            "name": project_id,
            "lifecycleState": "ACTIVE",
        }),
    )
    .with_parent("//cloudresourcemanager.googleapis.com/organizations/100")
}

pub fn billing_record(project_id: &str, account: &str) -> AssetRecord {
    record(
        &format!("//cloudbilling.googleapis.com/projects/{project_id}/billingInfo"),
        BILLING_ASSET,
        json!({
            "name": format!("projects/{project_id}/billingInfo"),
            "projectId": project_id,
            "billingAccountName": format!("billingAccounts/{account}"),
            "billingEnabled": true,
        }),
    )
}

pub fn instance_record(project: &str, zone: &str, name: &str) -> AssetRecord {
    record(
        &format!("//compute.googleapis.com/projects/{project}/zones/{zone}/instances/{name}"),
        INSTANCE_ASSET,
        json!({
            "name": name,
            "machineType": format!("https://www.googleapis.com/compute/v1/projects/{project}/zones/{zone}/machineTypes/e2-small"),
            "zone": format!("https://www.googleapis.com/compute/v1/projects/{project}/zones/{zone}"),
            "networkInterfaces": [{
                "network": format!("https://www.googleapis.com/compute/v1/projects/{project}/global/networks/default"),
            }],
        }),
    )
}

pub fn cluster_record(project: &str, name: &str) -> AssetRecord {
    record(
        &format!("//container.googleapis.com/projects/{project}/locations/us-central1/clusters/{name}"),
        CLUSTER_ASSET,
        json!({"name": name}),
    )
}

pub fn binding(role: &str, members: &[&str]) -> RoleBinding {
    RoleBinding::new(role, members.iter().copied())
}

pub fn policy(bindings: &[(&str, &[&str])]) -> PolicyView {
    PolicyView::new(bindings.iter().map(|(role, members)| binding(role, members)).collect())
}

/// Schema set with one kind declaring only a required `name`
pub fn simple_schemas(kind: &str) -> SchemaSet {
    SchemaSet::new().with(kind, ResourceSchema::new().field("name", FieldSchema::string().required()))
}
