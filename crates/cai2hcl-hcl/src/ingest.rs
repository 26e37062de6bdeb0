//! Inventory ingest
//!
//! Decodes a batch export of asset records, either as one JSON array or as
//! newline-delimited JSON (one asset object per non-blank line).

use cai2hcl_model::{AssetRecord, JsonValue, PolicyView, RoleBinding};
use serde::Deserialize;
use tracing::debug;

use crate::error::IngestError;

/// Wire shape of one exported asset
#[derive(Debug, Clone, Deserialize)]
pub struct CaiAsset {
    /// Full resource name
    pub name: String,
    /// Asset type tag
    #[serde(default)]
    pub asset_type: String,
    /// Ancestry, nearest first
    #[serde(default)]
    pub ancestors: Vec<String>,
    /// Explicit parent, if exported at top level
    #[serde(default)]
    pub parent: Option<String>,
    /// Resource snapshot
    #[serde(default)]
    pub resource: Option<CaiResource>,
    /// Attached access policy
    #[serde(default)]
    pub iam_policy: Option<CaiPolicy>,
}

/// Wire shape of an asset's resource snapshot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaiResource {
    /// API version of `data`
    #[serde(default)]
    pub version: String,
    /// API discovery name
    #[serde(default)]
    pub discovery_name: String,
    /// Parent resource name
    #[serde(default)]
    pub parent: String,
    /// Resource location
    #[serde(default)]
    pub location: String,
    /// Raw API representation
    #[serde(default)]
    pub data: JsonValue,
}

/// Wire shape of an access policy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaiPolicy {
    /// Role bindings
    #[serde(default)]
    pub bindings: Vec<CaiBinding>,
}

/// Wire shape of one role binding
#[derive(Debug, Clone, Deserialize)]
pub struct CaiBinding {
    /// Role name
    pub role: String,
    /// Principals
    #[serde(default)]
    pub members: Vec<String>,
}

impl From<CaiPolicy> for PolicyView {
    fn from(policy: CaiPolicy) -> Self {
        PolicyView::new(
            policy
                .bindings
                .into_iter()
                .map(|b| RoleBinding::new(b.role, b.members))
                .collect(),
        )
    }
}

impl From<CaiAsset> for AssetRecord {
    fn from(asset: CaiAsset) -> Self {
        let resource = asset.resource.unwrap_or_default();
        let parent = asset
            .parent
            .filter(|p| !p.is_empty())
            .unwrap_or(resource.parent);

        let mut record = AssetRecord::new(asset.name, asset.asset_type)
            .with_parent(parent)
            .with_data(resource.data)
            .with_ancestry(asset.ancestors);
        if let Some(policy) = asset.iam_policy {
            record = record.with_policy(policy.into());
        }
        record
    }
}

/// Decode an inventory export into asset records
///
/// A leading `[` selects JSON-array input; anything else is read as
/// newline-delimited JSON. Empty input yields no records.
///
/// # Errors
///
/// Returns [`IngestError::Json`] with the 1-based line of the first
/// malformed record.
pub fn parse_inventory(text: &str) -> Result<Vec<AssetRecord>, IngestError> {
    let trimmed = text.trim_start();
    let records = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<CaiAsset>>(text)
            .map_err(|err| IngestError::json(err.line(), err))?
            .into_iter()
            .map(AssetRecord::from)
            .collect::<Vec<_>>()
    } else {
        parse_lines(text)?
    };
    debug!(records = records.len(), "decoded inventory");
    Ok(records)
}

fn parse_lines(text: &str) -> Result<Vec<AssetRecord>, IngestError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<CaiAsset>(line)
                .map(AssetRecord::from)
                .map_err(|err| IngestError::json(index + 1, err))
        })
        .collect()
}
