//! Policy blocks for resources carrying an embedded access policy
//!
//! Records of one resource (same asset name) have their policies folded in
//! input order, then emitted in the configured [`IamStyle`].

use cai2hcl_iam::{fold_policies, policy_data, MergeStrategy};
use cai2hcl_model::{AssetRecord, Fields, OutputBlock, PolicyView, Value};
use indexmap::IndexMap;

use super::TransformContext;
use crate::error::TransformError;
use crate::options::IamStyle;

/// Computes the policy identity of a resource record
pub type TargetFn = fn(&AssetRecord) -> Result<PolicyTarget, TransformError>;

/// Resource a policy is attached to
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTarget {
    id: String,
    identity: Fields,
}

impl PolicyTarget {
    /// Target with a block id and the attributes identifying the resource
    #[must_use]
    pub fn new(id: impl Into<String>, identity: Fields) -> Self {
        Self {
            id: id.into(),
            identity,
        }
    }

    /// Block id stem
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identity attributes, e.g. `project`
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &Fields {
        &self.identity
    }
}

/// Block kind of policies on `base` in `style`
#[must_use]
pub fn policy_kind(base: &str, style: IamStyle) -> String {
    format!("{base}{}", style.suffix())
}

/// Policy blocks for every record of the group that carries a policy
///
/// # Errors
///
/// Returns the target function's error for a policy-carrying record whose
/// identity cannot be computed, or a strict-mode mismatch.
pub fn policy_blocks(
    ctx: &TransformContext<'_>,
    base: &str,
    records: &[&AssetRecord],
    target: TargetFn,
    style: IamStyle,
    strategy: &dyn MergeStrategy,
) -> Result<Vec<OutputBlock>, TransformError> {
    let mut by_name: IndexMap<&str, (&AssetRecord, Vec<&PolicyView>)> = IndexMap::new();
    for &record in records {
        if let Some(policy) = record.policy() {
            by_name
                .entry(record.name())
                .or_insert_with(|| (record, Vec::new()))
                .1
                .push(policy);
        }
    }

    let kind = policy_kind(base, style);
    let mut blocks = Vec::new();
    for (record, views) in by_name.values() {
        let Some(folded) = fold_policies(views.iter().copied(), strategy) else {
            continue;
        };
        if folded.is_empty() {
            continue;
        }
        let target = target(record)?;
        match style {
            IamStyle::Policy => {
                let mut body = target.identity().clone();
                body.insert("policy_data".into(), Value::from(policy_data(&folded)));
                blocks.push(ctx.block(record, &kind, &slug(target.id()), Value::Object(body))?);
            }
            IamStyle::Binding => {
                for binding in folded.bindings.iter().filter(|b| !b.is_empty()) {
                    let mut body = target.identity().clone();
                    body.insert("role".into(), Value::from(binding.role.as_str()));
                    body.insert("members".into(), Value::string_list(&binding.members));
                    let id = slug(&format!("{}_{}", target.id(), binding.role));
                    blocks.push(ctx.block(record, &kind, &id, Value::Object(body))?);
                }
            }
            IamStyle::Member => {
                for binding in &folded.bindings {
                    for member in &binding.members {
                        let mut body = target.identity().clone();
                        body.insert("role".into(), Value::from(binding.role.as_str()));
                        body.insert("member".into(), Value::from(member.as_str()));
                        let id = slug(&format!("{}_{}_{}", target.id(), binding.role, member));
                        blocks.push(ctx.block(record, &kind, &id, Value::Object(body))?);
                    }
                }
            }
        }
    }
    Ok(blocks)
}

/// Block id safe form: anything but `[A-Za-z0-9_-]` becomes `_`
#[must_use]
pub fn slug(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
