//! Additive merge strategies
//!
//! Incoming bindings contribute members: merging unions them into the
//! existing role, deleting removes exactly the contributed pairs.

use std::collections::BTreeSet;

use cai2hcl_model::RoleBinding;

use crate::strategy::{from_role_map, to_role_map, MergeStrategy};

/// Union incoming members into existing roles, creating absent roles
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditiveMerge;

impl AdditiveMerge {
    /// Create new additive merge
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for AdditiveMerge {
    fn merge(&self, existing: &[RoleBinding], incoming: &[RoleBinding]) -> Vec<RoleBinding> {
        let mut merged = to_role_map(existing);
        for binding in incoming {
            merged
                .entry(binding.role.clone())
                .or_default()
                .extend(binding.members.iter().cloned());
        }
        from_role_map(merged)
    }

    fn name(&self) -> &'static str {
        "additive"
    }
}

/// Remove exactly the `(role, member)` pairs listed in `incoming`
///
/// Roles left without members are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteAdditive;

impl DeleteAdditive {
    /// Create new additive delete
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for DeleteAdditive {
    fn merge(&self, existing: &[RoleBinding], incoming: &[RoleBinding]) -> Vec<RoleBinding> {
        let removed: BTreeSet<(&str, &str)> = incoming
            .iter()
            .flat_map(|b| b.members.iter().map(move |m| (b.role.as_str(), m.as_str())))
            .collect();

        let mut remaining = to_role_map(existing);
        for (role, members) in &mut remaining {
            members.retain(|m| !removed.contains(&(role.as_str(), m.as_str())));
        }
        remaining.retain(|_, members| !members.is_empty());
        from_role_map(remaining)
    }

    fn name(&self) -> &'static str {
        "delete_additive"
    }

    fn is_delete(&self) -> bool {
        true
    }
}
