//! Authoritative merge strategies
//!
//! Incoming bindings own their roles: a role present in `incoming` replaces
//! the existing member set, and deleting it removes the whole role.

use cai2hcl_model::RoleBinding;

use crate::strategy::{from_role_map, to_role_map, MergeStrategy};

/// Replace member sets for every incoming role
///
/// Roles only present in `existing` are kept unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthoritativeMerge;

impl AuthoritativeMerge {
    /// Create new authoritative merge
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for AuthoritativeMerge {
    fn merge(&self, existing: &[RoleBinding], incoming: &[RoleBinding]) -> Vec<RoleBinding> {
        let mut merged = to_role_map(existing);
        for (role, members) in to_role_map(incoming) {
            merged.insert(role, members);
        }
        from_role_map(merged)
    }

    fn name(&self) -> &'static str {
        "authoritative"
    }
}

/// Remove every existing role that appears in `incoming`
///
/// Deletion is role-scoped: member overlap does not matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteAuthoritative;

impl DeleteAuthoritative {
    /// Create new authoritative delete
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for DeleteAuthoritative {
    fn merge(&self, existing: &[RoleBinding], incoming: &[RoleBinding]) -> Vec<RoleBinding> {
        let mut remaining = to_role_map(existing);
        for binding in incoming {
            remaining.remove(&binding.role);
        }
        from_role_map(remaining)
    }

    fn name(&self) -> &'static str {
        "delete_authoritative"
    }

    fn is_delete(&self) -> bool {
        true
    }
}
