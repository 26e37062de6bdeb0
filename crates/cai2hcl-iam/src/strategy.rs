//! Merge strategy trait and core types
//!
//! Provides the [`MergeStrategy`] trait for combining two role-binding lists.

use std::collections::{BTreeMap, BTreeSet};

use cai2hcl_model::RoleBinding;

/// Role → members, sorted on both levels
pub(crate) type RoleMap = BTreeMap<String, BTreeSet<String>>;

/// Combines an existing binding list with an incoming one
///
/// Implementations are pure: the result depends only on the two inputs, is
/// sorted by role, and keeps members sorted. Merging the same `incoming`
/// twice gives the same result as merging it once.
pub trait MergeStrategy: Send + Sync + std::fmt::Debug {
    /// Combine `existing` with `incoming`
    fn merge(&self, existing: &[RoleBinding], incoming: &[RoleBinding]) -> Vec<RoleBinding>;

    /// Strategy name (for logging and registry lookups)
    fn name(&self) -> &'static str;

    /// Whether this strategy removes bindings rather than adding them
    fn is_delete(&self) -> bool {
        false
    }
}

/// Collapse a binding list into a role map; repeated roles are unioned
pub(crate) fn to_role_map(bindings: &[RoleBinding]) -> RoleMap {
    let mut map = RoleMap::new();
    for binding in bindings {
        map.entry(binding.role.clone())
            .or_default()
            .extend(binding.members.iter().cloned());
    }
    map
}

/// Expand a role map back into a sorted binding list
pub(crate) fn from_role_map(map: RoleMap) -> Vec<RoleBinding> {
    map.into_iter()
        .map(|(role, members)| RoleBinding { role, members })
        .collect()
}

/// Sort a binding list by role without merging
#[must_use]
pub fn canonical(bindings: &[RoleBinding]) -> Vec<RoleBinding> {
    from_role_map(to_role_map(bindings))
}

/// Errors from merge rule lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Block kind does not name a policy resource
    #[error("no merge rule for resource kind: {kind}")]
    UnknownKind {
        /// Offending block kind
        kind: String,
    },
}

impl MergeError {
    /// Create unknown-kind error
    #[must_use]
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_map_unions_repeated_roles() {
        let bindings = vec![
            RoleBinding::new("roles/b", ["user:2"]),
            RoleBinding::new("roles/a", ["user:1"]),
            RoleBinding::new("roles/b", ["user:1"]),
        ];
        let result = canonical(&bindings);
        assert_eq!(
            result,
            vec![
                RoleBinding::new("roles/a", ["user:1"]),
                RoleBinding::new("roles/b", ["user:1", "user:2"]),
            ]
        );
    }

    #[test]
    fn merge_error_display() {
        let err = MergeError::unknown_kind("google_project");
        assert_eq!(err.to_string(), "no merge rule for resource kind: google_project");
    }
}
