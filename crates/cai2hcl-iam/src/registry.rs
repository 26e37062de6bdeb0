//! Merge rule registry
//!
//! Provides [`MergeRegistry`], which maps policy resource kinds to the
//! strategies used to combine and tear down their bindings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::additive::{AdditiveMerge, DeleteAdditive};
use crate::authoritative::{AuthoritativeMerge, DeleteAuthoritative};
use crate::strategy::{MergeError, MergeStrategy};

/// Block-kind suffix of whole-policy resources
pub const POLICY_SUFFIX: &str = "_iam_policy";
/// Block-kind suffix of per-role resources
pub const BINDING_SUFFIX: &str = "_iam_binding";
/// Block-kind suffix of per-member resources
pub const MEMBER_SUFFIX: &str = "_iam_member";

/// Merge and delete strategies for one kind of policy resource
#[derive(Debug, Clone)]
pub struct MergeRule {
    /// Applied when the resource is created or updated
    pub merge: Arc<dyn MergeStrategy>,
    /// Applied when the resource is destroyed
    pub delete: Arc<dyn MergeStrategy>,
}

impl MergeRule {
    /// Rule for resources that own whole roles
    #[must_use]
    pub fn authoritative() -> Self {
        Self {
            merge: Arc::new(AuthoritativeMerge),
            delete: Arc::new(DeleteAuthoritative),
        }
    }

    /// Rule for resources that contribute individual members
    #[must_use]
    pub fn additive() -> Self {
        Self {
            merge: Arc::new(AdditiveMerge),
            delete: Arc::new(DeleteAdditive),
        }
    }
}

/// Registry of merge rules keyed by block-kind suffix
#[derive(Debug, Default, Clone)]
pub struct MergeRegistry {
    rules: BTreeMap<String, MergeRule>,
}

impl MergeRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with the built-in policy resource kinds
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(POLICY_SUFFIX, MergeRule::authoritative());
        registry.register(BINDING_SUFFIX, MergeRule::authoritative());
        registry.register(MEMBER_SUFFIX, MergeRule::additive());
        registry
    }

    /// Register a rule for a block-kind suffix
    pub fn register(&mut self, suffix: &str, rule: MergeRule) {
        self.rules.insert(suffix.to_string(), rule);
    }

    /// Check if a suffix is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, suffix: &str) -> bool {
        self.rules.contains_key(suffix)
    }

    /// Get number of registered rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule for a block kind such as `google_project_iam_member`
    ///
    /// The longest registered suffix of `kind` wins.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownKind`] if no registered suffix matches.
    pub fn resolve(&self, kind: &str) -> Result<&MergeRule, MergeError> {
        self.rules
            .iter()
            .filter(|(suffix, _)| kind.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, rule)| rule)
            .ok_or_else(|| MergeError::unknown_kind(kind))
    }

    /// Name of the merge strategy for a block kind
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownKind`] if no registered suffix matches.
    pub fn select_name(&self, kind: &str) -> Result<&'static str, MergeError> {
        self.resolve(kind).map(|rule| rule.merge.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_new_empty() {
        let registry = MergeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = MergeRegistry::with_defaults();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(POLICY_SUFFIX));
        assert!(registry.contains(BINDING_SUFFIX));
        assert!(registry.contains(MEMBER_SUFFIX));
    }

    #[test]
    fn resolve_by_suffix() {
        let registry = MergeRegistry::with_defaults();
        assert_eq!(
            registry.select_name("google_project_iam_policy"),
            Ok("authoritative")
        );
        assert_eq!(
            registry.select_name("google_compute_instance_iam_binding"),
            Ok("authoritative")
        );
        assert_eq!(registry.select_name("google_project_iam_member"), Ok("additive"));
    }

    #[test]
    fn resolve_delete_counterpart() {
        let registry = MergeRegistry::with_defaults();
        let rule = registry.resolve("google_folder_iam_member").unwrap();
        assert_eq!(rule.delete.name(), "delete_additive");
        assert!(rule.delete.is_delete());
    }

    #[test]
    fn resolve_unknown_kind() {
        let registry = MergeRegistry::with_defaults();
        assert!(matches!(
            registry.resolve("google_project"),
            Err(MergeError::UnknownKind { .. })
        ));
    }

    #[test]
    fn register_custom_rule_overrides() {
        let mut registry = MergeRegistry::with_defaults();
        registry.register(BINDING_SUFFIX, MergeRule::additive());
        assert_eq!(registry.select_name("google_project_iam_binding"), Ok("additive"));
    }
}
