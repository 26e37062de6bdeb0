//! cai2hcl access-policy merge algebra
//!
//! Combines partial role-binding views of one underlying policy.
//!
//! # Core Concepts
//!
//! - [`MergeStrategy`]: pure `(existing, incoming) -> bindings` combinator
//! - [`AuthoritativeMerge`] / [`DeleteAuthoritative`]: role-owning semantics
//! - [`AdditiveMerge`] / [`DeleteAdditive`]: member-contributing semantics
//! - [`MergeRegistry`]: policy resource kind → merge rule
//!
//! # Example
//!
//! ```rust
//! use cai2hcl_iam::{AdditiveMerge, MergeStrategy};
//! use cai2hcl_model::RoleBinding;
//!
//! let existing = vec![RoleBinding::new("viewer", ["A", "B"])];
//! let incoming = vec![RoleBinding::new("viewer", ["C"])];
//! let merged = AdditiveMerge.merge(&existing, &incoming);
//! assert_eq!(merged, vec![RoleBinding::new("viewer", ["A", "B", "C"])]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod additive;
mod authoritative;
mod fold;
mod registry;
mod strategy;

pub use additive::{AdditiveMerge, DeleteAdditive};
pub use authoritative::{AuthoritativeMerge, DeleteAuthoritative};
pub use fold::{fold_policies, merge_policy, policy_data};
pub use registry::{MergeRegistry, MergeRule, BINDING_SUFFIX, MEMBER_SUFFIX, POLICY_SUFFIX};
pub use strategy::{canonical, MergeError, MergeStrategy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use cai2hcl_model::RoleBinding;
    use proptest::collection::{btree_map, btree_set};
    use proptest::prelude::*;

    fn bindings(member_prefix: &'static str) -> impl Strategy<Value = Vec<RoleBinding>> {
        btree_map(
            "role-[a-e]",
            btree_set("[a-f]{1,2}", 0..4).prop_map(move |set| {
                set.into_iter()
                    .map(|m| format!("{member_prefix}{m}"))
                    .collect::<Vec<_>>()
            }),
            0..5,
        )
        .prop_map(|map| {
            map.into_iter()
                .map(|(role, members)| RoleBinding::new(role, members))
                .collect()
        })
    }

    fn non_empty(bindings: Vec<RoleBinding>) -> Vec<RoleBinding> {
        bindings.into_iter().filter(|b| !b.is_empty()).collect()
    }

    proptest! {
        #[test]
        fn authoritative_is_idempotent(existing in bindings("e:"), incoming in bindings("i:")) {
            let once = AuthoritativeMerge.merge(&existing, &incoming);
            let twice = AuthoritativeMerge.merge(&once, &incoming);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn additive_is_idempotent(existing in bindings("e:"), incoming in bindings("i:")) {
            let once = AdditiveMerge.merge(&existing, &incoming);
            let twice = AdditiveMerge.merge(&once, &incoming);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn deletes_are_idempotent(existing in bindings("m:"), incoming in bindings("m:")) {
            let once = DeleteAdditive.merge(&existing, &incoming);
            prop_assert_eq!(DeleteAdditive.merge(&once, &incoming), once);

            let once = DeleteAuthoritative.merge(&existing, &incoming);
            prop_assert_eq!(DeleteAuthoritative.merge(&once, &incoming), once);
        }

        #[test]
        fn delete_additive_inverts_additive(existing in bindings("e:"), incoming in bindings("i:")) {
            let existing = non_empty(existing);
            let added = AdditiveMerge.merge(&existing, &incoming);
            let restored = DeleteAdditive.merge(&added, &incoming);
            prop_assert_eq!(restored, canonical(&existing));
        }

        #[test]
        fn results_are_sorted_by_role(existing in bindings("e:"), incoming in bindings("i:")) {
            let strategies: [&dyn MergeStrategy; 4] =
                [&AuthoritativeMerge, &AdditiveMerge, &DeleteAuthoritative, &DeleteAdditive];
            for strategy in strategies {
                let result = strategy.merge(&existing, &incoming);
                prop_assert!(result.windows(2).all(|w| w[0].role < w[1].role));
            }
        }
    }

    #[test]
    fn registry_rules_follow_block_kinds() {
        let registry = MergeRegistry::with_defaults();
        let existing = vec![RoleBinding::new("viewer", ["A", "B"])];
        let incoming = vec![RoleBinding::new("viewer", ["C"])];

        let member = registry.resolve("google_project_iam_member").unwrap();
        assert_eq!(
            member.merge.merge(&existing, &incoming),
            vec![RoleBinding::new("viewer", ["A", "B", "C"])]
        );

        let policy = registry.resolve("google_project_iam_policy").unwrap();
        assert_eq!(
            policy.merge.merge(&existing, &incoming),
            vec![RoleBinding::new("viewer", ["C"])]
        );
    }
}
