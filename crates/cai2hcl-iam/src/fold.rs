//! Folding several policy views into one

use cai2hcl_model::PolicyView;

use crate::strategy::{canonical, MergeStrategy};

/// Merge `incoming` into an optional existing policy
///
/// With no existing policy the incoming one is taken as-is (sorted).
#[must_use]
pub fn merge_policy(
    existing: Option<&PolicyView>,
    incoming: &PolicyView,
    strategy: &dyn MergeStrategy,
) -> PolicyView {
    match existing {
        Some(existing) => PolicyView::new(strategy.merge(&existing.bindings, &incoming.bindings)),
        None => PolicyView::new(canonical(&incoming.bindings)),
    }
}

/// Fold views in order with `strategy`; `None` if there are no views
pub fn fold_policies<'a, I>(views: I, strategy: &dyn MergeStrategy) -> Option<PolicyView>
where
    I: IntoIterator<Item = &'a PolicyView>,
{
    views
        .into_iter()
        .fold(None, |acc, view| Some(merge_policy(acc.as_ref(), view, strategy)))
}

/// Compact JSON of a policy as carried in `policy_data`
///
/// Bindings come out sorted by role with sorted members; empty roles are
/// omitted.
#[must_use]
pub fn policy_data(policy: &PolicyView) -> String {
    let bindings: Vec<_> = canonical(&policy.bindings)
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect();
    serde_json::json!({ "bindings": bindings }).to_string()
}
