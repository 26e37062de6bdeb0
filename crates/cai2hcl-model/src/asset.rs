//! Asset records and access policies
//!
//! An [`AssetRecord`] is one inventoried cloud resource: a type tag used for
//! dispatch, a parent locator, an untyped property bag and optionally an
//! attached [`PolicyView`]. Records are immutable once built.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// One (role, members) pair of an access policy
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleBinding {
    /// Role name, e.g. `roles/viewer`
    pub role: String,
    /// Principals granted the role, kept sorted
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl RoleBinding {
    /// Build a binding from a role and its members
    pub fn new<I, S>(role: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether no members are granted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Access policy attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyView {
    /// Role bindings
    #[serde(default)]
    pub bindings: Vec<RoleBinding>,
}

impl PolicyView {
    /// Policy with the given bindings
    #[inline]
    #[must_use]
    pub fn new(bindings: Vec<RoleBinding>) -> Self {
        Self { bindings }
    }

    /// Whether the policy grants nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.iter().all(RoleBinding::is_empty)
    }

    /// Binding for `role`, if any
    #[must_use]
    pub fn role(&self, role: &str) -> Option<&RoleBinding> {
        self.bindings.iter().find(|b| b.role == role)
    }
}

/// Inventoried resource description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetRecord {
    name: String,
    #[serde(rename = "type")]
    asset_type: String,
    #[serde(default)]
    parent: String,
    #[serde(default)]
    properties: JsonMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    policy: Option<PolicyView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ancestry: Vec<String>,
}

impl AssetRecord {
    /// New record with an empty property bag
    #[must_use]
    pub fn new(name: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_type: asset_type.into(),
            ..Self::default()
        }
    }

    /// Builder: parent locator
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// Builder: property bag
    #[must_use]
    pub fn with_properties(mut self, properties: JsonMap<String, JsonValue>) -> Self {
        self.properties = properties;
        self
    }

    /// Builder: property bag from a JSON value; non-objects give an empty bag
    #[must_use]
    pub fn with_data(self, data: JsonValue) -> Self {
        match data {
            JsonValue::Object(map) => self.with_properties(map),
            _ => self.with_properties(JsonMap::new()),
        }
    }

    /// Builder: attached policy
    #[must_use]
    pub fn with_policy(mut self, policy: PolicyView) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Builder: ancestry, nearest first
    #[must_use]
    pub fn with_ancestry<I, S>(mut self, ancestry: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ancestry = ancestry.into_iter().map(Into::into).collect();
        self
    }

    /// Globally unique resource locator
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag used for dispatch
    #[inline]
    #[must_use]
    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    /// Parent locator (may be empty)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Raw property bag
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &JsonMap<String, JsonValue> {
        &self.properties
    }

    /// Attached policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> Option<&PolicyView> {
        self.policy.as_ref()
    }

    /// Ancestry, nearest first
    #[inline]
    #[must_use]
    pub fn ancestry(&self) -> &[String] {
        &self.ancestry
    }

    /// Raw property by key
    #[inline]
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&JsonValue> {
        self.properties.get(key)
    }

    /// String property by key
    #[must_use]
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(JsonValue::as_str)
    }
}
