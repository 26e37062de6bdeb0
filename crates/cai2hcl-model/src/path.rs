//! Field paths for addressing within value trees
//!
//! Provides [`FieldPath`] for naming the location of a value inside a
//! normalized block body, used by schema-conformance diagnostics.

use std::fmt::{self, Display, Formatter};

/// Path within a value tree
///
/// Segments are field names or map keys, with list positions recorded as
/// decimal indices. Display only; map keys may contain `.` or `-`.
///
/// # Examples
/// - `["name"]` → `name`
/// - `["network_interface", "0", "access_config"]` → `network_interface.0.access_config`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Empty path (block body root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create path from a single segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Append a field segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Append a list position, returning new path
    #[inline]
    #[must_use]
    pub fn index(&self, position: usize) -> Self {
        self.child(position.to_string())
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        write!(f, "{}", self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_root() {
        assert_eq!(FieldPath::root().to_string(), "<root>");
        assert_eq!(FieldPath::default(), FieldPath::root());
    }

    #[test]
    fn path_child_and_index() {
        let path = FieldPath::single("network_interface")
            .index(0)
            .child("access_config");
        assert_eq!(path.to_string(), "network_interface.0.access_config");
    }

    #[test]
    fn map_key_segments_display_verbatim() {
        let path = FieldPath::single("labels").child("cost-center");
        assert_eq!(path.to_string(), "labels.cost-center");
    }
}
