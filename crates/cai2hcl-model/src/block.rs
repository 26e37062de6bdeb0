//! Output blocks

use crate::value::Value;

/// One labeled configuration block
///
/// `labels` are the header tokens (kind, then identifier); `body` must be an
/// `Object` or `Map` for the block to render.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBlock {
    /// Header tokens
    pub labels: Vec<String>,
    /// Block body
    pub body: Value,
}

impl OutputBlock {
    /// Block with arbitrary labels
    #[must_use]
    pub fn new(labels: Vec<String>, body: Value) -> Self {
        Self { labels, body }
    }

    /// Block labeled `[kind, id]`
    #[must_use]
    pub fn resource(kind: impl Into<String>, id: impl Into<String>, body: Value) -> Self {
        Self::new(vec![kind.into(), id.into()], body)
    }

    /// First label (the resource kind)
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Second label (the identifier)
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.labels.get(1).map(String::as_str)
    }
}
