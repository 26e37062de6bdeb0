//! Conversion options

use serde::{Deserialize, Serialize};

/// Shape of emitted access-policy blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IamStyle {
    /// One `<kind>_iam_policy` block carrying the whole policy
    #[default]
    Policy,
    /// One `<kind>_iam_binding` block per role
    Binding,
    /// One `<kind>_iam_member` block per role and member
    Member,
}

impl IamStyle {
    /// Block-kind suffix for this style
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Policy => cai2hcl_iam::POLICY_SUFFIX,
            Self::Binding => cai2hcl_iam::BINDING_SUFFIX,
            Self::Member => cai2hcl_iam::MEMBER_SUFFIX,
        }
    }
}

impl std::str::FromStr for IamStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy" => Ok(Self::Policy),
            "binding" => Ok(Self::Binding),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown iam style: {other}")),
        }
    }
}

/// Options for one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Report type mismatches instead of degrading to null
    pub strict: bool,
    /// Worker threads for transform groups; 1 runs inline
    pub max_workers: usize,
    /// Shape of emitted access-policy blocks
    pub iam_style: IamStyle,
}

impl ConvertOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With strict mode
    #[inline]
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// With worker count (clamped to at least 1)
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    /// With policy block style
    #[inline]
    #[must_use]
    pub fn with_iam_style(mut self, style: IamStyle) -> Self {
        self.iam_style = style;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_workers: 1,
            iam_style: IamStyle::Policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ConvertOptions::new();
        assert!(!options.strict);
        assert_eq!(options.max_workers, 1);
        assert_eq!(options.iam_style, IamStyle::Policy);
    }

    #[test]
    fn builder() {
        let options = ConvertOptions::new()
            .with_strict(true)
            .with_max_workers(0)
            .with_iam_style(IamStyle::Member);
        assert!(options.strict);
        assert_eq!(options.max_workers, 1);
        assert_eq!(options.iam_style.suffix(), "_iam_member");
    }

    #[test]
    fn deserializes_partial_table() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"iam_style": "binding", "max_workers": 4}"#).unwrap();
        assert_eq!(options.iam_style, IamStyle::Binding);
        assert_eq!(options.max_workers, 4);
        assert!(!options.strict);
    }

    #[test]
    fn style_from_str() {
        assert_eq!("member".parse::<IamStyle>(), Ok(IamStyle::Member));
        assert!("roles".parse::<IamStyle>().is_err());
    }
}
