//! cai2hcl Core - asset record to configuration block conversion
//!
//! Ties the pieces together:
//! - Dispatches asset records to per-resource transforms by asset type
//! - Normalizes API-shaped properties against resource schemas
//! - Emits policy blocks for resources carrying an access policy
//! - Collects per-group failures without aborting the batch
//!
//! # Example
//!
//! ```rust
//! use cai2hcl_core::{Converter, ConvertOptions};
//! use cai2hcl_model::AssetRecord;
//! use serde_json::json;
//!
//! let record = AssetRecord::new(
//!     "//cloudresourcemanager.googleapis.com/projects/1234",
//!     "cloudresourcemanager.googleapis.com/Project",
//! )
//! .with_data(json!({"projectId": "my-proj", "name": "My Project"}));
//!
//! let converter = Converter::builtin().with_options(ConvertOptions::new());
//! let conversion = converter.convert(&[record]).unwrap();
//! assert!(conversion.is_clean());
//! assert!(conversion.render().unwrap().starts_with("resource \"google_project\" \"my-proj\" {"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod converter;
pub mod error;
pub mod options;
pub mod registry;
pub mod schemas;
pub mod transforms;

pub use converter::{Conversion, Converter};
pub use error::{ConversionError, ConversionErrorKind, ConvertError, TransformError};
pub use options::{ConvertOptions, IamStyle};
pub use registry::{build_registry, ConversionRegistry, RegisteredTransform, TransformFn};
pub use schemas::{builtin_schemas, try_builtin_schemas};
pub use transforms::iam::{PolicyTarget, TargetFn};
pub use transforms::TransformContext;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running conversions
    pub use crate::{
        build_registry, builtin_schemas, Conversion, ConversionError, ConversionErrorKind,
        ConversionRegistry, ConvertOptions, Converter, IamStyle,
    };
    pub use cai2hcl_model::{AssetRecord, OutputBlock, PolicyView, RoleBinding};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use cai2hcl_model::{AssetRecord, PolicyView, RoleBinding};
    use proptest::prelude::*;
    use serde_json::json;

    fn project(id: &str, members: &[String]) -> AssetRecord {
        let record = AssetRecord::new(
            format!("//cloudresourcemanager.googleapis.com/projects/{id}"),
            "cloudresourcemanager.googleapis.com/Project",
        )
        .with_data(json!({"projectId": id, "name": id, "labels": {"env": "test"}}));
        if members.is_empty() {
            record
        } else {
            record.with_policy(PolicyView::new(vec![RoleBinding::new(
                "roles/viewer",
                members.iter().cloned(),
            )]))
        }
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    proptest! {
        #[test]
        fn parallel_matches_serial(
            ids in prop::collection::btree_set("[a-z][a-z0-9-]{2,8}", 1..6),
            members in prop::collection::vec("user:[a-z]{1,4}", 0..4),
            style in prop_oneof![Just(IamStyle::Policy), Just(IamStyle::Binding), Just(IamStyle::Member)],
        ) {
            let records: Vec<_> = ids.iter().map(|id| project(id, &members)).collect();
            let options = ConvertOptions::new().with_iam_style(style);
            let serial = Converter::builtin().with_options(options.clone());
            let parallel = Converter::builtin().with_options(options.with_max_workers(4));
            let a = serial.convert(&records).unwrap().render().unwrap();
            let b = parallel.convert(&records).unwrap().render().unwrap();
            let again = serial.convert(&records).unwrap().render().unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a, again);
        }
    }
}
