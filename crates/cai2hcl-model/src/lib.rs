//! cai2hcl data model
//!
//! Shared types for converting inventoried cloud assets into configuration
//! blocks.
//!
//! # Core Concepts
//!
//! - [`AssetRecord`]: one inventoried resource (type tag, parent, property bag, policy)
//! - [`Value`]: typed value tree between raw properties and rendered text
//! - [`ResourceSchema`]: declared attributes and nesting of one resource kind
//! - [`OutputBlock`]: labeled block body produced by a transform
//! - [`PolicyView`] / [`RoleBinding`]: access policy bindings
//!
//! # Example
//!
//! ```rust
//! use cai2hcl_model::{ElemKind, FieldSchema, ResourceSchema, Value};
//!
//! let schema = ResourceSchema::new()
//!     .field("name", FieldSchema::string().required())
//!     .field("labels", FieldSchema::map(ElemKind::String));
//! assert!(schema.check().is_ok());
//!
//! let body = Value::object([("name", Value::from("vm-1"))]);
//! assert_eq!(body.get("name").and_then(Value::as_str), Some("vm-1"));
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod asset;
mod block;
mod path;
mod schema;
mod value;

pub mod links;

pub use asset::{AssetRecord, PolicyView, RoleBinding};
pub use block::OutputBlock;
pub use path::FieldPath;
pub use schema::{ElemKind, FieldKind, FieldSchema, ResourceSchema, SchemaError, SchemaProvider, SchemaSet};
pub use value::{canonical_number, number_from_f64, parse_number, Fields, Value, ValueKind};

/// Re-export of the JSON property bag types
pub use serde_json::{Map as JsonMap, Value as JsonValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AssetRecord, ElemKind, FieldKind, FieldPath, FieldSchema, Fields, OutputBlock, PolicyView,
        ResourceSchema, RoleBinding, SchemaProvider, SchemaSet, Value, ValueKind,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn record_properties_convert_to_value_tree() {
        let record = AssetRecord::new("n", "t").with_data(json!({
            "labels": {"env": "prod"},
            "tags": ["a", "b"],
        }));
        let tree = Value::from_json(&JsonValue::Object(record.properties().clone()));
        assert_eq!(tree.get("labels").map(Value::kind), Some(ValueKind::Map));
        assert_eq!(tree.get("tags"), Some(&Value::string_list(["a", "b"])));
    }

    proptest! {
        #[test]
        fn whole_floats_match_integers(i in -1_000_000_000i64..1_000_000_000) {
            #[allow(clippy::cast_precision_loss)]
            let as_float = number_from_f64(i as f64);
            prop_assert_eq!(as_float, Some(serde_json::Number::from(i)));
            prop_assert_eq!(parse_number(&i.to_string()), Some(serde_json::Number::from(i)));
        }
    }
}
