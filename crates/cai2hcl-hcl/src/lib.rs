//! cai2hcl configuration layer
//!
//! Moves data across the engine's boundaries:
//!
//! - ingress: [`parse_inventory`] decodes exported asset records,
//!   [`schema_set_from_yaml`] / [`load_schema_file`] load resource schemas
//! - shaping: [`Normalizer`] restricts and coerces raw property bags to a
//!   schema, [`validate`] checks finished bodies in strict mode
//! - egress: [`render`] writes configuration blocks
//!
//! # Example
//!
//! ```rust
//! use cai2hcl_hcl::{normalize, render};
//! use cai2hcl_model::{FieldSchema, OutputBlock, ResourceSchema};
//! use serde_json::json;
//!
//! let schema = ResourceSchema::new().field("name", FieldSchema::string());
//! let raw = json!({"name": "a", "unknownField": "x"});
//! let body = normalize(raw.as_object().unwrap(), &schema);
//!
//! let text = render(&[OutputBlock::resource("simple", "a", body)]).unwrap();
//! assert_eq!(text, "resource \"simple\" \"a\" {\n  name = \"a\"\n}\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod ingest;
pub mod normalize;
pub mod render;
pub mod schemas;
pub mod validate;

pub use error::{IngestError, NormalizeError, RenderError, SchemaLoadError};
pub use ingest::{parse_inventory, CaiAsset};
pub use normalize::{normalize, Mode, Normalizer};
pub use render::{quote, render, render_block};
pub use schemas::{load_schema_file, schema_set_from_json, schema_set_from_yaml};
pub use validate::validate;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
