//! Completion Validation
//!
//! Strict conversion of model output into classification records:
//! - `json_extract`: unwrap fenced or prose-wrapped JSON
//! - `schema`: record schema, format instructions and the strict parser
//!
//! Malformed JSON is never patched here. It is sent back to the model once
//! through the repair loop instead.

mod json_extract;
mod schema;

pub use json_extract::{extract_object_from_mixed, preprocess};
pub use schema::{FieldKind, FieldSpec, ProductCatalog, SchemaDefinition, SchemaParser};
