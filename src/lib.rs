//! Cleans up tool parameter schemas so a generative-AI function calling api accepts them.
//!
//! The api only takes a subset of json-schema. It rejects `default` next to `anyOf`, and for
//! STRING parameters it only knows the `enum` and `date-time` formats. [`sanitize`] fixes both on
//! a [`Schema`] graph in place, even when the graph is recursive. [`clean_up_schema`] does the same
//! on plain json.

mod convert;
mod errors;
#[cfg(feature = "schemars")]
mod generate;
mod node;
mod options;
mod sanitize;
mod utils;
mod value;

pub use errors::*;
#[cfg(feature = "schemars")]
pub use generate::{parameters_for, schema_for};
pub use node::{Schema, SchemaOrBool, SchemaRef, SchemaType};
pub use options::{SanitizeOptions, ALLOWED_STRING_FORMATS_ENV, DEFAULT_ALLOWED_STRING_FORMATS};
pub use sanitize::{sanitize, sanitize_with, SanitizeStats};
pub use utils::NodeId;
pub use value::{clean_up_schema, clean_up_schema_with};

pub use serde_json::{json, Value};
