use schemars::{generate::SchemaSettings, JsonSchema, SchemaGenerator};
use serde_json::Value;

use crate::{clean_up_schema, sanitize, Schema, SchemaError, SchemaRef};

fn generate<T: JsonSchema>() -> Value {
    let schema_settings = SchemaSettings::draft2020_12();
    let schema = SchemaGenerator::new(schema_settings).into_root_schema_for::<T>();
    schema.to_value()
}

/// The sanitized parameter schema of `T` as a graph. Recursive types come back as cycles.
pub fn schema_for<T: JsonSchema>() -> Result<SchemaRef, SchemaError> {
    let schema = Schema::from_value(&generate::<T>())?;
    sanitize(Some(&schema));
    Ok(schema)
}

/// The parameter schema of `T` as json, cleaned up with [`clean_up_schema`]. References are kept
/// as they are, their targets under `$defs` are cleaned too. Only schemas reached through `anyOf`,
/// `items`, `properties`, and `$defs` are cleaned. Types that make schemars emit `oneOf`, `allOf`,
/// `prefixItems`, or `additionalProperties` schemas keep whatever those contain.
pub fn parameters_for<T: JsonSchema>() -> Value {
    let mut schema = generate::<T>();
    clean_up_schema(&mut schema);
    schema
}
