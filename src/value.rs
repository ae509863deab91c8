use serde_json::{Map, Value};
use tracing::trace;

use crate::SanitizeOptions;

/// [`clean_up_schema_with`] with [`SanitizeOptions::default`].
pub fn clean_up_schema(schema: &mut Value) {
    clean_up_schema_with(schema, &SanitizeOptions::default());
}

/// Applies the sanitizer rules to plain json, in place, without building a graph first:
/// an object with `anyOf` loses `default`, and an object whose `type` is `"string"` (any case)
/// loses a non-empty `format` the options do not allow. Descends only into `anyOf`, `items`,
/// `properties`, and the definitions under `$defs`/`definitions`, so reference targets are cleaned
/// as well. Schemas under any other keyword (`oneOf`, `allOf`, `prefixItems`,
/// `additionalProperties`, ...) are not visited and keep their `format` and `default`.
/// Anything that is not an object, including boolean schemas, is left alone.
pub fn clean_up_schema_with(schema: &mut Value, options: &SanitizeOptions) {
    let Value::Object(map) = schema else {
        return;
    };
    clean_up_object(map, options);
}

fn clean_up_object(map: &mut Map<String, Value>, options: &SanitizeOptions) {
    if map.contains_key("anyOf") && map.remove("default").is_some() {
        trace!("removed `default` next to `anyOf`");
    }
    if let Some(Value::Array(entries)) = map.get_mut("anyOf") {
        for entry in entries {
            clean_up_schema_with(entry, options);
        }
    }
    if let Some(items) = map.get_mut("items") {
        clean_up_schema_with(items, options);
    }
    for keyword in ["properties", "$defs", "definitions"] {
        if let Some(Value::Object(entries)) = map.get_mut(keyword) {
            for entry in entries.values_mut() {
                clean_up_schema_with(entry, options);
            }
        }
    }
    let is_string = map
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("string"));
    if !is_string {
        return;
    }
    let disallowed = map
        .get("format")
        .and_then(Value::as_str)
        .is_some_and(|format| !format.is_empty() && !options.is_allowed_format(format));
    if disallowed {
        let format = map.remove("format");
        trace!(?format, "removed unsupported string `format`");
    }
}
