//! Schema-driven flattening of API-shaped data
//!
//! Converts camelCase API keys to the snake_case names a schema declares,
//! recursing only into declared nested blocks so free-form map keys (labels,
//! metadata) are left alone. The result is fed to the normalizer.

use cai2hcl_model::{JsonMap, JsonValue, ResourceSchema};

/// Label added by provisioning tools; never emitted
pub const PROVISIONED_LABEL: &str = "goog-terraform-provisioned";

/// Convert an API key to snake_case
///
/// Acronym runs stay together: `IPAddress` → `ip_address`,
/// `enableCDN` → `enable_cdn`, `http2HealthCheck` → `http2_health_check`.
#[must_use]
pub fn snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Flatten `raw` into schema-declared key names
///
/// `renames` maps API keys whose config name is not their snake_case form
/// (`backends` → `backend`). Keys the schema does not declare are dropped.
#[must_use]
pub fn flatten(
    raw: &JsonMap<String, JsonValue>,
    schema: &ResourceSchema,
    renames: &[(&str, &str)],
) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    for (key, value) in raw {
        let name = renames
            .iter()
            .find(|(from, _)| *from == key)
            .map_or_else(|| snake_case(key), |(_, to)| (*to).to_string());
        let Some(field) = schema.get(&name) else {
            continue;
        };
        let value = match field.nested() {
            Some(nested) => flatten_nested(value, nested),
            None => value.clone(),
        };
        out.insert(name, value);
    }
    out
}

fn flatten_nested(value: &JsonValue, schema: &ResourceSchema) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(flatten(map, schema, &[])),
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(|item| flatten_nested(item, schema)).collect())
        }
        other => other.clone(),
    }
}

/// Drop provisioning labels from a raw `labels` map
#[must_use]
pub fn user_labels(labels: Option<&JsonValue>) -> Option<JsonValue> {
    let JsonValue::Object(map) = labels? else {
        return None;
    };
    let kept: JsonMap<String, JsonValue> = map
        .iter()
        .filter(|(key, _)| key.as_str() != PROVISIONED_LABEL)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Some(JsonValue::Object(kept))
}

/// Replace the string at `key` with `f(value)`, if present
pub fn map_str(data: &mut JsonMap<String, JsonValue>, key: &str, f: impl Fn(&str) -> String) {
    if let Some(JsonValue::String(s)) = data.get(key) {
        let mapped = f(s);
        data.insert(key.to_string(), JsonValue::String(mapped));
    }
}
