//! Schema normalizer
//!
//! Restricts a raw property bag to the fields a [`ResourceSchema`] declares
//! and coerces each value to its declared kind. Output keys follow schema
//! declaration order.
//!
//! In best-effort mode misshapen values degrade to `Null` (dropped from
//! collections); in strict mode the first one is reported as
//! [`NormalizeError::TypeMismatch`].

use cai2hcl_model::{
    canonical_number, parse_number, ElemKind, FieldKind, FieldPath, FieldSchema, Fields, JsonMap,
    JsonValue, ResourceSchema, Value,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::NormalizeError;

/// How misshapen values are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Degrade to `Null`
    #[default]
    BestEffort,
    /// Report [`NormalizeError::TypeMismatch`]
    Strict,
}

/// Schema-driven normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    mode: Mode,
}

impl Normalizer {
    /// Normalizer with the given mode
    #[inline]
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Best-effort normalizer
    #[inline]
    #[must_use]
    pub fn best_effort() -> Self {
        Self::new(Mode::BestEffort)
    }

    /// Strict normalizer
    #[inline]
    #[must_use]
    pub fn strict() -> Self {
        Self::new(Mode::Strict)
    }

    /// Active mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Normalize a property bag into an `Object`
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first [`NormalizeError::TypeMismatch`].
    /// Best-effort mode never fails.
    pub fn normalize(
        &self,
        raw: &JsonMap<String, JsonValue>,
        schema: &ResourceSchema,
    ) -> Result<Value, NormalizeError> {
        self.object(raw, schema, &FieldPath::root()).map(Value::Object)
    }

    /// Normalize an arbitrary JSON value; non-objects are misshapen
    ///
    /// # Errors
    ///
    /// In strict mode, returns the first [`NormalizeError::TypeMismatch`].
    pub fn normalize_value(
        &self,
        raw: &JsonValue,
        schema: &ResourceSchema,
    ) -> Result<Value, NormalizeError> {
        match raw {
            JsonValue::Object(map) => self.normalize(map, schema),
            other => self.mismatch(&FieldPath::root(), "object", other),
        }
    }

    fn object(
        &self,
        raw: &JsonMap<String, JsonValue>,
        schema: &ResourceSchema,
        path: &FieldPath,
    ) -> Result<Fields, NormalizeError> {
        for key in raw.keys().filter(|k| !schema.contains(k)) {
            trace!(field = %path.child(key.as_str()), "dropping undeclared field");
        }

        let mut fields = Fields::with_capacity(schema.len());
        for (name, field) in &schema.fields {
            if let Some(value) = raw.get(name) {
                let value = self.field(value, field, &path.child(name.as_str()))?;
                fields.insert(name.clone(), value);
            }
        }
        Ok(fields)
    }

    fn field(
        &self,
        raw: &JsonValue,
        field: &FieldSchema,
        path: &FieldPath,
    ) -> Result<Value, NormalizeError> {
        if raw.is_null() {
            return Ok(Value::Null);
        }

        match field.kind {
            FieldKind::String => self.scalar(raw, ElemKind::String, path),
            FieldKind::Bool => self.scalar(raw, ElemKind::Bool, path),
            FieldKind::Int => self.scalar(raw, ElemKind::Int, path),
            FieldKind::Float => self.scalar(raw, ElemKind::Float, path),
            FieldKind::Map => self.map(raw, field, path),
            FieldKind::Object => self.nested(raw, field, path),
            FieldKind::List | FieldKind::Set => {
                let items = self.collection(raw, field, path)?;
                Ok(match items {
                    Value::List(items) if field.kind == FieldKind::Set => {
                        Value::List(dedup(items))
                    }
                    other => other,
                })
            }
        }
    }

    fn scalar(
        &self,
        raw: &JsonValue,
        kind: ElemKind,
        path: &FieldPath,
    ) -> Result<Value, NormalizeError> {
        match coerce_scalar(raw, kind) {
            Some(value) => Ok(value),
            None => self.mismatch(path, FieldKind::from(kind).as_str(), raw),
        }
    }

    fn map(
        &self,
        raw: &JsonValue,
        field: &FieldSchema,
        path: &FieldPath,
    ) -> Result<Value, NormalizeError> {
        let JsonValue::Object(entries) = raw else {
            return self.mismatch(path, &field.describe(), raw);
        };

        let mut map = Fields::with_capacity(entries.len());
        for (key, value) in entries {
            let value = match field.elem {
                Some(elem) if !value.is_null() => self.scalar(value, elem, &path.child(key.as_str()))?,
                Some(_) => Value::Null,
                None => Value::from_json(value),
            };
            if !value.is_null() {
                map.insert(key.clone(), value);
            }
        }
        Ok(Value::Map(map))
    }

    fn nested(
        &self,
        raw: &JsonValue,
        field: &FieldSchema,
        path: &FieldPath,
    ) -> Result<Value, NormalizeError> {
        let Some(schema) = field.nested() else {
            return self.mismatch(path, &field.describe(), raw);
        };

        match raw {
            JsonValue::Object(map) => self.object(map, schema, path).map(Value::Object),
            // single-element block lists are accepted for single blocks
            JsonValue::Array(items) if items.len() == 1 && items[0].is_object() => {
                self.nested(&items[0], field, path)
            }
            other => self.mismatch(path, &field.describe(), other),
        }
    }

    fn collection(
        &self,
        raw: &JsonValue,
        field: &FieldSchema,
        path: &FieldPath,
    ) -> Result<Value, NormalizeError> {
        let items: Vec<&JsonValue> = match raw {
            JsonValue::Array(items) => items.iter().collect(),
            JsonValue::Object(_) if field.nested().is_some() => vec![raw],
            other => return self.mismatch(path, &field.describe(), other),
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let item_path = path.index(index);
            let value = match (field.nested(), field.elem) {
                (Some(schema), _) => match item {
                    JsonValue::Object(map) => Value::Object(self.object(map, schema, &item_path)?),
                    other => self.mismatch(&item_path, "object", other)?,
                },
                (None, Some(elem)) => self.scalar(item, elem, &item_path)?,
                (None, None) => Value::from_json(item),
            };
            if !value.is_null() {
                out.push(value);
            }
        }
        Ok(Value::List(out))
    }

    fn mismatch(
        &self,
        path: &FieldPath,
        expected: &str,
        found: &JsonValue,
    ) -> Result<Value, NormalizeError> {
        match self.mode {
            Mode::Strict => Err(NormalizeError::type_mismatch(
                path.clone(),
                expected,
                json_kind(found),
            )),
            Mode::BestEffort => {
                trace!(field = %path, expected, found = json_kind(found), "dropping misshapen value");
                Ok(Value::Null)
            }
        }
    }
}

/// Best-effort normalization of a property bag
#[must_use]
pub fn normalize(raw: &JsonMap<String, JsonValue>, schema: &ResourceSchema) -> Value {
    Normalizer::best_effort()
        .normalize(raw, schema)
        .unwrap_or_else(|_| Value::Object(Fields::new()))
}

/// Coerce a JSON scalar to the canonical value of `kind`
///
/// Strings holding numbers or booleans are accepted for numeric and boolean
/// kinds; numbers and booleans are stringified for string kinds.
#[must_use]
pub fn coerce_scalar(raw: &JsonValue, kind: ElemKind) -> Option<Value> {
    match (kind, raw) {
        (ElemKind::String, JsonValue::String(s)) => Some(Value::String(s.clone())),
        (ElemKind::String, JsonValue::Number(n)) => Some(Value::String(canonical_number(n).to_string())),
        (ElemKind::String, JsonValue::Bool(b)) => Some(Value::String(b.to_string())),

        (ElemKind::Bool, JsonValue::Bool(b)) => Some(Value::Bool(*b)),
        (ElemKind::Bool, JsonValue::String(s)) => s.parse::<bool>().ok().map(Value::Bool),

        (ElemKind::Int, JsonValue::Number(n)) => integral(canonical_number(n)),
        (ElemKind::Int, JsonValue::String(s)) => parse_number(s).and_then(integral),

        (ElemKind::Float, JsonValue::Number(n)) => Some(Value::Number(canonical_number(n))),
        (ElemKind::Float, JsonValue::String(s)) => parse_number(s).map(Value::Number),

        _ => None,
    }
}

fn integral(n: serde_json::Number) -> Option<Value> {
    (n.is_i64() || n.is_u64()).then_some(Value::Number(n))
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Shape name of a JSON value in diagnostics
#[must_use]
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "list",
        JsonValue::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cai2hcl_model::ValueKind;
    use serde_json::json;

    fn bag(value: JsonValue) -> JsonMap<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .field("name", FieldSchema::string())
            .field("size", FieldSchema::int())
            .field("ratio", FieldSchema::float())
            .field("enabled", FieldSchema::bool())
            .field("tags", FieldSchema::set(cai2hcl_model::ElemKind::String))
            .field("ports", FieldSchema::list(cai2hcl_model::ElemKind::Int))
            .field("labels", FieldSchema::map(cai2hcl_model::ElemKind::String))
            .field(
                "boot_disk",
                FieldSchema::object(ResourceSchema::new().field("source", FieldSchema::string())),
            )
            .field(
                "backend",
                FieldSchema::block_set(ResourceSchema::new().field("group", FieldSchema::string())),
            )
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let value = normalize(&bag(json!({"name": "a", "unknownField": "x"})), &schema());
        assert_eq!(value, Value::object([("name", Value::from("a"))]));
    }

    #[test]
    fn keys_follow_schema_order() {
        let value = normalize(&bag(json!({"enabled": true, "size": 3, "name": "a"})), &schema());
        let keys: Vec<_> = value.fields().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "size", "enabled"]);
    }

    #[test]
    fn numeric_coercion_is_canonical() {
        let value = normalize(&bag(json!({"size": "10", "ratio": 2.0})), &schema());
        assert_eq!(value.get("size"), Some(&Value::from(10)));
        assert_eq!(value.get("ratio"), Some(&Value::from(2)));

        let from_float = normalize(&bag(json!({"size": 10.0})), &schema());
        assert_eq!(from_float.get("size"), value.get("size"));
    }

    #[test]
    fn scalars_stringify_for_string_fields() {
        let value = normalize(&bag(json!({"name": 42})), &schema());
        assert_eq!(value.get("name"), Some(&Value::from("42")));
    }

    #[test]
    fn sets_dedup_in_encounter_order() {
        let value = normalize(&bag(json!({"tags": ["b", "a", "b"]})), &schema());
        assert_eq!(value.get("tags"), Some(&Value::string_list(["b", "a"])));
    }

    #[test]
    fn lists_keep_duplicates() {
        let value = normalize(&bag(json!({"ports": [80, "80", 443]})), &schema());
        assert_eq!(
            value.get("ports"),
            Some(&Value::List(vec![Value::from(80), Value::from(80), Value::from(443)]))
        );
    }

    #[test]
    fn maps_stay_free_form() {
        let value = normalize(&bag(json!({"labels": {"Env": "prod", "tier": 2}})), &schema());
        let labels = value.get("labels").unwrap();
        assert_eq!(labels.kind(), ValueKind::Map);
        assert_eq!(labels.get("tier"), Some(&Value::from("2")));
    }

    #[test]
    fn nested_objects_recurse() {
        let value = normalize(
            &bag(json!({"boot_disk": {"source": "disk-1", "extra": true}})),
            &schema(),
        );
        assert_eq!(
            value.get("boot_disk"),
            Some(&Value::object([("source", Value::from("disk-1"))]))
        );
    }

    #[test]
    fn single_block_list_unwraps_for_object() {
        let value = normalize(&bag(json!({"boot_disk": [{"source": "d"}]})), &schema());
        assert_eq!(value.get("boot_disk").map(Value::kind), Some(ValueKind::Object));
    }

    #[test]
    fn single_object_wraps_for_block_collection() {
        let value = normalize(&bag(json!({"backend": {"group": "g"}})), &schema());
        assert_eq!(
            value.get("backend"),
            Some(&Value::List(vec![Value::object([("group", Value::from("g"))])]))
        );
    }

    #[test]
    fn misshapen_values_degrade_to_null() {
        let value = normalize(&bag(json!({"name": ["a"], "size": "ten", "ports": [1, "x"]})), &schema());
        assert_eq!(value.get("name"), Some(&Value::Null));
        assert_eq!(value.get("size"), Some(&Value::Null));
        assert_eq!(value.get("ports"), Some(&Value::List(vec![Value::from(1)])));
    }

    #[test]
    fn strict_mode_reports_path() {
        let err = Normalizer::strict()
            .normalize(&bag(json!({"ports": [1, "x"]})), &schema())
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::type_mismatch(FieldPath::single("ports").index(1), "int", "string")
        );
    }

    #[test]
    fn strict_mode_reports_list_for_string() {
        let err = Normalizer::strict()
            .normalize(&bag(json!({"name": ["a"]})), &schema())
            .unwrap_err();
        assert_eq!(err.to_string(), "type mismatch at name: expected string, found list");
    }

    #[test]
    fn non_object_root() {
        let value = Normalizer::best_effort()
            .normalize_value(&json!([1]), &schema())
            .unwrap();
        assert!(value.is_null());
        assert!(Normalizer::strict().normalize_value(&json!("x"), &schema()).is_err());
    }
}
