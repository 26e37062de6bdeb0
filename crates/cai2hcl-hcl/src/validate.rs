//! Schema-conformance validation of finished block bodies
//!
//! Transforms may assemble bodies by hand; [`validate`] checks the result
//! against the kind's schema before rendering when strict mode is on.

use cai2hcl_model::{FieldKind, FieldPath, FieldSchema, Fields, ResourceSchema, Value};

use crate::error::NormalizeError;

/// Check a block body against `schema`
///
/// Every key must be declared, every required field must be non-null and
/// every value must have its declared shape.
///
/// # Errors
///
/// Returns the first [`NormalizeError`] found, in body order.
pub fn validate(body: &Value, schema: &ResourceSchema) -> Result<(), NormalizeError> {
    let root = FieldPath::root();
    match body {
        Value::Object(fields) | Value::Map(fields) => validate_fields(fields, schema, &root),
        other => Err(NormalizeError::type_mismatch(root, "object", other.kind().as_str())),
    }
}

fn validate_fields(
    fields: &Fields,
    schema: &ResourceSchema,
    path: &FieldPath,
) -> Result<(), NormalizeError> {
    for (name, value) in fields {
        let field_path = path.child(name.as_str());
        let Some(field) = schema.get(name) else {
            return Err(NormalizeError::UndeclaredField { path: field_path });
        };
        validate_field(value, field, &field_path)?;
    }

    for (name, field) in &schema.fields {
        if field.required && fields.get(name).map_or(true, Value::is_null) {
            return Err(NormalizeError::MissingRequired {
                path: path.child(name.as_str()),
            });
        }
    }
    Ok(())
}

fn validate_field(value: &Value, field: &FieldSchema, path: &FieldPath) -> Result<(), NormalizeError> {
    if value.is_null() {
        return Ok(());
    }

    let mismatch = || NormalizeError::type_mismatch(path.clone(), field.describe(), value.kind().as_str());

    match (field.kind, value) {
        (FieldKind::String, Value::String(_)) | (FieldKind::Bool, Value::Bool(_)) => Ok(()),
        (FieldKind::Float, Value::Number(_)) => Ok(()),
        (FieldKind::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
        (FieldKind::Map, Value::Map(entries)) => match field.elem {
            Some(elem) => entries.iter().try_for_each(|(key, entry)| {
                validate_field(entry, &FieldSchema::from_elem(elem), &path.child(key.as_str()))
            }),
            None => Ok(()),
        },
        (FieldKind::Object, Value::Object(fields)) => match field.nested() {
            Some(schema) => validate_fields(fields, schema, path),
            None => Err(mismatch()),
        },
        (FieldKind::List | FieldKind::Set, Value::List(items)) => {
            items.iter().enumerate().try_for_each(|(index, item)| {
                let item_path = path.index(index);
                match (field.nested(), field.elem, item) {
                    (Some(schema), _, Value::Object(fields)) => {
                        validate_fields(fields, schema, &item_path)
                    }
                    (Some(_), _, other) => Err(NormalizeError::type_mismatch(
                        item_path,
                        "object",
                        other.kind().as_str(),
                    )),
                    (None, Some(elem), item) => {
                        validate_field(item, &FieldSchema::from_elem(elem), &item_path)
                    }
                    (None, None, _) => Ok(()),
                }
            })
        }
        _ => Err(mismatch()),
    }
}
