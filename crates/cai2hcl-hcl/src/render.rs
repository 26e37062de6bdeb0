//! Block serializer
//!
//! Renders [`OutputBlock`]s as `resource "<kind>" "<id>" { ... }` text.
//!
//! Each key of an object or map body is handled by the first matching rule:
//!
//! 1. `Null` is omitted
//! 2. `Object` becomes a nested block named after the key
//! 3. a non-empty list of `Object`s becomes one repeated block per element
//! 4. an empty list or map is omitted
//! 5. an empty string is omitted
//! 6. anything else is a `key = value` attribute
//!
//! Inside map literals the same omissions apply to every entry, and `Null`
//! list items are dropped.

use std::fmt::Write;

use cai2hcl_model::{Fields, OutputBlock, Value};

use crate::error::RenderError;

const INDENT: &str = "  ";

/// Render blocks in order, separated by blank lines
///
/// # Errors
///
/// Returns [`RenderError::SerializationType`] if a block body is not an
/// object or map, or [`RenderError::MissingLabels`] if a block has no labels.
pub fn render(blocks: &[OutputBlock]) -> Result<String, RenderError> {
    let mut out = String::new();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_block(block, &mut out)?;
    }
    Ok(out)
}

/// Render one block into `out`
///
/// # Errors
///
/// See [`render`].
pub fn render_block(block: &OutputBlock, out: &mut String) -> Result<(), RenderError> {
    let fields = match &block.body {
        Value::Object(fields) | Value::Map(fields) => fields,
        other => {
            return Err(RenderError::SerializationType {
                labels: block.labels.clone(),
                found: other.kind().to_string(),
            })
        }
    };
    if block.labels.is_empty() {
        return Err(RenderError::MissingLabels);
    }

    out.push_str("resource");
    for label in &block.labels {
        write!(out, " {}", quote(label))?;
    }
    out.push_str(" {\n");
    write_body(fields, 1, out)?;
    out.push_str("}\n");
    Ok(())
}

fn write_body(fields: &Fields, depth: usize, out: &mut String) -> Result<(), RenderError> {
    let pad = INDENT.repeat(depth);
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Object(nested) => write_nested(key, nested, depth, out)?,
            Value::List(items) if is_block_list(items) => {
                for item in items {
                    if let Value::Object(nested) = item {
                        write_nested(key, nested, depth, out)?;
                    }
                }
            }
            v if is_omitted(v) => {}
            v => {
                write!(out, "{pad}{} = ", attribute_key(key))?;
                write_value(v, depth, out)?;
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn write_nested(
    key: &str,
    fields: &Fields,
    depth: usize,
    out: &mut String,
) -> Result<(), RenderError> {
    let pad = INDENT.repeat(depth);
    writeln!(out, "{pad}{key} {{")?;
    write_body(fields, depth + 1, out)?;
    writeln!(out, "{pad}}}")?;
    Ok(())
}

fn is_block_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(|item| matches!(item, Value::Object(_)))
}

/// Whether a value renders to nothing
///
/// Maps and lists count as empty once their own omitted entries are dropped,
/// so `{ a = null }` disappears like `{}`.
fn is_omitted(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::List(items) => items.iter().all(|item| matches!(item, Value::Null)),
        Value::Map(entries) => entries.values().all(is_omitted),
        other => other.is_empty_value(),
    }
}

fn kept_entries(entries: &Fields) -> impl Iterator<Item = (&String, &Value)> {
    entries.iter().filter(|(_, entry)| !is_omitted(entry))
}

fn write_value(value: &Value, depth: usize, out: &mut String) -> Result<(), RenderError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => write!(out, "{b}")?,
        Value::Number(n) => write!(out, "{n}")?,
        Value::String(s) => out.push_str(&quote(s)),
        Value::List(items) => {
            out.push('[');
            let kept = items.iter().filter(|item| !matches!(item, Value::Null));
            for (index, item) in kept.enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_inline(item, out)?;
            }
            out.push(']');
        }
        Value::Map(entries) | Value::Object(entries) => {
            let mut kept = kept_entries(entries).peekable();
            if kept.peek().is_none() {
                out.push_str("{}");
                return Ok(());
            }
            let pad = INDENT.repeat(depth);
            out.push_str("{\n");
            for (key, entry) in kept {
                write!(out, "{pad}{INDENT}{} = ", attribute_key(key))?;
                write_value(entry, depth + 1, out)?;
                out.push('\n');
            }
            write!(out, "{pad}}}")?;
        }
    }
    Ok(())
}

fn write_inline(value: &Value, out: &mut String) -> Result<(), RenderError> {
    match value {
        Value::Map(entries) | Value::Object(entries) => {
            let mut count = 0;
            out.push('{');
            for (key, entry) in kept_entries(entries) {
                out.push_str(if count > 0 { ", " } else { " " });
                write!(out, "{} = ", attribute_key(key))?;
                write_inline(entry, out)?;
                count += 1;
            }
            out.push_str(if count == 0 { "}" } else { " }" });
        }
        other => write_value(other, 0, out)?,
    }
    Ok(())
}

fn attribute_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Whether `s` can appear unquoted as an attribute or map key
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Quote and escape a string literal
///
/// Template sequences `${` and `%{` are doubled so they render literally.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
