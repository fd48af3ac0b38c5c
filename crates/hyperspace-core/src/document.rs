//! Config documents and the helpers shared by the resolution engines.
//!
//! A config node is a JSON object. Nodes that select a concrete
//! implementation carry the reserved [`DISCRIMINATOR_FIELD`]. Locations
//! inside a document are reported as RFC 6901 JSON pointers, the empty
//! string being the root.

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Reserved key naming the implementation a node selects.
pub const DISCRIMINATOR_FIELD: &str = "className";

/// A config node: string keys mapped to JSON values.
pub type Document = Map<String, Value>;

/// Whether `value` is a node carrying a discriminator (of any type).
pub fn is_discriminated(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|node| node.contains_key(DISCRIMINATOR_FIELD))
}

/// Read the discriminator of `node`.
///
/// Returns `Ok(None)` when the field is absent and `MalformedConfig` when it
/// is present but not a string.
pub fn discriminator<'a>(node: &'a Document, path: &str) -> Result<Option<&'a str>> {
    match node.get(DISCRIMINATOR_FIELD) {
        None => Ok(None),
        Some(Value::String(name)) => Ok(Some(name.as_str())),
        Some(other) => Err(ConfigError::malformed(
            path,
            format!("{DISCRIMINATOR_FIELD} must be a string, found {}", type_name(other)),
        )),
    }
}

/// Like [`discriminator`], but a missing field is an error.
pub fn require_discriminator<'a>(node: &'a Document, path: &str) -> Result<&'a str> {
    discriminator(node, path)?.ok_or_else(|| ConfigError::MissingDiscriminator {
        path: path.to_string(),
    })
}

/// Coerce a value into a document, failing with `MalformedConfig` otherwise.
pub fn into_document(value: Value, path: &str) -> Result<Document> {
    match value {
        Value::Object(node) => Ok(node),
        other => Err(ConfigError::malformed(
            path,
            format!("expected a document, found {}", type_name(&other)),
        )),
    }
}

/// Pointer to `key` under the node at `parent`.
pub fn child_path(parent: &str, key: &str) -> String {
    let escaped = key.replace('~', "~0").replace('/', "~1");
    format!("{parent}/{escaped}")
}

/// JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "document",
    }
}
