//! Default filling: complete a partial config document from the defaults
//! each selected implementation declares.
//!
//! A node carrying a discriminator is resolved under its kind context, and
//! every default key it does not set is inserted. Children that are
//! themselves discriminated nodes are then filled with their key as the
//! kind context. Sequences and undiscriminated nested documents are not
//! traversed.

use crate::document::{child_path, discriminator, is_discriminated, Document};
use crate::error::{ConfigError, Result};
use crate::metrics::METRICS;
use crate::obs;
use crate::registry::Registry;

/// Return a copy of `node` with defaults filled in, recursively.
///
/// `kind` is the kind context of `node` itself. Pass `None` for a whole
/// document whose top-level keys name the kinds of their values, e.g.
/// `{"Vehicle": {"className": "Car"}}`.
pub fn fill_defaults(registry: &Registry, node: &Document, kind: Option<&str>) -> Result<Document> {
    let mut inserted = 0;
    let filled = fill_node(registry, node, kind, "", &mut inserted)?;
    obs::emit_defaults_filled(kind, inserted);
    Ok(filled)
}

fn fill_node(
    registry: &Registry,
    node: &Document,
    kind: Option<&str>,
    path: &str,
    inserted: &mut usize,
) -> Result<Document> {
    let mut filled = node.clone();

    if let Some(name) = discriminator(node, path)? {
        let kind = kind.ok_or_else(|| ConfigError::MissingKindContext {
            path: path.to_string(),
        })?;
        for (key, value) in registry.default_config(kind, name)? {
            if filled.contains_key(&key) {
                continue;
            }
            tracing::debug!(kind = %kind, implementation = %name, "Setting {key}={value}");
            filled.insert(key, value);
            METRICS.inc_defaults_inserted();
            *inserted += 1;
        }
    }

    let mut children = Vec::new();
    for (key, value) in &filled {
        if !is_discriminated(value) {
            continue;
        }
        if let Some(child) = value.as_object() {
            let at = child_path(path, key);
            children.push((key.clone(), fill_node(registry, child, Some(key), &at, inserted)?));
        }
    }
    for (key, child) in children {
        filled.insert(key, child.into());
    }

    Ok(filled)
}
