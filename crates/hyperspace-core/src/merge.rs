//! Override merging: apply a partial override document onto a base config.
//!
//! Nested nodes merge key by key while the selected implementation stays
//! the same. An override naming a different implementation replaces the
//! whole subtree, since the old parameters may mean nothing to the new
//! implementation. Every other value in the override replaces the base
//! value outright, sequences included.

use serde_json::Value;

use crate::document::{child_path, discriminator, Document};
use crate::error::{ConfigError, Result};
use crate::metrics::METRICS;
use crate::obs;

/// Return `base` with `overrides` applied. Neither input is modified.
///
/// `base` must be a well-formed config: wherever `overrides` names an
/// implementation for an existing node, that node has to name one too.
pub fn merge_override(base: &Document, overrides: &Document) -> Result<Document> {
    let merged = merge_at(base, overrides, "")?;
    METRICS.inc_overrides_merged();
    obs::emit_override_merged(overrides.len());
    Ok(merged)
}

fn merge_at(base: &Document, overrides: &Document, path: &str) -> Result<Document> {
    let mut merged = base.clone();

    for (key, value) in overrides {
        let Value::Object(update) = value else {
            merged.insert(key.clone(), value.clone());
            continue;
        };
        let Some(current) = base.get(key) else {
            merged.insert(key.clone(), value.clone());
            continue;
        };

        let at = child_path(path, key);
        let Value::Object(current) = current else {
            return Err(ConfigError::malformed(
                at,
                "override is a document but the base value is not",
            ));
        };

        let replacement = match discriminator(update, &at)? {
            None => merge_at(current, update, &at)?,
            Some(selected) => match discriminator(current, &at)? {
                Some(existing) if existing == selected => merge_at(current, update, &at)?,
                Some(existing) => {
                    obs::emit_subtree_replaced(&at, existing, selected);
                    update.clone()
                }
                None => return Err(ConfigError::MissingDiscriminator { path: at }),
            },
        };
        merged.insert(key.clone(), Value::Object(replacement));
    }

    Ok(merged)
}
