//! Parameters handed to implementation constructors.
//!
//! A constructor pulls the fields it declares out of [`Params`]. Whatever it
//! leaves behind is reported as an unexpected parameter once it returns, so
//! the set of `take*`/`build` calls is the implementation's declared
//! interface.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::document::{child_path, into_document, type_name, Document};
use crate::error::{ConfigError, Result};
use crate::registry::Registry;

/// The non-discriminator fields of one config node, being consumed by its
/// constructor.
pub struct Params<'r> {
    registry: &'r Registry,
    kind: String,
    implementation: String,
    path: String,
    fields: Document,
}

impl<'r> Params<'r> {
    pub(crate) fn new(
        registry: &'r Registry,
        kind: &str,
        implementation: &str,
        path: String,
        fields: Document,
    ) -> Self {
        Self {
            registry,
            kind: kind.to_string(),
            implementation: implementation.to_string(),
            path,
            fields,
        }
    }

    /// Registry the node is being built against, for deferred builds.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Kind the node is being built as.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Implementation named by the node's discriminator.
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// JSON pointer of the node within the document being built.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Remove `key` without interpreting it.
    pub fn take_raw(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Remove and deserialize a required parameter.
    pub fn take<V: DeserializeOwned>(&mut self, key: &str) -> Result<V> {
        let value = self.fields.remove(key).ok_or_else(|| {
            ConfigError::malformed(
                &self.path,
                format!("{}/{} requires parameter {key}", self.kind, self.implementation),
            )
        })?;
        self.decode(key, value)
    }

    /// Remove and deserialize an optional parameter; `null` counts as absent.
    pub fn take_opt<V: DeserializeOwned>(&mut self, key: &str) -> Result<Option<V>> {
        match self.fields.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.decode(key, value).map(Some),
        }
    }

    /// Remove a nested document and keep it unbuilt, for lazy construction.
    pub fn take_document(&mut self, key: &str) -> Result<Document> {
        let value = self.take::<Value>(key)?;
        into_document(value, &child_path(&self.path, key))
    }

    /// Remove a nested discriminated node and build it now, using `key` as
    /// its kind.
    pub fn build<U: 'static>(&mut self, key: &str) -> Result<U> {
        let node = self.take_document(key)?;
        self.registry
            .build_at(&node, key, child_path(&self.path, key))
    }

    fn decode<V: DeserializeOwned>(&self, key: &str, value: Value) -> Result<V> {
        let found = type_name(&value);
        serde_json::from_value(value).map_err(|e| {
            ConfigError::malformed(
                child_path(&self.path, key),
                format!("{e} (found {found})"),
            )
        })
    }

    /// Fail on any parameter the constructor did not consume.
    pub(crate) fn finish(self) -> Result<()> {
        if self.fields.is_empty() {
            return Ok(());
        }
        let unexpected: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        Err(ConfigError::malformed(
            &self.path,
            format!(
                "unexpected parameters for {}/{}: {}",
                self.kind,
                self.implementation,
                unexpected.join(", ")
            ),
        ))
    }
}
