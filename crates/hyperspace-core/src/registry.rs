//! Registry of abstract kinds and their named implementations.
//!
//! Registration happens on a [`RegistryBuilder`] during initialization.
//! [`RegistryBuilder::finish`] freezes it into a [`Registry`], which is
//! read-only, `Send + Sync`, and is passed by reference into every
//! resolution and construction call.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::construct::Params;
use crate::document::{into_document, require_discriminator, Document, DISCRIMINATOR_FIELD};
use crate::error::{ConfigError, Result};
use crate::metrics::METRICS;
use crate::obs;

/// Produces a fresh default config on every call.
pub type DefaultSupplier = Box<dyn Fn() -> Document + Send + Sync>;

/// Builds a `T` from the parameters of a config node.
///
/// Constructors return `anyhow::Result` so they can use `?` on their own
/// error types; a [`ConfigError`] raised through `?` reaches the caller
/// unchanged, anything else is wrapped in [`ConfigError::Constructor`].
pub type Constructor<T> = Box<dyn Fn(&mut Params<'_>) -> anyhow::Result<T> + Send + Sync>;

struct Implementation {
    /// Holds a `Constructor<T>` for the owning kind's product type.
    constructor: Box<dyn Any + Send + Sync>,
    defaults: DefaultSupplier,
}

struct KindEntry {
    product: TypeId,
    product_name: &'static str,
    implementations: BTreeMap<String, Implementation>,
}

impl KindEntry {
    fn check_product<T: 'static>(&self, kind: &str) -> Result<()> {
        if self.product == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(ConfigError::KindTypeMismatch {
                kind: kind.to_string(),
                expected: self.product_name,
                requested: std::any::type_name::<T>(),
            })
        }
    }
}

/// Mutable registration phase of a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    kinds: BTreeMap<String, KindEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty implementation set for `kind`, whose constructors
    /// produce `T`.
    pub fn register_kind<T: 'static>(&mut self, kind: &str) -> Result<&mut Self> {
        if self.kinds.contains_key(kind) {
            return Err(ConfigError::DuplicateKind(kind.to_string()));
        }
        self.kinds.insert(
            kind.to_string(),
            KindEntry {
                product: TypeId::of::<T>(),
                product_name: std::any::type_name::<T>(),
                implementations: BTreeMap::new(),
            },
        );
        tracing::debug!(kind = %kind, product = std::any::type_name::<T>(), "kind registered");
        Ok(self)
    }

    /// Register implementation `name` of `kind`.
    ///
    /// `defaults` is invoked on every lookup so no two resolved documents
    /// share a default value.
    pub fn register_implementation<T, C, D>(
        &mut self,
        kind: &str,
        name: &str,
        constructor: C,
        defaults: D,
    ) -> Result<&mut Self>
    where
        T: 'static,
        C: Fn(&mut Params<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
        D: Fn() -> Document + Send + Sync + 'static,
    {
        let entry = self
            .kinds
            .get_mut(kind)
            .ok_or_else(|| ConfigError::UnknownKind(kind.to_string()))?;
        entry.check_product::<T>(kind)?;
        if entry.implementations.contains_key(name) {
            return Err(ConfigError::DuplicateImplementation {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }

        let constructor: Constructor<T> = Box::new(constructor);
        entry.implementations.insert(
            name.to_string(),
            Implementation {
                constructor: Box::new(constructor),
                defaults: Box::new(defaults),
            },
        );
        tracing::debug!(kind = %kind, implementation = %name, "implementation registered");
        Ok(self)
    }

    /// Register a plain serde component `C` as implementation `name`.
    ///
    /// Defaults are the fields of `C::default()`; construction deserializes
    /// the node into `C` and converts it with `into`. Only the fields that
    /// `C::default()` serializes are accepted as parameters, so a field the
    /// default omits (e.g. via `skip_serializing_if`) is rejected as
    /// unexpected even though `C` would deserialize it.
    pub fn register_serde<T, C>(&mut self, kind: &str, name: &str, into: fn(C) -> T) -> Result<&mut Self>
    where
        T: 'static,
        C: Serialize + DeserializeOwned + Default + 'static,
    {
        let defaults = into_document(serde_json::to_value(C::default())?, "")?;
        let fields: BTreeSet<String> = defaults.keys().cloned().collect();

        self.register_implementation(
            kind,
            name,
            move |params: &mut Params<'_>| {
                let mut taken = Document::new();
                for field in &fields {
                    if let Some(value) = params.take_raw(field) {
                        taken.insert(field.clone(), value);
                    }
                }
                let component: C = serde_json::from_value(Value::Object(taken))
                    .map_err(|e| ConfigError::malformed(params.path(), e.to_string()))?;
                Ok(into(component))
            },
            move || defaults.clone(),
        )
    }

    /// Freeze the registrations.
    pub fn finish(self) -> Registry {
        tracing::debug!(kinds = self.kinds.len(), "registry frozen");
        Registry { kinds: self.kinds }
    }
}

/// Read-only mapping from kind name to its named implementations.
pub struct Registry {
    kinds: BTreeMap<String, KindEntry>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, entry) in &self.kinds {
            map.entry(kind, &entry.implementations.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Implementation names registered under `kind`, sorted.
    pub fn implementations(&self, kind: &str) -> Result<Vec<&str>> {
        Ok(self.kind(kind)?.implementations.keys().map(String::as_str).collect())
    }

    /// A fresh copy of the defaults declared by `kind`/`name`.
    pub fn default_config(&self, kind: &str, name: &str) -> Result<Document> {
        let (_, implementation) = self.lookup(kind, name)?;
        Ok((implementation.defaults)())
    }

    /// Invoke the constructor of `kind`/`name` with `params` as given.
    pub fn construct<T: 'static>(&self, kind: &str, name: &str, params: Document) -> Result<T> {
        self.invoke(kind, name, params, String::new())
    }

    /// Build a component of `kind` from a discriminated node.
    ///
    /// Defaults of the selected implementation fill any key the node leaves
    /// out (one level only); nested components are left to the constructor.
    pub fn build<T: 'static>(&self, node: &Document, kind: &str) -> Result<T> {
        self.build_at(node, kind, String::new())
    }

    pub(crate) fn build_at<T: 'static>(&self, node: &Document, kind: &str, path: String) -> Result<T> {
        let name = require_discriminator(node, &path)?;
        let mut fields = self.default_config(kind, name)?;
        for (key, value) in node {
            if key != DISCRIMINATOR_FIELD {
                fields.insert(key.clone(), value.clone());
            }
        }
        self.invoke(kind, name, fields, path)
    }

    fn invoke<T: 'static>(&self, kind: &str, name: &str, fields: Document, path: String) -> Result<T> {
        let (entry, implementation) = self.lookup(kind, name)?;
        entry.check_product::<T>(kind)?;
        let constructor = implementation
            .constructor
            .downcast_ref::<Constructor<T>>()
            .ok_or_else(|| ConfigError::KindTypeMismatch {
                kind: kind.to_string(),
                expected: entry.product_name,
                requested: std::any::type_name::<T>(),
            })?;

        let mut params = Params::new(self, kind, name, path, fields);
        let built = constructor(&mut params).map_err(|err| match err.downcast::<ConfigError>() {
            Ok(config_err) => config_err,
            Err(source) => ConfigError::Constructor {
                kind: kind.to_string(),
                name: name.to_string(),
                source,
            },
        })?;
        params.finish()?;

        METRICS.inc_components_built();
        obs::emit_component_built(kind, name);
        Ok(built)
    }

    fn kind(&self, kind: &str) -> Result<&KindEntry> {
        self.kinds
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownKind(kind.to_string()))
    }

    fn lookup(&self, kind: &str, name: &str) -> Result<(&KindEntry, &Implementation)> {
        let entry = self.kind(kind)?;
        let implementation =
            entry
                .implementations
                .get(name)
                .ok_or_else(|| ConfigError::UnknownImplementation {
                    kind: kind.to_string(),
                    name: name.to_string(),
                })?;
        Ok((entry, implementation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Widget(u64);

    fn widget_registry() -> Registry {
        let mut builder = Registry::builder();
        builder
            .register_kind::<Widget>("Widget")
            .unwrap()
            .register_implementation(
                "Widget",
                "Sized",
                |params: &mut Params<'_>| Ok(Widget(params.take("size")?)),
                || {
                    let mut defaults = Document::new();
                    defaults.insert("size".to_string(), json!(3));
                    defaults
                },
            )
            .unwrap();
        builder.finish()
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut builder = Registry::builder();
        builder.register_kind::<Widget>("Widget").unwrap();
        let err = builder.register_kind::<Widget>("Widget").err().unwrap();
        assert!(matches!(err, ConfigError::DuplicateKind(ref k) if k == "Widget"));
    }

    #[test]
    fn test_implementation_requires_kind() {
        let mut builder = Registry::builder();
        let err = builder
            .register_implementation("Gadget", "Any", |_: &mut Params<'_>| Ok(Widget(0)), Document::new)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::UnknownKind(ref k) if k == "Gadget"));
    }

    #[test]
    fn test_duplicate_implementation_rejected() {
        let mut builder = Registry::builder();
        builder.register_kind::<Widget>("Widget").unwrap();
        builder
            .register_implementation("Widget", "A", |_: &mut Params<'_>| Ok(Widget(0)), Document::new)
            .unwrap();
        let err = builder
            .register_implementation("Widget", "A", |_: &mut Params<'_>| Ok(Widget(1)), Document::new)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::DuplicateImplementation { .. }));
    }

    #[test]
    fn test_implementation_product_must_match_kind() {
        let mut builder = Registry::builder();
        builder.register_kind::<Widget>("Widget").unwrap();
        let err = builder
            .register_implementation("Widget", "Wrong", |_: &mut Params<'_>| Ok(5u8), Document::new)
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::KindTypeMismatch { .. }));
    }

    #[test]
    fn test_default_config_is_fresh_each_call() {
        let registry = widget_registry();
        let mut first = registry.default_config("Widget", "Sized").unwrap();
        first.insert("size".to_string(), json!(99));
        let second = registry.default_config("Widget", "Sized").unwrap();
        assert_eq!(second.get("size"), Some(&json!(3)));
    }

    #[test]
    fn test_construct_and_lookup_errors() {
        let registry = widget_registry();
        let mut params = Document::new();
        params.insert("size".to_string(), json!(8));
        let widget: Widget = registry.construct("Widget", "Sized", params).unwrap();
        assert_eq!(widget, Widget(8));

        let err = registry
            .construct::<Widget>("Widget", "Missing", Document::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownImplementation { .. }));

        let err = registry
            .construct::<Widget>("Gadget", "Sized", Document::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKind(_)));
    }

    #[test]
    fn test_construct_with_wrong_product_type() {
        let registry = widget_registry();
        let err = registry
            .construct::<String>("Widget", "Sized", Document::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::KindTypeMismatch { .. }));
    }

    #[test]
    fn test_listing() {
        let registry = widget_registry();
        assert!(registry.contains_kind("Widget"));
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["Widget"]);
        assert_eq!(registry.implementations("Widget").unwrap(), vec!["Sized"]);
        assert!(registry.implementations("Gadget").is_err());
        assert!(format!("{registry:?}").contains("Sized"));
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Panel {
        width: f64,
        label: Option<String>,
    }

    #[test]
    fn test_register_serde_defaults_and_rejects_unknown_fields() {
        let mut builder = Registry::builder();
        builder.register_kind::<Widget>("Widget").unwrap();
        builder
            .register_serde("Widget", "Panel", |panel: Panel| Widget(panel.width as u64))
            .unwrap();
        let registry = builder.finish();

        let defaults = registry.default_config("Widget", "Panel").unwrap();
        assert_eq!(defaults.get("width"), Some(&json!(0.0)));
        assert_eq!(defaults.get("label"), Some(&Value::Null));

        let node = into_document(json!({"className": "Panel", "width": 12.0}), "").unwrap();
        let widget: Widget = registry.build(&node, "Widget").unwrap();
        assert_eq!(widget, Widget(12));

        let node = into_document(json!({"className": "Panel", "depth": 1}), "").unwrap();
        let err = registry.build::<Widget>(&node, "Widget").unwrap_err();
        assert!(err.to_string().contains("depth"));
    }
}
