use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::loader::RegistryBuilder;
use crate::types::{Definition, Kind, Resolver, Value};

/// Keyed store of definitions with lazy, tag-driven resolution.
///
/// Entries keep insertion order. Only service definitions populate the
/// instance cache; factories and computed entries run on every `get`.
#[derive(Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Definition>,
    instances: HashMap<String, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with plain values.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries = values
            .into_iter()
            .map(|(id, value)| (id.into(), Definition::from_value(value)))
            .collect();
        Self {
            entries,
            instances: HashMap::new(),
        }
    }

    /// Create a RegistryBuilder for loading definition files
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Get the stored definition without resolving it.
    pub fn raw_get(&self, id: &str) -> Result<&Definition> {
        self.entries.get(id).ok_or_else(|| Error::not_found(id))
    }

    /// Resolve an identifier according to the tag of its definition.
    pub fn get(&mut self, id: &str) -> Result<Value> {
        if let Some(instance) = self.instances.get(id) {
            return Ok(instance.clone());
        }

        // Cloning the definition releases the borrow so the resolver can
        // receive the registry mutably.
        let definition = self.raw_get(id)?.clone();
        tracing::trace!(id, kind = ?definition.kind(), "resolving");

        match definition {
            Definition::Plain(value) => Ok(value),
            Definition::Factory(resolver) | Definition::Computed(resolver) => {
                resolver(self).map_err(Error::from_resolver)
            }
            Definition::Service(resolver) => {
                let instance = resolver(self).map_err(Error::from_resolver)?;
                // The resolver may have deleted or replaced its own entry.
                let current = matches!(
                    self.entries.get(id),
                    Some(Definition::Service(r)) if Arc::ptr_eq(r, &resolver)
                );
                if current {
                    tracing::debug!(id, "caching service instance");
                    self.instances.insert(id.to_string(), instance.clone());
                }
                Ok(instance)
            }
        }
    }

    /// Resolve an identifier and downcast the result.
    pub fn get_as<T: Any + Send + Sync>(&mut self, id: &str) -> Result<Arc<T>> {
        self.get(id)?
            .downcast::<T>()
            .map_err(|_| Error::TypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Store a definition, replacing any previous one and its cached instance.
    pub fn set(&mut self, id: impl Into<String>, definition: Definition) -> &mut Self {
        let id = id.into();
        tracing::debug!(id = %id, kind = ?definition.kind(), "set");
        if self.instances.remove(&id).is_some() {
            tracing::debug!(id = %id, "dropped cached instance on overwrite");
        }
        self.entries.insert(id, definition);
        self
    }

    /// Store a plain value.
    pub fn set_value<T: Any + Send + Sync>(
        &mut self,
        id: impl Into<String>,
        value: T,
    ) -> &mut Self {
        self.set(id, Definition::plain(value))
    }

    /// Remove a definition and its cached instance. The definition is not
    /// resolved; its tag lives on the entry itself.
    pub fn delete(&mut self, id: &str) -> &mut Self {
        if self.entries.shift_remove(id).is_some() {
            tracing::debug!(id, "deleted");
            self.instances.remove(id);
        }
        self
    }

    /// Drop the cached instance for `id`, keeping its definition.
    pub fn delete_instance(&mut self, id: &str) -> &mut Self {
        self.instances.remove(id);
        self
    }

    pub fn delete_all_instances(&mut self) -> &mut Self {
        self.instances.clear();
        self
    }

    /// Clear all entries and cached instances.
    pub fn reset(&mut self) -> &mut Self {
        tracing::debug!(entries = self.entries.len(), "reset");
        self.entries.clear();
        self.instances.clear();
        self
    }

    pub fn kind(&self, id: &str) -> Option<Kind> {
        self.entries.get(id).and_then(Definition::kind)
    }

    /// Whether a service instance is currently cached for `id`.
    pub fn is_resolved(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    /// Wrap the definition for `id` so that `transform` receives the original
    /// result. The new definition keeps the original tag, so an extended
    /// service is still resolved once and the transform runs once per
    /// resolution.
    pub fn extend<F>(&mut self, id: &str, transform: F) -> Result<Definition>
    where
        F: Fn(Value, &mut Registry) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let definition = self.raw_get(id)?;
        let (kind, original) = match (definition.kind(), definition.resolver()) {
            (Some(kind), Some(resolver)) => (kind, resolver.clone()),
            _ => return Err(Error::Container { id: id.to_string() }),
        };

        let extended: Resolver = Arc::new(move |registry: &mut Registry| {
            let value = original(registry)?;
            transform(value, registry)
        });
        let definition = Definition::with_kind(kind, extended);

        tracing::debug!(id, %kind, "extended");
        self.set(id, definition.clone());
        Ok(definition)
    }

    /// Registered identifiers in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazily resolve every entry in insertion order.
    ///
    /// The key list is captured when the iterator is created. If a resolver
    /// deletes a later key while iterating, that key yields `NotFound`.
    pub fn iter(&mut self) -> Iter<'_> {
        let keys = self.keys().into_iter();
        Iter {
            registry: self,
            keys,
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut instances: Vec<_> = self.instances.keys().collect();
        instances.sort();
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .field("instances", &instances)
            .finish()
    }
}

/// Iterator over `(identifier, resolved value)` pairs.
pub struct Iter<'a> {
    registry: &'a mut Registry,
    keys: std::vec::IntoIter<String>,
}

impl Iterator for Iter<'_> {
    type Item = Result<(String, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.keys.next()?;
        Some(self.registry.get(&id).map(|value| (id, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a mut Registry {
    type Item = Result<(String, Value)>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
