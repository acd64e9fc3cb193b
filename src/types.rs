//! Core type definitions shared across the crate.

use serde::Serialize;
use std::any::Any;
use std::sync::Arc;

use crate::registry::Registry;

/// A resolved value. Identity is the shared allocation.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Deferred computation that receives the registry it is resolved from.
pub type Resolver = Arc<dyn Fn(&mut Registry) -> anyhow::Result<Value> + Send + Sync>;

/// Tag carried by callable definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// New result on every resolution
    Factory,
    /// Resolved once per identifier, then memoized
    Service,
    /// Re-evaluated on every resolution, never cached
    Computed,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Factory => f.write_str("factory"),
            Kind::Service => f.write_str("service"),
            Kind::Computed => f.write_str("computed"),
        }
    }
}

/// Definition stored for an identifier.
///
/// Plain values resolve as themselves. Every other variant wraps a
/// [`Resolver`] and is tagged by the variant, so resolution is a single
/// match and no side table of callable identities is needed.
#[derive(Clone)]
pub enum Definition {
    Plain(Value),
    Factory(Resolver),
    Service(Resolver),
    Computed(Resolver),
}

impl Definition {
    /// Wrap any value as a plain definition.
    pub fn plain<T: Any + Send + Sync>(value: T) -> Self {
        Self::Plain(Arc::new(value))
    }

    /// Wrap an already shared value as a plain definition.
    pub fn from_value(value: Value) -> Self {
        Self::Plain(value)
    }

    /// Classify a callable as a factory.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&mut Registry) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(f))
    }

    /// Classify a callable as a service.
    pub fn service<F>(f: F) -> Self
    where
        F: Fn(&mut Registry) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::Service(Arc::new(f))
    }

    /// Classify a callable as a computed value.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&mut Registry) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Rebuild a tagged definition around a new resolver.
    pub(crate) fn with_kind(kind: Kind, resolver: Resolver) -> Self {
        match kind {
            Kind::Factory => Self::Factory(resolver),
            Kind::Service => Self::Service(resolver),
            Kind::Computed => Self::Computed(resolver),
        }
    }

    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Plain(_) => None,
            Self::Factory(_) => Some(Kind::Factory),
            Self::Service(_) => Some(Kind::Service),
            Self::Computed(_) => Some(Kind::Computed),
        }
    }

    pub fn resolver(&self) -> Option<&Resolver> {
        match self {
            Self::Plain(_) => None,
            Self::Factory(r) | Self::Service(r) | Self::Computed(r) => Some(r),
        }
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(value) => match value.downcast_ref::<serde_json::Value>() {
                Some(json) => f.debug_tuple("Plain").field(json).finish(),
                None => f.debug_tuple("Plain").field(&"<opaque>").finish(),
            },
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Service(_) => f.write_str("Service(..)"),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
