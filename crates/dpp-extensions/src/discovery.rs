//! Discovery of capabilities by name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::capability::{Capability, CapabilityKind, Extension, Protocol};

/// Loads a capability implementation for `(kind, name)`.
///
/// Returns `Ok(None)` when nothing provides the name; `Err` is reserved for
/// a broken discovery backend.
#[async_trait]
pub trait Discover: Send + Sync {
    async fn discover(&self, kind: CapabilityKind, name: &str) -> Result<Option<Capability>>;
}

type Factory = Box<dyn Fn() -> Capability + Send + Sync>;

/// Catalog of capability factories registered up front.
///
/// Each discovery builds a fresh instance from the factory registered for
/// the requested kind and name.
#[derive(Default)]
pub struct FactoryLoader {
    factories: HashMap<(CapabilityKind, String), Factory>,
}

impl FactoryLoader {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension factory under `name`. Replaces any previous
    /// factory of the same name.
    pub fn register_extension<F, E>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> E + Send + Sync + 'static,
        E: Extension + 'static,
    {
        self.factories.insert(
            (CapabilityKind::Extension, name.into()),
            Box::new(move || Capability::Extension(Arc::new(factory()))),
        );
    }

    /// Register a protocol factory under `name`.
    pub fn register_protocol<F, P>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Protocol + 'static,
    {
        self.factories.insert(
            (CapabilityKind::Protocol, name.into()),
            Box::new(move || Capability::Protocol(Arc::new(factory()))),
        );
    }

    /// Names registered for `kind` (sorted).
    pub fn known(&self, kind: CapabilityKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        self.factories.contains_key(&(kind, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[async_trait]
impl Discover for FactoryLoader {
    async fn discover(&self, kind: CapabilityKind, name: &str) -> Result<Option<Capability>> {
        let capability = self
            .factories
            .get(&(kind, name.to_string()))
            .map(|factory| factory());
        tracing::debug!(%kind, name, found = capability.is_some(), "factory discovery");
        Ok(capability)
    }
}
