use std::any::Any;
use std::fmt;

use crate::errors::RegistryResult;
use crate::registry::types::{BoxedDecorator, BoxedProvider, FnDecorator, FnProvider};
use crate::registry::{Decorator, Provider, Registry};
use crate::types::{instance, Instance};

/// **CONFIGURATION BATCH**
///
/// **PURPOSE**: One unit of registration passed to `Registry::configure`.
/// **GUARANTEE**: Entries of each section are applied in insertion order.
///
/// ```rust
/// use vessel::api::*;
///
/// let config = RegistryConfig::new()
///     .with_service("Greeting", String::from("hello"))
///     .with_provider_fn("Message", |registry| {
///         let greeting = registry.get_as::<String>("Greeting")?;
///         Ok(instance(format!("{greeting}, world")))
///     })
///     .with_alias("Msg", "Message");
///
/// let registry = Registry::with_config(config).unwrap();
/// assert_eq!(*registry.get_as::<String>("Msg").unwrap(), "hello, world");
/// ```
#[derive(Default)]
pub struct RegistryConfig {
    pub(crate) services: Vec<(String, Instance)>,
    pub(crate) providers: Vec<(String, BoxedProvider)>,
    pub(crate) decorators: Vec<(String, Vec<BoxedDecorator>)>,
    pub(crate) aliases: Vec<(String, String)>,
    pub(crate) shared: Vec<(String, bool)>,
    pub(crate) shared_by_default: Option<bool>,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service<T>(self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.with_instance(key, instance(value))
    }

    pub fn with_instance(mut self, key: impl Into<String>, value: Instance) -> Self {
        self.services.push((key.into(), value));
        self
    }

    pub fn with_provider<P>(mut self, key: impl Into<String>, provider: P) -> Self
    where
        P: Provider + 'static,
    {
        self.providers.push((key.into(), Box::new(provider)));
        self
    }

    pub fn with_provider_fn<F>(self, key: impl Into<String>, build: F) -> Self
    where
        F: Fn(&Registry) -> RegistryResult<Instance> + 'static,
    {
        self.with_provider(key, FnProvider::new(build))
    }

    /// Appends to the decorators already queued for `key` in this batch.
    pub fn with_decorator<D>(mut self, key: impl Into<String>, decorator: D) -> Self
    where
        D: Decorator + 'static,
    {
        let key = key.into();
        let decorator: BoxedDecorator = Box::new(decorator);

        match self.decorators.iter_mut().find(|(queued, _)| *queued == key) {
            Some((_, chain)) => chain.push(decorator),
            None => self.decorators.push((key, vec![decorator])),
        }
        self
    }

    pub fn with_decorator_fn<F>(self, key: impl Into<String>, decorate: F) -> Self
    where
        F: Fn(&Registry, &str, &dyn Fn() -> RegistryResult<Instance>) -> RegistryResult<Instance>
            + 'static,
    {
        self.with_decorator(key, FnDecorator::new(decorate))
    }

    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    pub fn with_shared(mut self, key: impl Into<String>, flag: bool) -> Self {
        self.shared.push((key.into(), flag));
        self
    }

    pub fn with_shared_by_default(mut self, flag: bool) -> Self {
        self.shared_by_default = Some(flag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.providers.is_empty()
            && self.decorators.is_empty()
            && self.aliases.is_empty()
            && self.shared.is_empty()
            && self.shared_by_default.is_none()
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("services", &self.services.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("providers", &self.providers.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("decorators", &self.decorators.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .field("shared", &self.shared)
            .field("shared_by_default", &self.shared_by_default)
            .finish()
    }
}
