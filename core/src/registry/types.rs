use std::fmt;

use crate::errors::RegistryResult;
use crate::registry::Registry;
use crate::types::Instance;

/// **PROVIDER CAPABILITY**
///
/// **PURPOSE**: Builds the instance for a key on demand.
/// **GUARANTEE**: May call back into `registry` to pull its own dependencies.
pub trait Provider {
    fn build(&self, registry: &Registry) -> RegistryResult<Instance>;
}

/// **DECORATOR CAPABILITY**
///
/// **PURPOSE**: Post-processes the instance produced by `create`.
///
/// `key` is the resolved key the decorator was registered under. Calling
/// `create` runs the inner part of the chain; a decorator may skip it,
/// call it once, or call it more than once.
pub trait Decorator {
    fn decorate(
        &self,
        registry: &Registry,
        key: &str,
        create: &dyn Fn() -> RegistryResult<Instance>,
    ) -> RegistryResult<Instance>;
}

/// Default provider adapter lifting a closure into [`Provider`].
pub struct FnProvider<F>(F);

impl<F> FnProvider<F>
where
    F: Fn(&Registry) -> RegistryResult<Instance>,
{
    pub fn new(build: F) -> Self {
        Self(build)
    }
}

impl<F> Provider for FnProvider<F>
where
    F: Fn(&Registry) -> RegistryResult<Instance>,
{
    fn build(&self, registry: &Registry) -> RegistryResult<Instance> {
        (self.0)(registry)
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnProvider")
    }
}

/// Default decorator adapter lifting a closure into [`Decorator`].
pub struct FnDecorator<F>(F);

impl<F> FnDecorator<F>
where
    F: Fn(&Registry, &str, &dyn Fn() -> RegistryResult<Instance>) -> RegistryResult<Instance>,
{
    pub fn new(decorate: F) -> Self {
        Self(decorate)
    }
}

impl<F> Decorator for FnDecorator<F>
where
    F: Fn(&Registry, &str, &dyn Fn() -> RegistryResult<Instance>) -> RegistryResult<Instance>,
{
    fn decorate(
        &self,
        registry: &Registry,
        key: &str,
        create: &dyn Fn() -> RegistryResult<Instance>,
    ) -> RegistryResult<Instance> {
        (self.0)(registry, key, create)
    }
}

impl<F> fmt::Debug for FnDecorator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDecorator")
    }
}

pub(crate) type BoxedProvider = Box<dyn Provider>;
pub(crate) type BoxedDecorator = Box<dyn Decorator>;
