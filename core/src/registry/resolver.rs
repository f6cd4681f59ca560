use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::config::{DeclarativeConfig, RegistryConfig};
use crate::errors::{RegistryError, RegistryResult};
use crate::registry::aliases::AliasTable;
use crate::registry::types::{BoxedDecorator, BoxedProvider, Decorator, Provider};
use crate::types::{downcast_instance, Instance};

type Thunk<'a> = Box<dyn Fn() -> RegistryResult<Instance> + 'a>;

/// **DEPENDENCY REGISTRY**
///
/// **PURPOSE**: Keyed store of services, providers, decorators and aliases.
/// **GUARANTEE**: Shared entries are built at most once per key and returned
/// by identity afterwards.
///
/// Registration takes `&mut self`; retrieval takes `&self` so providers and
/// decorators can re-enter the registry while an entry is being built. Only
/// the instance store is interior-mutable, which makes the registry `!Sync`.
pub struct Registry {
    services: RefCell<HashMap<String, Instance>>,
    providers: HashMap<String, BoxedProvider>,
    decorators: HashMap<String, Vec<BoxedDecorator>>,
    aliases: AliasTable,
    shared: HashMap<String, bool>,
    shared_by_default: bool,
    configured: bool,
}

impl Registry {
    /// **CONSTRUCTOR** - Empty registry, entries shared by default
    pub fn new() -> Self {
        Self {
            configured: true,
            ..Self::unconfigured()
        }
    }

    /// **CONSTRUCTOR WITH INITIAL BATCH**
    pub fn with_config(config: RegistryConfig) -> RegistryResult<Self> {
        let mut registry = Self::unconfigured();
        registry.configure(config)?;
        Ok(registry)
    }

    /// **CONSTRUCTOR FROM JSON DOCUMENT** - See [`DeclarativeConfig`]
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        Self::with_config(DeclarativeConfig::from_json_str(json)?.into_config())
    }

    fn unconfigured() -> Self {
        Self {
            services: RefCell::new(HashMap::new()),
            providers: HashMap::new(),
            decorators: HashMap::new(),
            aliases: AliasTable::default(),
            shared: HashMap::new(),
            shared_by_default: true,
            configured: false,
        }
    }

    /// **APPLY A CONFIGURATION BATCH**
    ///
    /// Sections run in the order services, providers, decorators, aliases,
    /// shared flags, default flag. A failure stops the batch where it
    /// occurred; entries applied before it stay applied.
    pub fn configure(&mut self, config: RegistryConfig) -> RegistryResult<()> {
        let RegistryConfig {
            services,
            providers,
            decorators,
            aliases,
            shared,
            shared_by_default,
        } = config;

        for (key, value) in services {
            ensure_vacant(&self.services, &key)?;
            debug!("Registering service '{}'", key);
            self.services.get_mut().insert(key, value);
        }

        for (key, provider) in providers {
            ensure_vacant(&self.services, &key)?;
            debug!("Registering provider '{}'", key);
            self.providers.insert(key, provider);
        }

        for (key, chain) in decorators {
            debug!("Appending {} decorator(s) to '{}'", chain.len(), key);
            self.decorators.entry(key).or_default().extend(chain);
        }

        if !aliases.is_empty() {
            debug!("Registering {} alias(es)", aliases.len());
            let services = &self.services;
            self.aliases
                .configure(&aliases, !self.configured, |alias| ensure_vacant(services, alias))?;
        }

        for (key, flag) in shared {
            self.shared.insert(key, flag);
        }

        if let Some(flag) = shared_by_default {
            self.shared_by_default = flag;
        }

        self.configured = true;
        Ok(())
    }

    /// **APPLY A JSON DOCUMENT** - Layered on top of the current state
    pub fn configure_json(&mut self, json: &str) -> RegistryResult<()> {
        self.configure(DeclarativeConfig::from_json_str(json)?.into_config())
    }

    /// **RETRIEVE AN ENTRY**
    ///
    /// **RETURNS**:
    /// - `Ok(Instance)` - Stored instance, or one built by the provider of the
    ///   resolved key and wrapped by its decorators
    /// - `Err(NotFound)` - Carrying the resolved key, not the requested one
    pub fn get(&self, requested_key: &str) -> RegistryResult<Instance> {
        if let Some(found) = self.cached(requested_key) {
            return Ok(found);
        }

        let key = self.aliases.resolve(requested_key);
        let is_alias = key != requested_key;
        let is_key_shared = self.is_shared(key);
        let is_requested_key_shared = self.is_shared(requested_key);

        if is_alias {
            if let Some(found) = self.cached(key) {
                // A non-shared alias still gets a fresh build when it can have one.
                if is_requested_key_shared || !self.providers.contains_key(key) {
                    if is_requested_key_shared {
                        self.store(requested_key, found.clone());
                    }
                    return Ok(found);
                }
            }
        }

        let provider = self
            .providers
            .get(key)
            .ok_or_else(|| RegistryError::not_found(key))?;

        let instance = self.build(key, provider.as_ref())?;

        if is_key_shared {
            self.store_vacant(key, &instance);
        }

        if is_alias && is_requested_key_shared {
            self.store(requested_key, instance.clone());
        }

        Ok(instance)
    }

    /// **TYPED RETRIEVAL** - `get` followed by a downcast to `T`
    pub fn get_as<T>(&self, key: &str) -> RegistryResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        downcast_instance(key, self.get(key)?)
    }

    /// Whether `key` resolves to a stored instance or a provider. Never builds.
    pub fn has(&self, key: &str) -> bool {
        let key = self.aliases.resolve(key);
        self.services.borrow().contains_key(key) || self.providers.contains_key(key)
    }

    /// **FACTORY** - Callable equivalent to `get(key)` on this registry
    pub fn factory(&self, key: &str) -> impl Fn() -> RegistryResult<Instance> + '_ {
        let key = key.to_string();
        move || self.get(&key)
    }

    /// Terminal key `key` currently resolves to.
    pub fn resolve_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.resolve(key)
    }

    /// Target `alias` was registered with, before resolution.
    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases.target(alias)
    }

    /// Effective sharing flag for `key`, falling back to the registry default.
    pub fn is_shared(&self, key: &str) -> bool {
        self.shared
            .get(key)
            .copied()
            .unwrap_or(self.shared_by_default)
    }

    pub fn service<T>(&mut self, key: impl Into<String>, value: T) -> RegistryResult<()>
    where
        T: Any + Send + Sync,
    {
        self.configure(RegistryConfig::new().with_service(key, value))
    }

    /// Registers an already-erased instance, keeping its identity.
    pub fn instance(&mut self, key: impl Into<String>, value: Instance) -> RegistryResult<()> {
        self.configure(RegistryConfig::new().with_instance(key, value))
    }

    pub fn provider<P>(&mut self, key: impl Into<String>, provider: P) -> RegistryResult<()>
    where
        P: Provider + 'static,
    {
        self.configure(RegistryConfig::new().with_provider(key, provider))
    }

    /// Registers a closure through the default provider adapter.
    pub fn provider_fn<F>(&mut self, key: impl Into<String>, build: F) -> RegistryResult<()>
    where
        F: Fn(&Registry) -> RegistryResult<Instance> + 'static,
    {
        self.configure(RegistryConfig::new().with_provider_fn(key, build))
    }

    pub fn decorator<D>(&mut self, key: impl Into<String>, decorator: D) -> RegistryResult<()>
    where
        D: Decorator + 'static,
    {
        self.configure(RegistryConfig::new().with_decorator(key, decorator))
    }

    /// Appends a closure through the default decorator adapter.
    pub fn decorator_fn<F>(&mut self, key: impl Into<String>, decorate: F) -> RegistryResult<()>
    where
        F: Fn(&Registry, &str, &dyn Fn() -> RegistryResult<Instance>) -> RegistryResult<Instance>
            + 'static,
    {
        self.configure(RegistryConfig::new().with_decorator_fn(key, decorate))
    }

    /// **DEFINE AN ALIAS**
    ///
    /// The target does not need to exist yet; it is looked up at `get`/`has`
    /// time.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) -> RegistryResult<()> {
        self.configure(RegistryConfig::new().with_alias(alias, target))
    }

    /// Sets the caching behaviour of `key` alone. Setting it on an alias does
    /// not touch the key the alias resolves to.
    pub fn set_shared(&mut self, key: impl Into<String>, flag: bool) -> RegistryResult<()> {
        self.configure(RegistryConfig::new().with_shared(key, flag))
    }

    pub fn shared_by_default(&self) -> bool {
        self.shared_by_default
    }

    pub fn set_shared_by_default(&mut self, flag: bool) {
        self.shared_by_default = flag;
    }

    fn cached(&self, key: &str) -> Option<Instance> {
        self.services.borrow().get(key).cloned()
    }

    fn store(&self, key: &str, instance: Instance) {
        trace!("Caching instance under '{}'", key);
        self.services.borrow_mut().insert(key.to_string(), instance);
    }

    /// Caches `instance` unless `key` already holds one.
    fn store_vacant(&self, key: &str, instance: &Instance) {
        self.services
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| {
                trace!("Caching instance under '{}'", key);
                instance.clone()
            });
    }

    /// Provider call wrapped by every decorator of `key`, the last registered
    /// outermost.
    fn build(&self, key: &str, provider: &dyn Provider) -> RegistryResult<Instance> {
        let base: Thunk<'_> = Box::new(move || provider.build(self));

        let create = self
            .decorators
            .get(key)
            .into_iter()
            .flatten()
            .fold(base, |inner, decorator| {
                let wrapped: Thunk<'_> =
                    Box::new(move || decorator.decorate(self, key, &*inner));
                wrapped
            });

        create()
    }
}

fn ensure_vacant(services: &RefCell<HashMap<String, Instance>>, key: &str) -> RegistryResult<()> {
    if services.borrow().contains_key(key) {
        return Err(RegistryError::already_exists(key));
    }
    Ok(())
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut services: Vec<String> = self.services.borrow().keys().cloned().collect();
        services.sort_unstable();
        let mut providers: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        providers.sort_unstable();
        let mut aliases: Vec<&str> = self.aliases.keys().collect();
        aliases.sort_unstable();

        f.debug_struct("Registry")
            .field("services", &services)
            .field("providers", &providers)
            .field("aliases", &aliases)
            .field("shared_by_default", &self.shared_by_default)
            .finish_non_exhaustive()
    }
}
