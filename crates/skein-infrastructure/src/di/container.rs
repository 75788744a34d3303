//! Service Container
//!
//! Descriptor lookup, lifetime dispatch, circular-dependency guarding and
//! constructor/field injection.
//!
//! ## Resolution
//!
//! ```text
//! resolve::<T>(qualifier, scope)
//!        │
//!        ▼
//! DescriptorStore ── none ──────────────▶ NotRegistered
//!        │ qualifier differs ───────────▶ QualifierMismatch
//!        ▼
//! Resolver (per call: guard chain + module scope)
//!        │ key already in chain ────────▶ CircularDependency
//!        ▼
//! Singleton ─────▶ InstanceCache::singleton_cell ─┐
//! ModuleScoped ──▶ InstanceCache::module_cell ────┤ OnceCell::get_or_try_init
//! Prototype ─────────────────────────────────────┴▶ construct
//! ```
//!
//! The construction guard lives in the [`Resolver`] created for each top-level
//! resolve call and is threaded through factories and nested resolutions, so
//! two threads racing on the same singleton wait on its cell rather than
//! reporting a cycle. Nested resolutions inherit the caller's module scope.
//!
//! A factory can also re-enter the container directly, through
//! [`Resolver::container`] or a captured `Arc<ServiceContainer>`, which starts
//! a fresh chain. A per-thread stack of keys under construction catches that
//! route before it reaches the same cell again.
//!
//! There is no timeout: a factory that blocks blocks every resolver waiting on
//! the same cell.

use skein_domain::constants::DEFAULT_QUALIFIER;
use skein_domain::error::{Error, Result};
use skein_domain::value_objects::{ContainerStatistics, Scope, ServiceKey};
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace, warn};

use super::cache::InstanceCache;
use super::descriptor::{
    Dependency, FactoryFn, FieldInjection, InjectableWiring, InjectedArgs, InjectedFields, Injectable,
    Instance, Producer, ServiceDescriptor, downcast, erase,
};
use super::store::DescriptorStore;

/// Dependency-injection container
///
/// Safe to share behind an `Arc`; every operation takes `&self`.
#[derive(Default)]
pub struct ServiceContainer {
    store: DescriptorStore,
    cache: InstanceCache,
    in_flight: AtomicUsize,
}

impl ServiceContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register implementation type `I` under its own key
    pub fn register_type<I: Injectable>(&self, scope: Scope, qualifier: &str) -> Result<()> {
        self.register_type_as::<I, I>(scope, qualifier, |service| service)
    }

    /// Register implementation type `I` under interface key `K`
    ///
    /// `upcast` converts the built `Arc<I>` into the interface handle, usually
    /// `|service| service` with the target type inferred.
    pub fn register_type_as<K, I>(
        &self,
        scope: Scope,
        qualifier: &str,
        upcast: fn(Arc<I>) -> Arc<K>,
    ) -> Result<()>
    where
        K: ?Sized + Send + Sync + 'static,
        I: Injectable,
    {
        let wiring = Arc::new(InjectableWiring::<K, I>::new(upcast));
        self.register_descriptor(ServiceDescriptor::from_type(
            ServiceKey::of::<K>(),
            wiring,
            scope,
            qualifier,
        ))
    }

    /// Register `T` built through its no-argument constructor
    pub fn register_default<T>(&self, scope: Scope, qualifier: &str) -> Result<()>
    where
        T: Default + Send + Sync + 'static,
    {
        self.register_factory::<T, _>(scope, qualifier, |_| Ok(Arc::new(T::default())))
    }

    /// Register a factory for `T`
    pub fn register_factory<T, F>(&self, scope: Scope, qualifier: &str, factory: F) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.register_descriptor(ServiceDescriptor::from_factory(
            ServiceKey::of::<T>(),
            factory_fn(move |resolver| factory(resolver).map(erase)),
            scope,
            qualifier,
        ))
    }

    /// Register an existing instance as the singleton for `T`
    ///
    /// The singleton cache is seeded immediately.
    pub fn register_instance<T>(&self, instance: Arc<T>, qualifier: &str) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let instance = erase(instance);
        self.register_descriptor(ServiceDescriptor::from_instance(
            key,
            Arc::clone(&instance),
            qualifier,
        ))?;
        self.cache.seed_singleton(key, instance);
        Ok(())
    }

    /// Store a prepared descriptor, replacing any existing one for its key
    pub fn register_descriptor(&self, descriptor: ServiceDescriptor) -> Result<()> {
        debug!(
            service = %descriptor.key(),
            scope = %descriptor.scope(),
            qualifier = descriptor.qualifier(),
            producer = ?descriptor.producer(),
            "Registering service"
        );
        self.store.insert(descriptor);
        Ok(())
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve `T` with the default qualifier and no module scope
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.resolve_with::<T>(DEFAULT_QUALIFIER, None)
    }

    /// Resolve `T` under `qualifier`
    pub fn resolve_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &str,
    ) -> Result<Arc<T>> {
        self.resolve_with::<T>(qualifier, None)
    }

    /// Resolve `T` inside the module scope `module`
    pub fn resolve_in_scope<T: ?Sized + Send + Sync + 'static>(
        &self,
        module: &str,
    ) -> Result<Arc<T>> {
        self.resolve_with::<T>(DEFAULT_QUALIFIER, Some(module))
    }

    /// Resolve `T` with an explicit qualifier and optional module scope
    pub fn resolve_with<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &str,
        module_scope: Option<&str>,
    ) -> Result<Arc<T>> {
        let instance = self.resolve_key(&ServiceKey::of::<T>(), qualifier, module_scope)?;
        downcast::<T>(&instance)
    }

    /// Type-erased resolve
    pub fn resolve_key(
        &self,
        key: &ServiceKey,
        qualifier: &str,
        module_scope: Option<&str>,
    ) -> Result<Instance> {
        Resolver::new(self, module_scope).resolve_key(key, qualifier)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Whether a descriptor exists for `T`; never constructs anything
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.store.contains(&ServiceKey::of::<T>())
    }

    /// Whether a descriptor exists for `key`; never constructs anything
    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.store.contains(key)
    }

    /// Descriptor registered for `key`
    pub fn descriptor(&self, key: &ServiceKey) -> Option<Arc<ServiceDescriptor>> {
        self.store.get(key)
    }

    /// Registered keys, sorted by type name
    pub fn descriptor_keys(&self) -> Vec<ServiceKey> {
        self.store.keys()
    }

    /// Names of the live module scopes
    pub fn module_scopes(&self) -> Vec<String> {
        self.cache.module_scope_names()
    }

    /// Diagnostic counters; never use them for control flow
    pub fn statistics(&self) -> ContainerStatistics {
        ContainerStatistics {
            descriptors: self.store.len(),
            singletons: self.cache.singleton_count(),
            module_scopes: self.cache.module_scope_count(),
            in_flight: self.in_flight.load(Ordering::Acquire),
        }
    }

    // ========================================================================
    // Cache lifecycle
    // ========================================================================

    /// Drop the instances cached for `module`; descriptors stay
    pub fn clear_module_scope(&self, module: &str) -> bool {
        let cleared = self.cache.clear_module_scope(module);
        debug!(module, cleared, "Cleared module scope");
        cleared
    }

    /// Drop every cached instance; used at full shutdown
    ///
    /// Construction guards belong to in-progress resolve calls and disappear
    /// with them, so nothing else needs resetting.
    pub fn clear_all(&self) {
        let stats = self.statistics();
        self.cache.clear();
        debug!(
            singletons = stats.singletons,
            module_scopes = stats.module_scopes,
            "Cleared all cached instances"
        );
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolution context for one top-level resolve call
///
/// Carries the construction guard (the chain of keys being built) and the
/// active module scope. Factories receive it to resolve their own
/// dependencies.
pub struct Resolver<'c> {
    container: &'c ServiceContainer,
    chain: Vec<ServiceKey>,
    module_scope: Option<String>,
}

impl<'c> Resolver<'c> {
    fn new(container: &'c ServiceContainer, module_scope: Option<&str>) -> Self {
        Self {
            container,
            chain: Vec::new(),
            module_scope: module_scope.map(str::to_string),
        }
    }

    /// Container this resolver reads from
    pub fn container(&self) -> &'c ServiceContainer {
        self.container
    }

    /// Module scope of the enclosing resolve call
    pub fn module_scope(&self) -> Option<&str> {
        self.module_scope.as_deref()
    }

    /// Keys currently under construction, outermost first
    pub fn chain(&self) -> &[ServiceKey] {
        &self.chain
    }

    /// Resolve `T` with the default qualifier
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        self.resolve_qualified::<T>(DEFAULT_QUALIFIER)
    }

    /// Resolve `T` under `qualifier`
    pub fn resolve_qualified<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        qualifier: &str,
    ) -> Result<Arc<T>> {
        let instance = self.resolve_key(&ServiceKey::of::<T>(), qualifier)?;
        downcast::<T>(&instance)
    }

    /// Type-erased nested resolve
    pub fn resolve_key(&mut self, key: &ServiceKey, qualifier: &str) -> Result<Instance> {
        let descriptor = self
            .container
            .store
            .get(key)
            .ok_or_else(|| Error::not_registered(key.name()))?;

        if descriptor.qualifier() != qualifier {
            return Err(Error::qualifier_mismatch(
                key.name(),
                qualifier,
                descriptor.qualifier(),
            ));
        }

        if self.chain.contains(key) {
            let chain = self
                .chain
                .iter()
                .chain(std::iter::once(key))
                .map(|k| k.name().to_string())
                .collect();
            return Err(Error::circular_dependency(key.name(), chain));
        }

        let _constructing = ConstructionGuard::enter(self.container, *key)
            .map_err(|chain| Error::circular_dependency(key.name(), chain))?;

        self.chain.push(*key);
        let result = self.dispatch(&descriptor);
        self.chain.pop();
        result
    }

    fn dispatch(&mut self, descriptor: &ServiceDescriptor) -> Result<Instance> {
        let key = descriptor.key();
        match descriptor.scope() {
            Scope::Singleton => {
                let cell = self.container.cache.singleton_cell(key);
                if let Some(instance) = cell.get() {
                    trace!(service = %key, "Singleton cache hit");
                    return Ok(Arc::clone(instance));
                }
                cell.get_or_try_init(|| self.construct(descriptor))
                    .map(Arc::clone)
            }
            Scope::ModuleScoped => {
                let module = match self.module_scope.as_deref() {
                    Some(module) if !module.is_empty() => module.to_string(),
                    _ => return Err(Error::missing_scope(key.name())),
                };
                let cell = self.container.cache.module_cell(&module, key);
                cell.get_or_try_init(|| self.construct(descriptor))
                    .map(Arc::clone)
            }
            Scope::Prototype => self.construct(descriptor),
        }
    }

    fn construct(&mut self, descriptor: &ServiceDescriptor) -> Result<Instance> {
        let key = descriptor.key();
        let _in_flight = InFlight::enter(&self.container.in_flight);
        debug!(service = %key, scope = %descriptor.scope(), "Constructing service");

        match descriptor.producer() {
            Producer::Instance(instance) => Ok(Arc::clone(instance)),
            Producer::Factory(factory) => (**factory)(self).map_err(|e| wrap_failure(key, e)),
            Producer::Type(wiring) => wiring.build(key, self),
        }
    }

    /// Resolve declared constructor parameters, propagating the first failure
    pub(crate) fn resolve_params(&mut self, params: &[Dependency]) -> Result<InjectedArgs> {
        let mut values = Vec::with_capacity(params.len());
        for param in params {
            let instance = self.resolve_key(&param.key, &param.qualifier)?;
            values.push((param.key, instance));
        }
        Ok(InjectedArgs::new(values))
    }

    /// Resolve declared fields
    ///
    /// A failed required field fails the construction of `service`; a failed
    /// optional field is logged and left unset.
    pub(crate) fn resolve_fields(
        &mut self,
        service: &ServiceKey,
        fields: &[FieldInjection],
    ) -> Result<InjectedFields> {
        let mut injected = InjectedFields::default();
        for field in fields {
            match self.resolve_key(&field.dependency.key, &field.dependency.qualifier) {
                Ok(instance) => injected.insert(field.name, instance),
                Err(e) if field.required => return Err(wrap_failure(service, e)),
                Err(e) => {
                    warn!(
                        service = %service,
                        field = field.name,
                        dependency = %field.dependency.key,
                        error = %e,
                        "Optional field injection failed; leaving it unset"
                    );
                }
            }
        }
        Ok(injected)
    }
}

/// Erase a factory closure, pinning its higher-ranked signature
fn factory_fn<F>(factory: F) -> FactoryFn
where
    F: Fn(&mut Resolver<'_>) -> Result<Instance> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Wrap a failure raised while building `service`
///
/// Cycles surface unchanged so the caller always sees `CircularDependency`.
fn wrap_failure(service: &ServiceKey, error: Error) -> Error {
    if error.is_circular() {
        error
    } else {
        Error::construction_with_source(service.name(), error)
    }
}

thread_local! {
    /// Keys under construction on this thread, tagged with their container
    static CONSTRUCTING: RefCell<Vec<(usize, ServiceKey)>> = const { RefCell::new(Vec::new()) };
}

/// Marks `key` as under construction on the current thread
///
/// Guards nest, so dropping pops the entry pushed by `enter`.
struct ConstructionGuard;

impl ConstructionGuard {
    /// Push `key`, or return the re-entered chain if it is already being built
    fn enter(
        container: &ServiceContainer,
        key: ServiceKey,
    ) -> std::result::Result<Self, Vec<String>> {
        let owner = std::ptr::from_ref(container) as usize;
        CONSTRUCTING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|entry| *entry == (owner, key)) {
                let chain = stack
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, k)| k.name().to_string())
                    .chain(std::iter::once(key.name().to_string()))
                    .collect();
                return Err(chain);
            }
            stack.push((owner, key));
            Ok(Self)
        })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread exit
        let _ = CONSTRUCTING.try_with(|stack| stack.borrow_mut().pop());
    }
}

/// Counts a running construction for the lifetime of the guard
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
