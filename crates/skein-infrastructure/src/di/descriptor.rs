//! Service Descriptors and Injection Wiring
//!
//! A descriptor records, for one service key, how an instance is produced and
//! at what lifetime. Constructor and field injection is declared up front
//! through [`Injectable::injection_plan`] instead of being discovered at
//! runtime:
//!
//! ```ignore
//! struct SpawnService {
//!     world: Arc<dyn WorldAccess>,
//!     metrics: Option<Arc<Metrics>>,
//! }
//!
//! impl Injectable for SpawnService {
//!     fn injection_plan() -> InjectionPlan {
//!         InjectionPlan::new()
//!             .param::<dyn WorldAccess>()
//!             .optional_field::<Metrics>("metrics")
//!     }
//!
//!     fn construct(args: &mut InjectedArgs) -> Result<Self> {
//!         Ok(Self { world: args.next_arg()?, metrics: None })
//!     }
//!
//!     fn inject(&mut self, fields: &mut InjectedFields) -> Result<()> {
//!         self.metrics = fields.take("metrics")?;
//!         Ok(())
//!     }
//! }
//! ```

use skein_domain::constants::DEFAULT_QUALIFIER;
use skein_domain::error::{Error, Result};
use skein_domain::value_objects::{Scope, ServiceKey};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::container::Resolver;

/// Type-erased service instance
///
/// Always holds an `Arc<T>` for the service type `T` of its key, so trait
/// object services survive the erasure.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased factory stored on a descriptor
pub type FactoryFn = Arc<dyn Fn(&mut Resolver<'_>) -> Result<Instance> + Send + Sync>;

/// Erase a typed service handle into an [`Instance`]
pub fn erase<T: ?Sized + Send + Sync + 'static>(service: Arc<T>) -> Instance {
    Arc::new(service)
}

/// Recover the typed handle from an [`Instance`]
pub fn downcast<T: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Result<Arc<T>> {
    instance.downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
        Error::internal(format!(
            "stored instance is not an Arc<{}>",
            std::any::type_name::<T>()
        ))
    })
}

// ============================================================================
// Injection plan
// ============================================================================

/// One declared dependency: a service key plus the qualifier to resolve it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Service key to resolve
    pub key: ServiceKey,
    /// Qualifier passed to the resolve call
    pub qualifier: String,
}

impl Dependency {
    /// Dependency on `T` with the default qualifier
    pub fn on<T: ?Sized + 'static>() -> Self {
        Self::qualified::<T>(DEFAULT_QUALIFIER)
    }

    /// Dependency on `T` with an explicit qualifier
    pub fn qualified<T: ?Sized + 'static>(qualifier: &str) -> Self {
        Self {
            key: ServiceKey::of::<T>(),
            qualifier: qualifier.to_string(),
        }
    }
}

/// An injectable field: resolved after construction and handed to
/// [`Injectable::inject`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInjection {
    /// Field name used to look the value up in [`InjectedFields`]
    pub name: &'static str,
    /// What to resolve
    pub dependency: Dependency,
    /// Whether a failed resolution fails the whole construction
    pub required: bool,
}

/// Declarative constructor and field wiring for one implementation type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionPlan {
    params: Vec<Dependency>,
    fields: Vec<FieldInjection>,
}

impl InjectionPlan {
    /// Empty plan (no-argument constructor, no fields)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constructor parameter of type `T`
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(Dependency::on::<T>());
        self
    }

    /// Append a qualified constructor parameter of type `T`
    pub fn param_qualified<T: ?Sized + 'static>(mut self, qualifier: &str) -> Self {
        self.params.push(Dependency::qualified::<T>(qualifier));
        self
    }

    /// Declare a required field of type `T`
    pub fn field<T: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.push_field(name, Dependency::on::<T>(), true)
    }

    /// Declare an optional field of type `T`
    pub fn optional_field<T: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.push_field(name, Dependency::on::<T>(), false)
    }

    /// Declare a field with an explicit qualifier and requirement flag
    pub fn field_qualified<T: ?Sized + 'static>(
        self,
        name: &'static str,
        qualifier: &str,
        required: bool,
    ) -> Self {
        self.push_field(name, Dependency::qualified::<T>(qualifier), required)
    }

    fn push_field(mut self, name: &'static str, dependency: Dependency, required: bool) -> Self {
        self.fields.push(FieldInjection {
            name,
            dependency,
            required,
        });
        self
    }

    /// Constructor parameters, in declaration order
    pub fn params(&self) -> &[Dependency] {
        &self.params
    }

    /// Injectable fields, in declaration order
    pub fn fields(&self) -> &[FieldInjection] {
        &self.fields
    }
}

/// Resolved constructor arguments, consumed positionally
pub struct InjectedArgs {
    values: std::vec::IntoIter<(ServiceKey, Instance)>,
}

impl InjectedArgs {
    pub(crate) fn new(values: Vec<(ServiceKey, Instance)>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Take the next constructor argument
    pub fn next_arg<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        let (key, instance) = self.values.next().ok_or_else(|| {
            Error::internal(format!(
                "no constructor argument left for {}",
                std::any::type_name::<T>()
            ))
        })?;
        if key != ServiceKey::of::<T>() {
            return Err(Error::internal(format!(
                "constructor argument order mismatch: expected {}, declared {}",
                std::any::type_name::<T>(),
                key
            )));
        }
        downcast::<T>(&instance)
    }

    /// Number of arguments not yet taken
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Resolved field values, looked up by field name
///
/// Optional fields whose resolution failed are absent.
#[derive(Default)]
pub struct InjectedFields {
    values: HashMap<&'static str, Instance>,
}

impl InjectedFields {
    pub(crate) fn insert(&mut self, name: &'static str, instance: Instance) {
        self.values.insert(name, instance);
    }

    /// Take the value for `name`; `Ok(None)` when it was left unset
    pub fn take<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        name: &str,
    ) -> Result<Option<Arc<T>>> {
        self.values
            .remove(name)
            .map(|instance| downcast::<T>(&instance))
            .transpose()
    }

    /// Take a required field value
    pub fn require<T: ?Sized + Send + Sync + 'static>(&mut self, name: &str) -> Result<Arc<T>> {
        self.take::<T>(name)?
            .ok_or_else(|| Error::internal(format!("field '{name}' was not injected")))
    }

    /// Whether a value was injected for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// A type the container can build from its declared wiring
///
/// [`Injectable::construct`] is the single injection-point constructor;
/// types without dependencies can instead be registered through
/// `register_default`, which uses `Default::default` as the no-argument
/// constructor.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameters and injectable fields
    fn injection_plan() -> InjectionPlan {
        InjectionPlan::new()
    }

    /// Build the instance from resolved constructor arguments
    fn construct(args: &mut InjectedArgs) -> Result<Self>;

    /// Assign injected fields after construction
    fn inject(&mut self, _fields: &mut InjectedFields) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Producers
// ============================================================================

/// Implementation-type wiring erased over its concrete and interface types
pub trait TypeWiring: Send + Sync {
    /// Name of the implementation type
    fn implementation(&self) -> &'static str;

    /// Declared wiring
    fn plan(&self) -> &InjectionPlan;

    /// Build an instance: resolve parameters, construct, inject fields
    fn build(&self, service: &ServiceKey, resolver: &mut Resolver<'_>) -> Result<Instance>;
}

/// Wiring for implementation `I` exposed under interface `K`
pub(crate) struct InjectableWiring<K: ?Sized, I> {
    plan: InjectionPlan,
    upcast: fn(Arc<I>) -> Arc<K>,
    _marker: PhantomData<fn() -> I>,
}

impl<K, I> InjectableWiring<K, I>
where
    K: ?Sized + Send + Sync + 'static,
    I: Injectable,
{
    pub(crate) fn new(upcast: fn(Arc<I>) -> Arc<K>) -> Self {
        Self {
            plan: I::injection_plan(),
            upcast,
            _marker: PhantomData,
        }
    }
}

impl<K, I> TypeWiring for InjectableWiring<K, I>
where
    K: ?Sized + Send + Sync + 'static,
    I: Injectable,
{
    fn implementation(&self) -> &'static str {
        std::any::type_name::<I>()
    }

    fn plan(&self) -> &InjectionPlan {
        &self.plan
    }

    fn build(&self, service: &ServiceKey, resolver: &mut Resolver<'_>) -> Result<Instance> {
        let mut args = resolver.resolve_params(self.plan.params())?;
        let mut value = I::construct(&mut args)
            .map_err(|e| Error::construction_with_source(service.name(), e))?;
        let mut fields = resolver.resolve_fields(service, self.plan.fields())?;
        value
            .inject(&mut fields)
            .map_err(|e| Error::construction_with_source(service.name(), e))?;
        Ok(erase((self.upcast)(Arc::new(value))))
    }
}

/// How a descriptor produces instances
#[derive(Clone)]
pub enum Producer {
    /// Build an implementation type from its declared wiring
    Type(Arc<dyn TypeWiring>),
    /// Invoke a factory function
    Factory(FactoryFn),
    /// Hand out a pre-built instance
    Instance(Instance),
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(wiring) => f.debug_tuple("Type").field(&wiring.implementation()).finish(),
            Self::Factory(_) => f.write_str("Factory"),
            Self::Instance(_) => f.write_str("Instance"),
        }
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// How to produce one service and at what lifetime
///
/// Immutable once built; the store replaces whole descriptors.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    key: ServiceKey,
    producer: Producer,
    scope: Scope,
    qualifier: String,
}

impl ServiceDescriptor {
    /// Descriptor backed by implementation-type wiring
    pub fn from_type(
        key: ServiceKey,
        wiring: Arc<dyn TypeWiring>,
        scope: Scope,
        qualifier: &str,
    ) -> Self {
        Self::new(key, Producer::Type(wiring), scope, qualifier)
    }

    /// Descriptor backed by a factory
    pub fn from_factory(key: ServiceKey, factory: FactoryFn, scope: Scope, qualifier: &str) -> Self {
        Self::new(key, Producer::Factory(factory), scope, qualifier)
    }

    /// Singleton descriptor backed by an existing instance
    pub fn from_instance(key: ServiceKey, instance: Instance, qualifier: &str) -> Self {
        Self::new(key, Producer::Instance(instance), Scope::Singleton, qualifier)
    }

    fn new(key: ServiceKey, producer: Producer, scope: Scope, qualifier: &str) -> Self {
        Self {
            key,
            producer,
            scope,
            qualifier: qualifier.to_string(),
        }
    }

    /// Service key
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    /// Producer
    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Lifetime
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Qualifier
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Dependencies declared by type wiring; empty for factories and instances
    pub fn dependencies(&self) -> Vec<Dependency> {
        match &self.producer {
            Producer::Type(wiring) => wiring
                .plan()
                .params()
                .iter()
                .cloned()
                .chain(wiring.plan().fields().iter().map(|f| f.dependency.clone()))
                .collect(),
            Producer::Factory(_) | Producer::Instance(_) => Vec::new(),
        }
    }
}
