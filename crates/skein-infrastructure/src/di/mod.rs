//! Dependency Injection System
//!
//! A container with three lifetimes and declarative wiring, plus the catalog
//! that fills it at startup.
//!
//! ## Architecture Overview
//!
//! ```text
//! ServiceCatalog (registration façade, one-time init, shutdown)
//! └── ServiceContainer
//!     ├── DescriptorStore   key → ServiceDescriptor
//!     ├── InstanceCache     singletons + per-module-scope tables
//!     └── Resolver          per-call guard chain, injection
//! ```
//!
//! ## Key Principles
//!
//! - **Declarative wiring**: `Injectable::injection_plan` lists constructor
//!   parameters and fields up front; nothing is discovered at runtime
//! - **Trait-object keys**: services are resolved as `Arc<dyn Trait>` or `Arc<T>`
//! - **At most one construction** per (scope, key), even under racing resolvers
//! - **Explicit context**: the catalog or container is passed around; there is
//!   no global accessor

pub mod cache;
pub mod catalog;
pub mod container;
pub mod descriptor;
pub mod modules;
pub mod store;

pub use cache::InstanceCache;
pub use catalog::ServiceCatalog;
pub use container::{Resolver, ServiceContainer};
pub use descriptor::{
    Dependency, FieldInjection, Injectable, InjectedArgs, InjectedFields, InjectionPlan, Instance,
    Producer, ServiceDescriptor, TypeWiring, downcast, erase,
};
pub use modules::{CoreInfrastructure, EnabledModules, FeatureModule, RegistrationContext};
pub use store::DescriptorStore;
