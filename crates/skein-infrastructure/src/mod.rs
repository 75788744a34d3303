//! # Infrastructure Layer
//!
//! The composition core and the ambient services around it.
//!
//! ### Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Service container, descriptors, instance cache, catalog |
//! | [`scheduler`] | Dependency-ordered deferred registration |
//!
//! ### Configuration & Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML + environment configuration via figment |
//! | [`logging`] | Structured logging with tracing |
//! | [`constants`] | Centralized configuration constants |
//! | [`error_ext`] | Context helpers for foreign errors |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod logging;
pub mod scheduler;

// Re-export commonly used types
pub use di::{Injectable, InjectionPlan, ServiceCatalog, ServiceContainer};
pub use error_ext::ErrorContext;
pub use scheduler::{ProcessReport, RegistrationScheduler, SharedScheduler};
