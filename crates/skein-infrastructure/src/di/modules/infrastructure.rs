//! Core infrastructure services
//!
//! Registered before any feature module, under the ledger component `core`.

use skein_domain::constants::{CORE_COMPONENT, DEFAULT_QUALIFIER};
use skein_domain::error::Result;
use std::sync::Arc;
use tracing::debug;

use super::traits::RegistrationContext;
use crate::config::AppConfig;
use crate::scheduler::SharedScheduler;

/// Names of the modules the catalog registered, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledModules(Vec<String>);

impl EnabledModules {
    /// Wrap a list of module names
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Module names
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Whether `name` was registered
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|m| m == name)
    }
}

/// The always-present infrastructure set
pub struct CoreInfrastructure {
    config: Arc<AppConfig>,
    scheduler: Arc<SharedScheduler>,
}

impl CoreInfrastructure {
    /// Core set around the catalog's config and scheduler
    pub fn new(config: Arc<AppConfig>, scheduler: Arc<SharedScheduler>) -> Self {
        Self { config, scheduler }
    }

    /// Register config and scheduler, then mark `core` in the ledger
    pub fn register(&self, ctx: &RegistrationContext<'_>) -> Result<()> {
        ctx.container
            .register_instance::<AppConfig>(Arc::clone(&self.config), DEFAULT_QUALIFIER)?;
        ctx.container
            .register_instance::<SharedScheduler>(Arc::clone(&self.scheduler), DEFAULT_QUALIFIER)?;
        ctx.scheduler.mark_registered(CORE_COMPONENT);
        debug!("Registered core infrastructure services");
        Ok(())
    }

    /// Register the list of modules that ended up enabled
    pub fn register_enabled(&self, ctx: &RegistrationContext<'_>, names: Vec<String>) -> Result<()> {
        ctx.container
            .register_instance::<EnabledModules>(Arc::new(EnabledModules::new(names)), DEFAULT_QUALIFIER)
    }
}
