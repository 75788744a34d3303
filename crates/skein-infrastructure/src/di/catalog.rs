//! Service Catalog - registration orchestration and lookup façade
//!
//! Wraps one [`ServiceContainer`] and registers the known service set into it
//! exactly once:
//!
//! ```text
//! register_all(source)
//!   ├── CoreInfrastructure      AppConfig, SharedScheduler   ledger: "core"
//!   ├── FeatureModule "a"       if source enables "a"        ledger: "a"
//!   ├── FeatureModule "b"       ...
//!   └── EnabledModules          names actually registered
//!
//! components_ready()            drains the SharedScheduler
//! shutdown()                    clear_all(), state → ShutDown
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let catalog = ServiceCatalog::new(config)
//!     .with_module(WorldModule)
//!     .with_module(SpawningModule);
//! catalog.register_from_config()?;
//! let report = catalog.components_ready();
//! let spawner: Arc<dyn Spawner> = catalog.resolve()?;
//! ```

use skein_domain::constants::CORE_COMPONENT;
use skein_domain::error::Result;
use skein_domain::ports::ModuleSource;
use skein_domain::value_objects::{ContainerStatistics, LifecycleState, ServiceKey};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::di::container::ServiceContainer;
use crate::di::modules::{CoreInfrastructure, FeatureModule, RegistrationContext};
use crate::scheduler::{ProcessReport, SharedScheduler};

/// Registration façade over one container
pub struct ServiceCatalog {
    container: Arc<ServiceContainer>,
    config: Arc<AppConfig>,
    scheduler: Arc<SharedScheduler>,
    modules: Vec<Arc<dyn FeatureModule>>,
    initialized: AtomicBool,
    state: AtomicU8,
}

impl ServiceCatalog {
    /// Catalog over a fresh container
    pub fn new(config: AppConfig) -> Self {
        Self {
            container: Arc::new(ServiceContainer::new()),
            config: Arc::new(config),
            scheduler: Arc::new(SharedScheduler::new()),
            modules: Vec::new(),
            initialized: AtomicBool::new(false),
            state: AtomicU8::new(LifecycleState::Uninitialized.as_u8()),
        }
    }

    /// Use an existing container instead of a fresh one
    #[must_use]
    pub fn with_container(mut self, container: Arc<ServiceContainer>) -> Self {
        self.container = container;
        self
    }

    /// Add a known feature module; registration order follows insertion order
    #[must_use]
    pub fn with_module<M: FeatureModule + 'static>(mut self, module: M) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register the enabled modules listed in the catalog's own config
    pub fn register_from_config(&self) -> Result<()> {
        let modules = self.config.modules.clone();
        self.register_all(&modules)
    }

    /// Register core infrastructure, then every known module `source` enables
    ///
    /// Runs once. Later calls, and calls after [`shutdown`](Self::shutdown),
    /// log a warning and return `Ok(())` without touching the container.
    ///
    /// If a module fails, the error is returned and the catalog goes back to
    /// `Uninitialized` so the pass can be retried. Descriptors registered
    /// before the failure stay in the container and are replaced on retry.
    pub fn register_all(&self, source: &dyn ModuleSource) -> Result<()> {
        if self.state() == LifecycleState::ShutDown {
            warn!("Service catalog is shut down; ignoring registration request");
            return Ok(());
        }
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Service catalog already registered; ignoring repeated registration");
            return Ok(());
        }

        self.transition(LifecycleState::Registering);
        if let Err(e) = self.register_pass(source) {
            warn!(error = %e, "Service catalog registration failed; rolling back");
            self.transition(LifecycleState::Uninitialized);
            self.initialized.store(false, Ordering::Release);
            return Err(e);
        }
        self.transition(LifecycleState::Active);

        let stats = self.container.statistics();
        info!(
            descriptors = stats.descriptors,
            pending = self.scheduler.pending_count(),
            "Service catalog registration complete"
        );
        Ok(())
    }

    fn register_pass(&self, source: &dyn ModuleSource) -> Result<()> {
        let ctx = RegistrationContext {
            container: &self.container,
            scheduler: &self.scheduler,
        };

        info!("Registering core infrastructure services");
        let core = CoreInfrastructure::new(Arc::clone(&self.config), Arc::clone(&self.scheduler));
        core.register(&ctx)?;

        let enabled = source.enabled_modules();
        for name in &enabled {
            if !self.modules.iter().any(|m| m.name() == name) {
                warn!(module = %name, "Enabled module has no registered feature set");
            }
        }

        let mut registered = Vec::new();
        for module in &self.modules {
            let name = module.name();
            if !enabled.iter().any(|e| e == name) {
                debug!(module = name, "Feature module not enabled; skipping");
                continue;
            }
            info!(module = name, "Registering feature module services");
            module.register(&ctx)?;
            self.scheduler.mark_registered(name);
            registered.push(name.to_string());
        }

        core.register_enabled(&ctx, registered)
    }

    /// Signal that every component finished its direct registration
    ///
    /// Drains the shared scheduler; entries whose dependencies never
    /// registered come back in the report's abandoned list.
    pub fn components_ready(&self) -> ProcessReport {
        if self.state() != LifecycleState::Active {
            warn!(state = %self.state(), "Processing deferred registrations before catalog is active");
        }
        let report = self.scheduler.process_all();
        info!(%report, "Deferred registrations complete");
        report
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Whether a descriptor exists for `T`
    ///
    /// Pure existence check: never constructs an instance.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.container.contains::<T>()
    }

    /// Whether a descriptor exists for `key`
    pub fn is_registered_key(&self, key: &ServiceKey) -> bool {
        self.container.contains_key(key)
    }

    /// Resolve `T` with the default qualifier
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.container.resolve::<T>()
    }

    /// Resolve `T` under `qualifier`
    pub fn resolve_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: &str,
    ) -> Result<Arc<T>> {
        self.container.resolve_qualified::<T>(qualifier)
    }

    /// Resolve `T` inside module scope `module`
    pub fn resolve_in_scope<T: ?Sized + Send + Sync + 'static>(
        &self,
        module: &str,
    ) -> Result<Arc<T>> {
        self.container.resolve_in_scope::<T>(module)
    }

    /// Drop the instances cached for `module`
    pub fn clear_module_scope(&self, module: &str) -> bool {
        self.container.clear_module_scope(module)
    }

    /// Container diagnostics
    pub fn statistics(&self) -> ContainerStatistics {
        self.container.statistics()
    }

    /// The wrapped container
    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    /// The shared registration scheduler
    pub fn scheduler(&self) -> &Arc<SharedScheduler> {
        &self.scheduler
    }

    /// Configuration this catalog was built with
    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    /// Names of the known feature modules
    pub fn known_modules(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the one-time registration pass has run
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Clear every cached instance and reset the one-time-init flag
    ///
    /// The catalog ends in `ShutDown`, which is terminal; build a new catalog
    /// to register again. The flag is reset only so
    /// [`is_initialized`](Self::is_initialized) reports `false`.
    pub fn shutdown(&self) {
        if self.state() == LifecycleState::ShutDown {
            debug!("Service catalog already shut down");
            return;
        }
        self.container.clear_all();
        self.initialized.store(false, Ordering::Release);
        self.transition(LifecycleState::ShutDown);
        info!(
            core_registered = self.scheduler.is_registered(CORE_COMPONENT),
            "Service catalog shut down"
        );
    }

    fn transition(&self, next: LifecycleState) {
        let previous = LifecycleState::from_u8(self.state.swap(next.as_u8(), Ordering::AcqRel));
        if !previous.can_transition_to(next) {
            warn!(from = %previous, to = %next, "Unexpected catalog lifecycle transition");
        }
        debug!(from = %previous, to = %next, "Catalog lifecycle transition");
    }
}
