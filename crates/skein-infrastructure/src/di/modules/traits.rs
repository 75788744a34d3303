//! Feature module interface
//!
//! A feature module owns one set of service descriptors. The catalog calls
//! [`FeatureModule::register`] once, during its registration pass, for every
//! known module the [`ModuleSource`](skein_domain::ports::ModuleSource)
//! reports as enabled.

use skein_domain::error::Result;

use crate::di::container::ServiceContainer;
use crate::scheduler::SharedScheduler;

/// What a module receives while registering
pub struct RegistrationContext<'a> {
    /// Container to register descriptors into
    pub container: &'a ServiceContainer,
    /// Scheduler for registrations that must wait on other modules
    pub scheduler: &'a SharedScheduler,
}

/// A named set of service registrations
pub trait FeatureModule: Send + Sync {
    /// Module name, as reported by the module source and used in the ledger
    fn name(&self) -> &str;

    /// Register this module's descriptors and submit its deferred entries
    fn register(&self, ctx: &RegistrationContext<'_>) -> Result<()>;
}
