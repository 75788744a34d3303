//! Module Organization
//!
//! The catalog registers services in functional groups:
//!
//! ```text
//! ServiceCatalog::register_all
//! ├── CoreInfrastructure (always; ledger component "core")
//! │   ├── AppConfig
//! │   ├── EnabledModules
//! │   └── SharedScheduler
//! └── FeatureModule sets (known modules filtered by ModuleSource)
//!     ├── module "a" → its descriptors, ledger component "a"
//!     └── module "b" → ...
//! ```

/// Feature module trait and registration context
pub mod traits;

/// Core infrastructure services
pub mod infrastructure;

pub use infrastructure::{CoreInfrastructure, EnabledModules};
pub use traits::{FeatureModule, RegistrationContext};
