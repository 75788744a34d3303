//! Configuration
//!
//! `AppConfig` and its sections, loaded by [`loader::ConfigLoader`] from
//! defaults, a TOML file and `SKEIN_`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
