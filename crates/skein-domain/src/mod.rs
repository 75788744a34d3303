//! # Domain Layer
//!
//! Types shared by every part of skein: the error enum, service identity and
//! lifetime value objects, and the ports through which collaborators feed the
//! composition core.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | `Error` enum and `Result` alias |
//! | [`value_objects`] | `ServiceKey`, `Scope`, `LifecycleState`, `ContainerStatistics` |
//! | [`ports`] | `ModuleSource` |
//! | [`constants`] | Default qualifier, core component name |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{ContainerStatistics, LifecycleState, Scope, ServiceKey};
