//! Value objects shared across the container, catalog and scheduler

pub mod lifecycle;
pub mod service;
pub mod statistics;

pub use lifecycle::LifecycleState;
pub use service::{Scope, ServiceKey};
pub use statistics::ContainerStatistics;
