//! Container diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-in-time counters describing a service container
///
/// Diagnostics only: the counts are read without a global lock and can be
/// stale by the time they are observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatistics {
    /// Number of registered descriptors
    pub descriptors: usize,
    /// Number of materialized singleton instances
    pub singletons: usize,
    /// Number of live module scopes
    pub module_scopes: usize,
    /// Number of constructions currently running
    pub in_flight: usize,
}

impl fmt::Display for ContainerStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "descriptors={}, singletons={}, module_scopes={}, in_flight={}",
            self.descriptors, self.singletons, self.module_scopes, self.in_flight
        )
    }
}
