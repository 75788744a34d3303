//! Outcome of a scheduler drain

use serde::Serialize;
use std::fmt;

/// An entry that was materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializedEntry {
    /// Owning component
    pub component: String,
    /// Target key
    pub key: String,
    /// Round it was materialized in, starting at 1
    pub round: usize,
}

/// An entry dropped because its dependencies never registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedEntry {
    /// Owning component
    pub component: String,
    /// Target key
    pub key: String,
    /// Dependency names still missing from the ledger
    pub missing: Vec<String>,
}

/// An entry whose factory returned an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    /// Owning component
    pub component: String,
    /// Target key
    pub key: String,
    /// Rendered error
    pub error: String,
}

/// Result of [`RegistrationScheduler::process_all`](super::RegistrationScheduler::process_all)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// Passes that materialized at least one entry
    pub rounds: usize,
    /// Materialized entries in materialization order
    pub materialized: Vec<MaterializedEntry>,
    /// Entries left unresolved when a pass made no progress
    pub abandoned: Vec<AbandonedEntry>,
    /// Entries whose factory failed
    pub failed: Vec<FailedEntry>,
}

impl ProcessReport {
    /// True when every submitted entry materialized
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty() && self.failed.is_empty()
    }

    /// Keys of materialized entries, in order
    pub fn materialized_keys(&self) -> Vec<&str> {
        self.materialized.iter().map(|e| e.key.as_str()).collect()
    }
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} materialized in {} round(s), {} abandoned, {} failed",
            self.materialized.len(),
            self.rounds,
            self.abandoned.len(),
            self.failed.len()
        )
    }
}
