//! Registration Scheduler
//!
//! Defers registrations that must wait for other components. Components submit
//! entries naming the components they depend on; once every component has
//! finished its direct registration, [`RegistrationScheduler::process_all`]
//! materializes entries in rounds:
//!
//! ```text
//! pending ──▶ pass: deps ⊆ ledger (as of pass start)?
//!               │ yes: run factory, ledger[component] += entry
//!               │ no:  keep pending
//!               ▼
//!         progress? ── yes ──▶ next round
//!               │
//!               no ──▶ abandon the rest (reported, not fatal)
//! ```
//!
//! Readiness is judged against the ledger as it stood when the pass began, so
//! each round materializes one layer of the dependency DAG regardless of
//! submission order. Cycles are not detected as such; their members end up in
//! the abandoned set alongside entries whose dependency never registers.

pub mod ledger;
pub mod report;
pub mod shared;

pub use ledger::{ComponentLedger, LedgerEntry};
pub use report::{AbandonedEntry, FailedEntry, MaterializedEntry, ProcessReport};
pub use shared::SharedScheduler;

use skein_domain::error::Result;
use std::fmt;
use tracing::{debug, info, warn};

/// Factory invoked once when a pending entry materializes
pub type EntryFactory<T> = Box<dyn FnOnce() -> Result<T> + Send>;

/// A registration waiting on other components
pub struct PendingEntry<T> {
    component: String,
    key: String,
    factory: EntryFactory<T>,
    depends_on: Vec<String>,
}

impl<T> PendingEntry<T> {
    /// Owning component
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Target key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Components this entry waits for
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    fn missing(&self, ledger: &ComponentLedger<T>) -> Vec<String> {
        self.depends_on
            .iter()
            .filter(|dep| !ledger.contains(dep))
            .cloned()
            .collect()
    }
}

impl<T> fmt::Debug for PendingEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEntry")
            .field("component", &self.component)
            .field("key", &self.key)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// Dependency-ordered deferred registration
///
/// Single-threaded: submissions and the drain happen during initialization.
/// Wrap it in [`SharedScheduler`] to hand it to several components.
pub struct RegistrationScheduler<T> {
    pending: Vec<PendingEntry<T>>,
    ledger: ComponentLedger<T>,
}

impl<T> Default for RegistrationScheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            ledger: ComponentLedger::new(),
        }
    }
}

impl<T> RegistrationScheduler<T> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an entry for `component` that waits on `depends_on`
    pub fn submit<F, I, S>(&mut self, component: &str, key: &str, factory: F, depends_on: I)
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let depends_on: Vec<String> = depends_on.into_iter().map(Into::into).collect();
        debug!(component, key, ?depends_on, "Deferred registration submitted");
        self.pending.push(PendingEntry {
            component: component.to_string(),
            key: key.to_string(),
            factory: Box::new(factory),
            depends_on,
        });
    }

    /// Note that `component` finished its direct registration
    pub fn mark_registered(&mut self, component: &str) {
        self.ledger.mark(component);
    }

    /// Record a direct registration made by `component`
    pub fn record(&mut self, component: &str, key: &str, value: T) {
        self.ledger.record(component, key, value);
    }

    /// Whether `component` appears in the ledger
    pub fn is_registered(&self, component: &str) -> bool {
        self.ledger.contains(component)
    }

    /// Entries materialized or recorded under `component`
    pub fn registrations(&self, component: &str) -> Option<&[LedgerEntry<T>]> {
        self.ledger.entries(component)
    }

    /// The ledger
    pub fn ledger(&self) -> &ComponentLedger<T> {
        &self.ledger
    }

    /// Entries still waiting
    pub fn pending(&self) -> &[PendingEntry<T>] {
        &self.pending
    }

    /// Number of entries still waiting
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Materialize every entry whose dependencies are satisfied, in rounds
    ///
    /// Returns once nothing is pending or a pass makes no progress; whatever
    /// is left then is abandoned and reported. Never fails as a whole.
    pub fn process_all(&mut self) -> ProcessReport {
        let mut report = ProcessReport::default();
        let mut pending = std::mem::take(&mut self.pending);

        while !pending.is_empty() {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|entry| entry.missing(&self.ledger).is_empty());
            pending = waiting;

            if ready.is_empty() {
                break;
            }

            report.rounds += 1;
            let round = report.rounds;
            debug!(round, ready = ready.len(), waiting = pending.len(), "Processing registration round");

            for entry in ready {
                self.materialize(entry, round, &mut report);
            }
        }

        for entry in pending {
            let missing = entry.missing(&self.ledger);
            warn!(
                component = %entry.component,
                key = %entry.key,
                ?missing,
                "Abandoning deferred registration: dependencies never registered"
            );
            report.abandoned.push(AbandonedEntry {
                component: entry.component,
                key: entry.key,
                missing,
            });
        }

        info!(
            rounds = report.rounds,
            materialized = report.materialized.len(),
            abandoned = report.abandoned.len(),
            failed = report.failed.len(),
            "Deferred registrations processed"
        );
        report
    }

    fn materialize(&mut self, entry: PendingEntry<T>, round: usize, report: &mut ProcessReport) {
        let PendingEntry {
            component,
            key,
            factory,
            ..
        } = entry;

        match factory() {
            Ok(value) => {
                debug!(component = %component, key = %key, round, "Materialized deferred registration");
                self.ledger.record(&component, key.clone(), value);
                report.materialized.push(MaterializedEntry {
                    component,
                    key,
                    round,
                });
            }
            Err(e) => {
                warn!(component = %component, key = %key, error = %e, "Deferred registration failed");
                report.failed.push(FailedEntry {
                    component,
                    key,
                    error: e.to_string(),
                });
            }
        }
    }
}

impl<T> fmt::Debug for RegistrationScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationScheduler")
            .field("pending", &self.pending)
            .field("components", &self.ledger.components().collect::<Vec<_>>())
            .finish()
    }
}
