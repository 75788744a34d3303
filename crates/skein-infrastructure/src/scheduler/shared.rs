//! Shared scheduler handle
//!
//! Lets the scheduler live in the container as a singleton so feature modules
//! can submit deferred entries through it.

use skein_domain::error::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ProcessReport, RegistrationScheduler};
use crate::di::Instance;

/// Mutex-wrapped [`RegistrationScheduler`] over type-erased instances
#[derive(Debug, Default)]
pub struct SharedScheduler {
    inner: Mutex<RegistrationScheduler<Instance>>,
}

impl SharedScheduler {
    /// Create an empty shared scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`RegistrationScheduler::submit`]
    pub fn submit<F, I, S>(&self, component: &str, key: &str, factory: F, depends_on: I)
    where
        F: FnOnce() -> Result<Instance> + Send + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().submit(component, key, factory, depends_on);
    }

    /// See [`RegistrationScheduler::mark_registered`]
    pub fn mark_registered(&self, component: &str) {
        self.lock().mark_registered(component);
    }

    /// See [`RegistrationScheduler::record`]
    pub fn record(&self, component: &str, key: &str, value: Instance) {
        self.lock().record(component, key, value);
    }

    /// Whether `component` appears in the ledger
    pub fn is_registered(&self, component: &str) -> bool {
        self.lock().is_registered(component)
    }

    /// Keys recorded under `component`, in order
    pub fn registered_keys(&self, component: &str) -> Vec<String> {
        self.lock()
            .registrations(component)
            .map(|entries| entries.iter().map(|e| e.key.clone()).collect())
            .unwrap_or_default()
    }

    /// Registered component names, in first-registration order
    pub fn components(&self) -> Vec<String> {
        self.lock().ledger().components().map(str::to_string).collect()
    }

    /// Number of entries still waiting
    pub fn pending_count(&self) -> usize {
        self.lock().pending_count()
    }

    /// See [`RegistrationScheduler::process_all`]
    ///
    /// The lock is held for the whole drain; factories must not call back
    /// into this handle.
    pub fn process_all(&self) -> ProcessReport {
        self.lock().process_all()
    }

    /// Run `f` with exclusive access to the underlying scheduler
    pub fn with<R>(&self, f: impl FnOnce(&mut RegistrationScheduler<Instance>) -> R) -> R {
        f(&mut self.lock())
    }

    // A factory that panicked mid-drain leaves the scheduler usable; keep going.
    fn lock(&self) -> MutexGuard<'_, RegistrationScheduler<Instance>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
