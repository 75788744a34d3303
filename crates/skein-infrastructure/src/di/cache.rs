//! Instance Cache
//!
//! Memoizes singleton and module-scoped instances. Each (scope, key) pair owns
//! one `OnceCell`; map locks are only held long enough to fetch or insert the
//! cell, and construction runs through `OnceCell::get_or_try_init` outside
//! them. Racing resolvers of the same pair block on the cell and observe the
//! single instance; unrelated keys never wait on each other.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use skein_domain::value_objects::ServiceKey;
use std::sync::Arc;

use super::descriptor::Instance;

/// Memoizing slot for one (scope, key) pair
pub type InstanceCell = Arc<OnceCell<Instance>>;

type ScopeTable = DashMap<ServiceKey, InstanceCell>;

/// Singleton table plus one nested table per module scope
#[derive(Default)]
pub struct InstanceCache {
    singletons: ScopeTable,
    module_scopes: DashMap<String, Arc<ScopeTable>>,
}

impl InstanceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell for the singleton `key`, created empty on first use
    pub fn singleton_cell(&self, key: &ServiceKey) -> InstanceCell {
        cell_in(&self.singletons, key)
    }

    /// Put `instance` into the singleton table, replacing any cached one
    pub fn seed_singleton(&self, key: ServiceKey, instance: Instance) {
        self.singletons.insert(key, Arc::new(OnceCell::with_value(instance)));
    }

    /// Cell for `key` inside `module`, creating the module table on first use
    pub fn module_cell(&self, module: &str, key: &ServiceKey) -> InstanceCell {
        let table = self
            .module_scopes
            .entry(module.to_string())
            .or_default()
            .value()
            .clone();
        cell_in(&table, key)
    }

    /// Drop every instance cached for `module`; false if the scope did not exist
    pub fn clear_module_scope(&self, module: &str) -> bool {
        self.module_scopes.remove(module).is_some()
    }

    /// Drop every cached instance
    pub fn clear(&self) {
        self.singletons.clear();
        self.module_scopes.clear();
    }

    /// Number of materialized singletons
    pub fn singleton_count(&self) -> usize {
        self.singletons
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// Number of live module scopes
    pub fn module_scope_count(&self) -> usize {
        self.module_scopes.len()
    }

    /// Names of the live module scopes, sorted
    pub fn module_scope_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.module_scopes.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

fn cell_in(table: &ScopeTable, key: &ServiceKey) -> InstanceCell {
    if let Some(cell) = table.get(key) {
        return Arc::clone(cell.value());
    }
    Arc::clone(table.entry(*key).or_default().value())
}
