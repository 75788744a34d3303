//! Component Ledger
//!
//! Records which components have registered and what each one materialized,
//! in order. Doubles as the dependency oracle for the scheduler: a component
//! counts as registered once its name is a ledger key, even with no entries.

use std::collections::HashMap;

/// One materialized registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry<T> {
    /// Identity of the registered target
    pub key: String,
    /// Value produced by the entry's factory
    pub value: T,
}

/// Component name → materialized entries, in first-registration order
#[derive(Debug, Clone)]
pub struct ComponentLedger<T> {
    components: Vec<(String, Vec<LedgerEntry<T>>)>,
    index: HashMap<String, usize>,
}

impl<T> Default for ComponentLedger<T> {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> ComponentLedger<T> {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `component` as registered without recording an entry
    pub fn mark(&mut self, component: &str) {
        self.slot(component);
    }

    /// Append an entry under `component`
    pub fn record(&mut self, component: &str, key: impl Into<String>, value: T) {
        let key = key.into();
        self.slot(component).push(LedgerEntry { key, value });
    }

    /// Whether `component` has registered
    pub fn contains(&self, component: &str) -> bool {
        self.index.contains_key(component)
    }

    /// Entries recorded under `component`
    pub fn entries(&self, component: &str) -> Option<&[LedgerEntry<T>]> {
        self.index
            .get(component)
            .map(|&i| self.components[i].1.as_slice())
    }

    /// Registered component names, in first-registration order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(component, entries)` in first-registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LedgerEntry<T>])> {
        self.components
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component has registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn slot(&mut self, component: &str) -> &mut Vec<LedgerEntry<T>> {
        let i = match self.index.get(component) {
            Some(&i) => i,
            None => {
                self.components.push((component.to_string(), Vec::new()));
                let i = self.components.len() - 1;
                self.index.insert(component.to_string(), i);
                i
            }
        };
        &mut self.components[i].1
    }
}
