//! Module enumeration port

/// Enumerates the feature modules enabled for this process
///
/// Implemented by the outer module-loading system; the catalog only registers
/// feature modules whose names appear here.
pub trait ModuleSource: Send + Sync {
    /// Names of the enabled modules, in load order
    fn enabled_modules(&self) -> Vec<String>;

    /// Whether `name` is enabled
    fn is_enabled(&self, name: &str) -> bool {
        self.enabled_modules().iter().any(|m| m == name)
    }
}

impl ModuleSource for Vec<String> {
    fn enabled_modules(&self) -> Vec<String> {
        self.clone()
    }
}

impl<const N: usize> ModuleSource for [&'static str; N] {
    fn enabled_modules(&self) -> Vec<String> {
        self.iter().map(|s| (*s).to_string()).collect()
    }
}
