//! Feature module selection

use serde::{Deserialize, Serialize};
use skein_domain::ports::ModuleSource;

/// Which feature modules the catalog registers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Enabled module names
    pub enabled: Vec<String>,
}

impl ModuleSource for ModulesConfig {
    fn enabled_modules(&self) -> Vec<String> {
        self.enabled.clone()
    }
}
