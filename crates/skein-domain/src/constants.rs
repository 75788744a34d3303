//! Domain constants

/// Qualifier used when none is given; matches only itself
pub const DEFAULT_QUALIFIER: &str = "";

/// Ledger name under which the core infrastructure registers itself
pub const CORE_COMPONENT: &str = "core";
