//! Ports consumed from collaborators outside the composition core

pub mod modules;

pub use modules::ModuleSource;
