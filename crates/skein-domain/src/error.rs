//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for skein
#[derive(Error, Debug)]
pub enum Error {
    /// No descriptor is registered for the requested service
    #[error("Service not registered: {service}")]
    NotRegistered {
        /// Name of the requested service
        service: String,
    },

    /// A descriptor exists but under a different qualifier
    #[error(
        "Qualifier mismatch for {service}: requested '{requested}', registered '{registered}'"
    )]
    QualifierMismatch {
        /// Name of the requested service
        service: String,
        /// Qualifier the caller asked for
        requested: String,
        /// Qualifier stored on the descriptor
        registered: String,
    },

    /// The service is already being constructed further up the resolution chain
    #[error("Circular dependency detected while constructing {service}: {}", chain.join(" -> "))]
    CircularDependency {
        /// Name of the service that re-entered construction
        service: String,
        /// Resolution chain, outermost first, ending with the re-entered service
        chain: Vec<String>,
    },

    /// A module-scoped service was resolved without a module scope
    #[error("Module scope required to resolve {service}")]
    MissingScope {
        /// Name of the requested service
        service: String,
    },

    /// A factory or constructor failed, or a required field could not be injected
    #[error("Failed to construct {service}: {message}")]
    ConstructionFailure {
        /// Name of the service being constructed
        service: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Container error creation methods
impl Error {
    /// Create a not registered error
    pub fn not_registered<S: Into<String>>(service: S) -> Self {
        Self::NotRegistered {
            service: service.into(),
        }
    }

    /// Create a qualifier mismatch error
    pub fn qualifier_mismatch<S, R, G>(service: S, requested: R, registered: G) -> Self
    where
        S: Into<String>,
        R: Into<String>,
        G: Into<String>,
    {
        Self::QualifierMismatch {
            service: service.into(),
            requested: requested.into(),
            registered: registered.into(),
        }
    }

    /// Create a circular dependency error
    pub fn circular_dependency<S: Into<String>>(service: S, chain: Vec<String>) -> Self {
        Self::CircularDependency {
            service: service.into(),
            chain,
        }
    }

    /// Create a missing scope error
    pub fn missing_scope<S: Into<String>>(service: S) -> Self {
        Self::MissingScope {
            service: service.into(),
        }
    }

    /// Create a construction failure without an underlying cause
    pub fn construction<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ConstructionFailure {
            service: service.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a construction failure wrapping the underlying cause
    pub fn construction_with_source<S, E>(service: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConstructionFailure {
            service: service.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration and internal error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// Classification helpers
impl Error {
    /// True for `NotRegistered`
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::NotRegistered { .. })
    }

    /// True for `CircularDependency`
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    /// True for errors raised by the container itself while resolving
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::NotRegistered { .. }
                | Self::QualifierMismatch { .. }
                | Self::CircularDependency { .. }
                | Self::MissingScope { .. }
                | Self::ConstructionFailure { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Internal { message: s }
    }
}
