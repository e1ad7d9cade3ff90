//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the orchestration core
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Generic error from external sources
    #[error("Generic error: {0}")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Resource not found
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found (entity kind + id)
        resource: String,
    },

    /// A work item, dependency, or sync record failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the violated constraint
        message: String,
    },

    /// A hierarchy operation would violate the single-parent or depth-cap invariant
    #[error("Hierarchy violation: {message}")]
    HierarchyViolation {
        /// Description of the violated hierarchy invariant
        message: String,
    },

    /// A dependency graph operation encountered or would introduce a cycle
    #[error("Cycle detected: {message}")]
    Cycle {
        /// Description of the cycle (participating work item ids)
        message: String,
    },

    /// A sync or write operation conflicted with concurrent state
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state
        message: String,
    },

    /// A markdown/frontmatter file could not be parsed
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parse failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation exceeded its configured timeout
    #[error("Timeout: {message}")]
    Timeout {
        /// Description of the operation that timed out
        message: String,
    },

    /// A Store-layer I/O or persistence operation failed
    #[error("Store error: {message}")]
    StoreIo {
        /// Description of the store failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding provider operation error
    #[error("Embedding provider error: {message}")]
    Embedding {
        /// Description of the embedding provider error
        message: String,
    },

    /// Internal system error — a bug, not a user-facing failure mode
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into().into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
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
}

// Validation / hierarchy / graph error creation methods
impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a hierarchy violation error
    pub fn hierarchy_violation<S: Into<String>>(message: S) -> Self {
        Self::HierarchyViolation {
            message: message.into(),
        }
    }

    /// Create a cycle-detected error
    pub fn cycle<S: Into<String>>(message: S) -> Self {
        Self::Cycle {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

// Parse / timeout error creation methods
impl Error {
    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error with source
    pub fn parse_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }
}

// Store error creation methods
impl Error {
    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::StoreIo {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source
    pub fn store_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::StoreIo {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Embedding / internal error creation methods
impl Error {
    /// Create an embedding provider error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Error {
    /// Stable machine-readable error code for the `code` field of tool
    /// responses (spec §7). Matches the variant name, snake_case.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoSimple { .. } | Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Generic(_) => "generic_error",
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
            Self::HierarchyViolation { .. } => "hierarchy_violation",
            Self::Cycle { .. } => "cycle",
            Self::Conflict { .. } => "conflict",
            Self::Parse { .. } => "parse",
            Self::Timeout { .. } => "timeout",
            Self::StoreIo { .. } => "store_io",
            Self::Config { .. } => "config",
            Self::Embedding { .. } => "embedding",
            Self::Internal { .. } => "internal",
        }
    }
}

// Note: OS-specific and external crate error conversions are excluded for domain purity.
// The infrastructure layer is responsible for these conversions.
