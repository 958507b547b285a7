//! Error types for the record store abstraction.

use std::fmt;

/// Errors a record store can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The collection name does not resolve in this store.
    #[error("Unknown collection: {collection}")]
    UnknownCollection {
        /// The name that failed to resolve.
        collection: String,
    },

    /// The backend rejected a structured filter.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Why the filter was rejected.
        message: String,
    },

    /// The query did not complete in time.
    #[error("Query timed out: {message}")]
    Timeout {
        /// Description of the timeout.
        message: String,
    },

    /// Failed to reach the backend.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Any other backend failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `UnknownCollection` error.
    #[must_use]
    pub fn unknown_collection(collection: impl Into<String>) -> Self {
        Self::UnknownCollection {
            collection: collection.into(),
        }
    }

    /// Creates a new `InvalidFilter` error.
    #[must_use]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an unknown collection error.
    #[must_use]
    pub fn is_unknown_collection(&self) -> bool {
        matches!(self, Self::UnknownCollection { .. })
    }

    /// Returns the error category for logging.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownCollection { .. } => ErrorCategory::NotFound,
            Self::InvalidFilter { .. } => ErrorCategory::Validation,
            Self::Timeout { .. } | Self::Connection { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of store errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Collection not found.
    NotFound,
    /// Rejected input.
    Validation,
    /// Timeout or connectivity failure.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
