//! Error taxonomy for the migration engine
//!
//! Collaborator errors (`RemoteError`, `DirectoryError`) are recoverable at
//! sibling granularity and never escape a single resource. Only
//! `MigrationError` aborts a run.

use thiserror::Error;

/// Failure reported by the remote resource API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, TLS, timeout)
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// The API answered with a non-success status
    #[error("Remote API returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The requested resource does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// The response payload could not be decoded
    #[error("Decode error: {message}")]
    Decode {
        /// Error message describing the decoding failure
        message: String,
    },
}

impl RemoteError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Failure reported by the directory service.
///
/// An unknown identity is not an error; lookups return `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Transport-level failure
    #[error("Directory network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// The directory answered with an unexpected status
    #[error("Directory returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The directory payload could not be decoded
    #[error("Directory decode error: {message}")]
    Decode {
        /// Error message describing the decoding failure
        message: String,
    },
}

impl DirectoryError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Invalid static configuration, detected before traversal starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No usable fallback administrator address
    #[error("fallback administrator address is missing or blank")]
    MissingFallback,

    /// The explicitly targeted organization id is malformed
    #[error("invalid target organization id {id:?}: {reason}")]
    InvalidTarget {
        /// The rejected id
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// Any other invalid setting
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Error message describing the invalid setting
        message: String,
    },
}

impl ConfigError {
    /// Create a generic invalid-configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Identity resolution produced an unusable address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Every resolution step ended with a blank address
    #[error("bad mail info provided for {oid}")]
    BlankAddress {
        /// Identity that could not be given an address
        oid: String,
    },
}

/// Failure writing the audit report
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying writer failed
    #[error("audit report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record arrived after the report was closed
    #[error("audit report already closed")]
    Closed,
}

/// Fatal conditions that abort a migration run
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Configuration rejected before traversal
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Organizations could not be listed, or the targeted one fetched
    #[error("cannot enumerate organizations: {0}")]
    RootListing(#[source] RemoteError),

    /// The audit report could not be written
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Standard Result type for migration runs
pub type Result<T> = std::result::Result<T, MigrationError>;
