//! Error types for store operations
//!
//! Every remote-store invocation resolves to an explicit `Result`; nothing
//! is allowed to surface as an uncaught fault past the store boundary.

/// Store operation errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A point-in-time read or subscription attach was rejected
    #[error("read failed at {path}: {reason}")]
    Read {
        /// Path the read targeted
        path: String,
        /// Rejection reason reported by the backend
        reason: String,
    },

    /// A write or remove was rejected
    #[error("write failed at {path}: {reason}")]
    Write {
        /// Path the write targeted
        path: String,
        /// Rejection reason reported by the backend
        reason: String,
    },

    /// A path string could not be parsed
    #[error("invalid path {path:?}: {reason}")]
    PathSyntax {
        /// The offending path string
        path: String,
        /// What was wrong with it
        reason: String,
    },
}

impl StoreError {
    /// Create a read error for a path
    #[inline]
    pub fn read(path: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::Read {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a write error for a path
    #[inline]
    pub fn write(path: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::Write {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
