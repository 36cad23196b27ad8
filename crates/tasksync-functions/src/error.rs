//! Error types for the lifecycle side

use tasksync_store::StoreError;

/// Lifecycle and cleanup faults
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Paged identity enumeration was rejected
    #[error("identity enumeration failed: {0}")]
    Enumeration(String),

    /// One identity could not be deleted
    #[error("deletion of account {uid} failed: {reason}")]
    Deletion {
        /// The identity that survived
        uid: String,
        /// Provider-reported reason
        reason: String,
    },

    /// A namespaced store operation failed
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// The bounded work pool itself faulted (not an item failure)
    #[error("cleanup pool fault: {0}")]
    Pool(String),
}

/// Configuration errors for the functions binary
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// An environment variable did not parse
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
