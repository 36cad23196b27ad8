//! Error types for the client core
//!
//! Propagation policy: every remote call resolves to an explicit
//! `Result` at the gateway boundary. Nothing throws past it.

use tasksync_store::StoreError;

/// Identity-provider rejections
///
/// Clonable so failures can be fanned out on the session event channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Sign-in rejected by the provider
    #[error("sign-in rejected: {message}")]
    SignIn {
        /// Provider error code, when one was given
        code: Option<String>,
        /// Human-readable provider message
        message: String,
    },

    /// Sign-out rejected by the provider
    #[error("sign-out rejected: {0}")]
    SignOut(String),
}

impl AuthError {
    /// Sign-in rejection without a provider code
    #[inline]
    pub fn sign_in(message: impl Into<String>) -> Self {
        Self::SignIn {
            code: None,
            message: message.into(),
        }
    }
}

/// Task Sync Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Operation attempted with no authenticated identity
    #[error("no active session")]
    NoActiveSession,

    /// Record to save carries no id
    #[error("task record has no id")]
    MissingTaskId,

    /// Remote read rejected
    #[error("store read failed: {0}")]
    StoreRead(#[source] StoreError),

    /// Remote write rejected
    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    /// Stored value did not decode as a task record
    #[error("task decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether the failure is the caller's precondition, not the store's
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NoActiveSession | Self::MissingTaskId)
    }
}
