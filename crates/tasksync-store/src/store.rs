//! The store contract
//!
//! Defines the asynchronous [`Store`] trait every backend implements:
//! - point-in-time reads of a subtree
//! - live subscriptions delivering one snapshot per committed change
//! - upsert writes, unique key generation, and subtree removal
//!
//! Absence is modeled as `None`, never as an error: reading a path that
//! holds no value is a normal outcome.

use crate::error::StoreError;
use crate::path::StorePath;
use serde_json::Value;
use tokio::sync::mpsc;

/// A point-in-time materialization of a subtree, `None` when absent
pub type Snapshot = Option<Value>;

/// Asynchronous hierarchical key-value store
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Read the subtree at `path` once
    ///
    /// # Errors
    /// `StoreError::Read` when the backend rejects the read. A missing
    /// value is `Ok(None)`, not an error.
    async fn read_once(&self, path: &StorePath) -> Result<Snapshot, StoreError>;

    /// Open a live subscription on `path`
    ///
    /// The current snapshot is delivered immediately, then one snapshot
    /// per committed change in commit order, until the handle is
    /// unsubscribed or dropped. Duplicate subscriptions on the same path
    /// are independent; nothing deduplicates them.
    ///
    /// # Errors
    /// `StoreError::Read` when the backend rejects the attach.
    async fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError>;

    /// Write `value` at `path`, replacing whatever was there
    ///
    /// Writing `Value::Null` is equivalent to [`Store::remove`].
    ///
    /// # Errors
    /// `StoreError::Write` when the backend rejects the write.
    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Generate a key unique within `parent` at time of assignment
    ///
    /// # Errors
    /// `StoreError::Write` when the backend cannot allocate a key.
    async fn generate_key(&self, parent: &StorePath) -> Result<String, StoreError>;

    /// Remove the entire subtree at `path`
    ///
    /// Removing an absent subtree is not an error (idempotent).
    ///
    /// # Errors
    /// `StoreError::Write` when the backend rejects the removal.
    async fn remove(&self, path: &StorePath) -> Result<(), StoreError>;
}

/// Handle on a live subscription
///
/// Owns the snapshot receiver and the cancellation for one subscribed
/// path. Dropping the handle cancels the subscription; no further
/// snapshots are delivered after [`Subscription::unsubscribe`] returns.
pub struct Subscription {
    path: StorePath,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Build a handle from a receiver and a cancellation action
    #[must_use]
    pub fn new(
        path: StorePath,
        rx: mpsc::UnboundedReceiver<Snapshot>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            path,
            rx,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// The subscribed path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Next snapshot, or `None` once the stream has ended
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Cancel the subscription
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
