//! Account lifecycle hooks
//!
//! React to account events from the identity provider:
//! - creation: seed the new user's task namespace, best-effort in
//!   parallel (one failed seed write never aborts the others)
//! - deletion: remove the whole `users/{uid}` namespace in one operation

use crate::directory::AccountEvent;
use crate::error::LifecycleError;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;
use tasksync_core::TaskRecord;
use tasksync_store::{Store, StoreError, StorePath};

/// Hooks bound to one store and a configured seed task list
#[derive(Debug)]
pub struct LifecycleHooks<S> {
    store: Arc<S>,
    seed_tasks: Vec<Map<String, Value>>,
}

impl<S: Store> LifecycleHooks<S> {
    /// Bind hooks to a store and the seed set for new accounts
    #[inline]
    #[must_use]
    pub fn new(store: Arc<S>, seed_tasks: Vec<Map<String, Value>>) -> Self {
        Self { store, seed_tasks }
    }

    /// Dispatch one account event
    ///
    /// Failures are logged, not returned: the event source does not
    /// retry and the hooks are best-effort by contract.
    pub async fn handle(&self, event: AccountEvent) {
        match event {
            AccountEvent::Created(uid) => {
                let seeded = self.populate_user_data(&uid).await;
                tracing::info!(%uid, seeded, "account provisioned");
            }
            AccountEvent::Deleted(uid) => {
                if let Err(err) = self.cleanup_user_data(&uid).await {
                    tracing::error!(%uid, %err, "failed to remove user namespace");
                }
            }
        }
    }

    /// Seed the new user's task namespace
    ///
    /// Each seed task gets a generated id denormalized onto the record
    /// and is written independently, in parallel. Returns how many
    /// writes succeeded; each failure is logged and skipped.
    pub async fn populate_user_data(&self, uid: &str) -> usize {
        let tasks_path = StorePath::user_tasks(uid);

        let writes = self.seed_tasks.iter().cloned().map(|fields| {
            let store = Arc::clone(&self.store);
            let path = tasks_path.clone();
            async move {
                let key = store.generate_key(&path).await?;
                let record = TaskRecord::with_id(key.clone(), fields);
                store.write(&path.child(&key), record.to_value()).await?;
                Ok::<String, StoreError>(key)
            }
        });

        let mut seeded = 0;
        for result in join_all(writes).await {
            match result {
                Ok(key) => {
                    tracing::info!(uid, %key, "added seed task");
                    seeded += 1;
                }
                Err(err) => {
                    tracing::error!(uid, %err, "failed to add seed task");
                }
            }
        }
        seeded
    }

    /// Remove everything under `users/{uid}` as a single operation
    ///
    /// # Errors
    /// `LifecycleError::Store` when the removal is rejected.
    pub async fn cleanup_user_data(&self, uid: &str) -> Result<(), LifecycleError> {
        self.store.remove(&StorePath::user(uid)).await?;
        tracing::info!(uid, "removed user namespace");
        Ok(())
    }
}
