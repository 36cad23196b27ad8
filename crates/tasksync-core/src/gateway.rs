//! Task Sync Gateway
//!
//! Translates the five task operations (subscribe, fetch-one, fetch-all,
//! create, update, delete) into store calls under the current user's
//! `users/{uid}/tasks` namespace.
//!
//! Every operation resolves the session first and fails with
//! [`GatewayError::NoActiveSession`] when unauthenticated; the attempt is
//! also logged. Every store call resolves to an explicit `Result` — no
//! failure propagates past the gateway uncaught.

use crate::error::GatewayError;
use crate::session::{Session, SessionManager};
use crate::task::{decode_task_map, TaskMap, TaskRecord};
use serde_json::{Map, Value};
use std::sync::Arc;
use tasksync_store::{Store, StorePath, Subscription};

/// Gateway bound to one store and one session
#[derive(Debug)]
pub struct TaskGateway<S> {
    store: Arc<S>,
    session: Arc<SessionManager>,
}

impl<S: Store> TaskGateway<S> {
    /// Bind a gateway to a store and a session manager
    #[inline]
    #[must_use]
    pub fn new(store: Arc<S>, session: Arc<SessionManager>) -> Self {
        Self { store, session }
    }

    /// The session handle this gateway consults
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Open a live subscription on the user's full task collection
    ///
    /// Each committed change delivers the complete current collection.
    /// Duplicate subscribes are not deduplicated; callers own that.
    ///
    /// # Errors
    /// `NoActiveSession` without a session; `StoreRead` when the attach
    /// is rejected.
    pub async fn subscribe_to_tasks(&self) -> Result<TaskSubscription, GatewayError> {
        let path = self.tasks_path("subscribe_to_tasks")?;
        let inner = self
            .store
            .subscribe(&path)
            .await
            .map_err(GatewayError::StoreRead)?;
        Ok(TaskSubscription { inner })
    }

    /// Point-in-time read of one task
    ///
    /// Absence is `Ok(None)`, never an error.
    ///
    /// # Errors
    /// `NoActiveSession`, `StoreRead`, or `Decode`.
    pub async fn fetch_task(&self, id: &str) -> Result<Option<TaskRecord>, GatewayError> {
        let path = self.tasks_path("fetch_task")?.child(id);
        let snapshot = self
            .store
            .read_once(&path)
            .await
            .map_err(GatewayError::StoreRead)?;
        match snapshot {
            None => Ok(None),
            Some(value) => Ok(Some(TaskRecord::from_snapshot(id, value)?)),
        }
    }

    /// Point-in-time read of the whole collection
    ///
    /// An empty namespace reads as an empty map, never as absence.
    ///
    /// # Errors
    /// `NoActiveSession`, `StoreRead`, or `Decode`.
    pub async fn fetch_tasks(&self) -> Result<TaskMap, GatewayError> {
        let path = self.tasks_path("fetch_tasks")?;
        let snapshot = self
            .store
            .read_once(&path)
            .await
            .map_err(GatewayError::StoreRead)?;
        Ok(decode_task_map(snapshot)?)
    }

    /// Create a task: assign a store-generated id, denormalize it onto
    /// the record, and write record and key in one atomic write
    ///
    /// Returns the written record with its id populated.
    ///
    /// # Errors
    /// `NoActiveSession` or `StoreWrite`.
    pub async fn add_task(
        &self,
        fields: Map<String, Value>,
    ) -> Result<TaskRecord, GatewayError> {
        let path = self.tasks_path("add_task")?;
        let key = self
            .store
            .generate_key(&path)
            .await
            .map_err(GatewayError::StoreWrite)?;
        let record = TaskRecord::with_id(key.clone(), fields);
        self.store
            .write(&path.child(&key), record.to_value())
            .await
            .map_err(GatewayError::StoreWrite)?;
        tracing::debug!(id = %record.id, "task added");
        Ok(record)
    }

    /// Remove the record at `id`; removing a nonexistent id succeeds
    ///
    /// # Errors
    /// `NoActiveSession` or `StoreWrite`.
    pub async fn delete_task(&self, id: &str) -> Result<(), GatewayError> {
        let path = self.tasks_path("delete_task")?.child(id);
        self.store
            .remove(&path)
            .await
            .map_err(GatewayError::StoreWrite)?;
        tracing::debug!(id, "task deleted");
        Ok(())
    }

    /// Overwrite the record at `record.id` with the full record contents
    ///
    /// Full replace, not merge; a nonexistent id is an upsert, not an
    /// error. The id stays denormalized on the stored record.
    ///
    /// # Errors
    /// `NoActiveSession`, `MissingTaskId` when the record has no id, or
    /// `StoreWrite`.
    pub async fn save_task(&self, record: &TaskRecord) -> Result<(), GatewayError> {
        if record.id.is_empty() {
            return Err(GatewayError::MissingTaskId);
        }
        let path = self.tasks_path("save_task")?.child(&record.id);
        self.store
            .write(&path, record.to_value())
            .await
            .map_err(GatewayError::StoreWrite)?;
        tracing::debug!(id = %record.id, "task saved");
        Ok(())
    }

    fn tasks_path(&self, operation: &str) -> Result<StorePath, GatewayError> {
        match self.session.current() {
            Session::Authenticated(identity) => Ok(StorePath::user_tasks(&identity.uid)),
            Session::Unauthenticated => {
                tracing::warn!(operation, "task operation attempted with no active session");
                Err(GatewayError::NoActiveSession)
            }
        }
    }
}

/// Live handle on the user's task collection
///
/// Wraps the store subscription, decoding each snapshot into a
/// [`TaskMap`]. Cancel with [`TaskSubscription::unsubscribe`] or by
/// dropping the handle.
#[derive(Debug)]
pub struct TaskSubscription {
    inner: Subscription,
}

impl TaskSubscription {
    /// Next collection snapshot, or `None` once the stream has ended
    ///
    /// An absent namespace decodes to an empty map; a malformed snapshot
    /// surfaces as `Err` without ending the stream.
    pub async fn next(&mut self) -> Option<Result<TaskMap, GatewayError>> {
        let snapshot = self.inner.next().await?;
        Some(decode_task_map(snapshot).map_err(GatewayError::from))
    }

    /// Cancel; no further snapshots are delivered after this returns
    pub fn unsubscribe(self) {
        self.inner.unsubscribe();
    }
}
