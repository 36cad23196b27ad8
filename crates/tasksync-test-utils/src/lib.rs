//! Testing utilities for the tasksync workspace
//!
//! Shared fixtures: sample seed tasks and a fault-injecting store
//! wrapper.

#![allow(missing_docs)]

use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tasksync_store::{Snapshot, Store, StoreError, StorePath, Subscription};

/// Task fields with just a title
pub fn task_fields(title: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("title".to_string(), json!(title));
    fields
}

/// The seed set used across lifecycle tests
pub fn sample_seed_tasks() -> Vec<Map<String, Value>> {
    vec![
        task_fields("water the plants"),
        task_fields("take out the trash"),
        task_fields("file the report"),
    ]
}

/// Store wrapper that fails selected writes
///
/// Failure is injected either by write arrival order (`fail_nth_write`,
/// 1-based) or by exact path (`fail_writes_at`). Reads and key
/// generation always pass through.
pub struct FlakyStore<S> {
    inner: Arc<S>,
    writes_seen: AtomicU64,
    fail_nth: Mutex<HashSet<u64>>,
    fail_paths: Mutex<HashSet<String>>,
}

impl<S> FlakyStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            writes_seen: AtomicU64::new(0),
            fail_nth: Mutex::new(HashSet::new()),
            fail_paths: Mutex::new(HashSet::new()),
        }
    }

    /// Fail the `n`th write call (1-based), counting writes only
    #[must_use]
    pub fn fail_nth_write(self, n: u64) -> Self {
        self.fail_nth.lock().expect("poisoned").insert(n);
        self
    }

    /// Fail every write and removal at exactly `path`
    #[must_use]
    pub fn fail_writes_at(self, path: &StorePath) -> Self {
        self.fail_paths.lock().expect("poisoned").insert(path.to_string());
        self
    }

    fn path_blocked(&self, path: &StorePath) -> bool {
        self.fail_paths
            .lock()
            .expect("poisoned")
            .contains(&path.to_string())
    }
}

#[async_trait::async_trait]
impl<S: Store> Store for FlakyStore<S> {
    async fn read_once(&self, path: &StorePath) -> Result<Snapshot, StoreError> {
        self.inner.read_once(path).await
    }

    async fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        self.inner.subscribe(path).await
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let n = self.writes_seen.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_nth.lock().expect("poisoned").contains(&n) || self.path_blocked(path) {
            return Err(StoreError::write(path, "injected failure"));
        }
        self.inner.write(path, value).await
    }

    async fn generate_key(&self, parent: &StorePath) -> Result<String, StoreError> {
        self.inner.generate_key(parent).await
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        if self.path_blocked(path) {
            return Err(StoreError::write(path, "injected failure"));
        }
        self.inner.remove(path).await
    }
}
