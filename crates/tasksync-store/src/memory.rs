//! In-memory store backend
//!
//! A tree of JSON values behind a lock, with live subscriptions notified
//! inside the commit section so every subscriber observes snapshots in
//! commit order. Concurrent writes to the same key resolve last-write-wins
//! by arrival order at the lock.

use crate::error::StoreError;
use crate::path::StorePath;
use crate::store::{Snapshot, Store, Subscription};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use ulid::Ulid;

/// In-memory hierarchical store with live subscriptions
pub struct MemoryStore {
    root: Mutex<Value>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_subscriber: AtomicU64,
}

struct Subscriber {
    path: StorePath,
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Value::Object(Map::new())),
            subscribers: Arc::new(DashMap::new()),
            next_subscriber: AtomicU64::new(0),
        }
    }

    /// Create a store pre-populated from an exported tree
    ///
    /// Anything other than an object (a wiped or never-written export)
    /// starts the store empty.
    #[must_use]
    pub fn import(tree: Value) -> Self {
        let store = Self::new();
        if tree.is_object() {
            *store.root.lock() = tree;
        }
        store
    }

    /// Clone the entire tree, for persistence or inspection
    #[must_use]
    pub fn export(&self) -> Value {
        self.root.lock().clone()
    }

    /// Number of live subscriptions, dead receivers included until the
    /// next commit sweeps them
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Run a mutation and fan snapshots out to overlapping subscribers
    /// while still inside the commit section.
    fn commit<F: FnOnce(&mut Value)>(&self, changed: &StorePath, mutate: F) {
        let mut guard = self.root.lock();
        let root = &mut *guard;
        mutate(root);

        let mut dead = Vec::new();
        for entry in self.subscribers.iter() {
            let sub = entry.value();
            if !sub.path.overlaps(changed) {
                continue;
            }
            if sub.tx.send(snapshot_at(root, &sub.path)).is_err() {
                dead.push(*entry.key());
            }
        }
        for id in dead {
            self.subscribers.remove(&id);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn read_once(&self, path: &StorePath) -> Result<Snapshot, StoreError> {
        Ok(snapshot_at(&self.root.lock(), path))
    }

    async fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        // Register and deliver the initial snapshot under the tree lock so
        // no commit can slip between them.
        {
            let root = self.root.lock();
            let _ = tx.send(snapshot_at(&root, path));
            self.subscribers.insert(
                id,
                Subscriber {
                    path: path.clone(),
                    tx,
                },
            );
        }

        let registry = Arc::clone(&self.subscribers);
        tracing::debug!(path = %path, id, "subscription opened");
        Ok(Subscription::new(path.clone(), rx, move || {
            registry.remove(&id);
        }))
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.commit(path, |root| write_at(root, path.segments(), value));
        Ok(())
    }

    async fn generate_key(&self, _parent: &StorePath) -> Result<String, StoreError> {
        Ok(Ulid::new().to_string())
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.commit(path, |root| remove_at(root, path.segments()));
        Ok(())
    }
}

/// Value at `path`, with `Null` and missing both reported as `None`
fn snapshot_at(root: &Value, path: &StorePath) -> Snapshot {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        return None;
    }
    Some(node.clone())
}

fn write_at(root: &mut Value, segments: &[String], value: Value) {
    // Null writes are removals, mirroring the remote store's semantics.
    if value.is_null() {
        remove_at(root, segments);
        return;
    }
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };
    let mut node = root;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else { return };
        node = map.entry(segment.clone()).or_insert(Value::Null);
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Some(map) = node.as_object_mut() {
        map.insert(last.clone(), value);
    }
}

/// Remove the subtree at `segments`, pruning emptied ancestors so an
/// emptied namespace reads back as absent rather than `{}`.
fn remove_at(root: &mut Value, segments: &[String]) {
    fn recurse(node: &mut Value, segments: &[String]) {
        let Some((head, rest)) = segments.split_first() else {
            *node = Value::Object(Map::new());
            return;
        };
        let Some(map) = node.as_object_mut() else {
            return;
        };
        if rest.is_empty() {
            map.remove(head);
            return;
        }
        if let Some(child) = map.get_mut(head) {
            recurse(child, rest);
            if child.as_object().is_some_and(Map::is_empty) {
                map.remove(head);
            }
        }
    }
    recurse(root, segments);
}
