//! Destructive store administration
//!
//! The two operations behind the admin CLI:
//! - wipe the entire store root
//! - clear the fixed test namespace and repopulate it from a static
//!   task list, ids generated and denormalized like production writes
//!
//! Unlike the best-effort lifecycle seeding, these are setup scripts:
//! the first hard failure aborts.

#![warn(unreachable_pub)]

use serde_json::{Map, Value};
use tasksync_core::TaskRecord;
use tasksync_store::{Store, StoreError, StorePath};

/// Root of the namespace the seed tool owns
#[must_use]
pub fn test_root() -> StorePath {
    StorePath::root().child("test")
}

/// Remove every value in the store
///
/// # Errors
/// `StoreError::Write` when the removal is rejected.
pub async fn wipe_root<S: Store>(store: &S) -> Result<(), StoreError> {
    store.remove(&StorePath::root()).await?;
    tracing::info!("removed db root");
    Ok(())
}

/// Clear the test namespace and repopulate `test/users/{uid}/tasks`
///
/// Returns the number of tasks written.
///
/// # Errors
/// The first rejected removal or write aborts the run.
pub async fn seed_test_namespace<S: Store>(
    store: &S,
    uid: &str,
    tasks: &[Map<String, Value>],
) -> Result<usize, StoreError> {
    store.remove(&test_root()).await?;

    let tasks_path = test_root().child("users").child(uid).child("tasks");
    let mut written = 0;
    for fields in tasks {
        let key = store.generate_key(&tasks_path).await?;
        let record = TaskRecord::with_id(key.clone(), fields.clone());
        store.write(&tasks_path.child(&key), record.to_value()).await?;
        tracing::info!(%key, "added task");
        written += 1;
    }
    Ok(written)
}
