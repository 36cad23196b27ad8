//! tasksync-store - Hierarchical store contract
//!
//! The data-store seam of the task synchronization system:
//! - [`Store`]: async trait for read-once, subscribe, write, key
//!   generation, and subtree removal
//! - [`StorePath`]: slash-separated key paths with typed per-user
//!   namespace constructors
//! - [`Subscription`]: live snapshot stream with explicit cancellation
//! - [`MemoryStore`]: in-memory backend used by tests, the admin CLI,
//!   and local runs
//!
//! # Example
//!
//! ```rust,ignore
//! use tasksync_store::{MemoryStore, Store, StorePath};
//!
//! # async fn example() -> Result<(), tasksync_store::StoreError> {
//! let store = MemoryStore::new();
//! let tasks = StorePath::user_tasks("u1");
//! let key = store.generate_key(&tasks).await?;
//! store.write(&tasks.child(&key), serde_json::json!({"title": "x"})).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod path;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use path::StorePath;
pub use store::{Snapshot, Store, Subscription};
