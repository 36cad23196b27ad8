//! tasksync-core - Client core
//!
//! The client side of the user-task synchronization protocol:
//! - Parses provider auth-state callbacks into an explicit session
//!   state machine ([`SessionManager`])
//! - Translates task operations into namespaced store calls
//!   ([`TaskGateway`])
//! - Converts every remote result into an explicit success/failure
//!   signal ([`GatewayError`])
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tasksync_core::{SessionManager, TaskGateway};
//! use tasksync_store::MemoryStore;
//!
//! # async fn example(provider: Arc<dyn tasksync_core::IdentityProvider>) {
//! let session = Arc::new(SessionManager::new(provider));
//! session.sign_in().await;
//!
//! let gateway = TaskGateway::new(Arc::new(MemoryStore::new()), session);
//! let tasks = gateway.fetch_tasks().await;
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod gateway;
pub mod session;
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use error::{AuthError, GatewayError};
pub use gateway::{TaskGateway, TaskSubscription};
pub use session::{
    AuthState, Identity, IdentityProvider, Session, SessionEvent, SessionEvents, SessionManager,
};
pub use task::{decode_task_map, TaskMap, TaskRecord};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the client core
    pub use crate::{
        Identity, IdentityProvider, Session, SessionEvent, SessionManager, TaskGateway, TaskMap,
        TaskRecord,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
