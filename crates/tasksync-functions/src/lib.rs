//! tasksync-functions - Account lifecycle side
//!
//! Everything that runs next to the store rather than in the client:
//! - [`LifecycleHooks`]: seed a new account's task namespace, remove a
//!   deleted account's namespace
//! - [`AccountCleanup`]: periodic deletion of inactive accounts through
//!   a bounded work pool
//! - [`cleanup_route`]: the HTTP trigger, secret-gated in constant time
//!
//! The identity provider's administrative surface is the
//! [`AccountDirectory`] seam; [`MemoryDirectory`] implements it for
//! local runs.

#![warn(unreachable_pub)]

pub mod cleanup;
pub mod config;
pub mod directory;
pub mod error;
pub mod hooks;
pub mod http;
pub mod secret;

#[cfg(test)]
pub(crate) mod test_support;

pub use cleanup::{AccountCleanup, CleanupConfig, CleanupReport};
pub use config::{default_seed_tasks, parse_seed_tasks, FunctionsConfig};
pub use directory::{AccountDirectory, AccountEvent, IdentityPage, IdentityRecord, MemoryDirectory};
pub use error::{ConfigError, LifecycleError};
pub use hooks::LifecycleHooks;
pub use http::cleanup_route;
pub use secret::secret_matches;
