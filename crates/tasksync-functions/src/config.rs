//! Environment-driven configuration
//!
//! The functions binary is configured the way the hosted trigger was:
//! everything comes from the environment, the secret is mandatory.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `TASKSYNC_CLEANUP_KEY` | shared secret for the cleanup trigger | required |
//! | `TASKSYNC_INACTIVITY_MINUTES` | inactivity threshold | `30` |
//! | `TASKSYNC_MAX_CONCURRENT_DELETIONS` | cleanup pool size | `3` |
//! | `TASKSYNC_PAGE_SIZE` | identities per enumeration page | `1000` |
//! | `TASKSYNC_BIND` | trigger listen address | `127.0.0.1:8080` |
//! | `TASKSYNC_SEED_FILE` | JSON file with the seed task list | built-in set |

use crate::cleanup::CleanupConfig;
use crate::error::ConfigError;
use chrono::Duration;
use serde_json::{Map, Value};
use std::net::SocketAddr;

/// Full configuration for the functions binary
#[derive(Debug, Clone)]
pub struct FunctionsConfig {
    /// Shared secret the cleanup trigger must be presented
    pub cleanup_key: String,
    /// Cleanup pass settings
    pub cleanup: CleanupConfig,
    /// Listen address for the HTTP trigger
    pub bind_addr: SocketAddr,
    /// Tasks seeded into every new account's namespace
    pub seed_tasks: Vec<Map<String, Value>>,
}

impl FunctionsConfig {
    /// Read configuration from the environment
    ///
    /// # Errors
    /// `ConfigError::Missing` when `TASKSYNC_CLEANUP_KEY` is unset,
    /// `ConfigError::Invalid` when a variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cleanup_key = std::env::var("TASKSYNC_CLEANUP_KEY")
            .map_err(|_| ConfigError::Missing("TASKSYNC_CLEANUP_KEY"))?;

        let mut cleanup = CleanupConfig::default();
        if let Some(minutes) = read_parsed::<i64>("TASKSYNC_INACTIVITY_MINUTES")? {
            cleanup.inactivity_threshold = Duration::minutes(minutes);
        }
        if let Some(max) = read_parsed::<usize>("TASKSYNC_MAX_CONCURRENT_DELETIONS")? {
            cleanup.max_concurrent = max;
        }
        if let Some(page_size) = read_parsed::<usize>("TASKSYNC_PAGE_SIZE")? {
            cleanup.page_size = page_size;
        }

        let bind_addr = read_parsed::<SocketAddr>("TASKSYNC_BIND")?
            .unwrap_or_else(|| ([127, 0, 0, 1], 8080).into());

        let seed_tasks = match std::env::var("TASKSYNC_SEED_FILE") {
            Ok(path) => load_seed_file(&path)?,
            Err(_) => default_seed_tasks(),
        };

        Ok(Self {
            cleanup_key,
            cleanup,
            bind_addr,
            seed_tasks,
        })
    }
}

fn read_parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse::<T>().map(Some).map_err(|err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

fn load_seed_file(path: &str) -> Result<Vec<Map<String, Value>>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Invalid {
        name: "TASKSYNC_SEED_FILE",
        reason: err.to_string(),
    })?;
    parse_seed_tasks(&raw).map_err(|err| ConfigError::Invalid {
        name: "TASKSYNC_SEED_FILE",
        reason: err.to_string(),
    })
}

/// Parse a seed task list: `{"tasks": [...]}` or a bare array
///
/// # Errors
/// When the JSON does not parse or is neither shape.
pub fn parse_seed_tasks(raw: &str) -> Result<Vec<Map<String, Value>>, serde_json::Error> {
    #[derive(serde::Deserialize)]
    struct SeedFile {
        tasks: Vec<Map<String, Value>>,
    }

    if let Ok(file) = serde_json::from_str::<SeedFile>(raw) {
        return Ok(file.tasks);
    }
    serde_json::from_str::<Vec<Map<String, Value>>>(raw)
}

/// Built-in seed set for new accounts
#[must_use]
pub fn default_seed_tasks() -> Vec<Map<String, Value>> {
    let tasks = serde_json::json!([
        {"title": "Welcome to tasksync", "description": "This task was created for you when your account was set up."},
        {"title": "Add your first task", "description": "Use the add button to create a task of your own."},
        {"title": "Try completing a task", "description": "Completed tasks stay in sync on every device."},
    ]);
    match tasks {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
