//! Full account lifecycle against the in-memory stack

use std::sync::Arc;
use tasksync_core::{AuthError, AuthState, Identity, IdentityProvider, SessionManager, TaskGateway};
use tasksync_functions::{
    cleanup_route, AccountCleanup, AccountDirectory, AccountEvent, CleanupConfig, LifecycleHooks,
    MemoryDirectory,
};
use tasksync_store::{MemoryStore, Store, StorePath};
use tasksync_test_utils::{sample_seed_tasks, task_fields};
use tokio::sync::{broadcast, mpsc};
use warp::http::StatusCode;

/// Provider pinned to one identity, always signed in
struct PinnedProvider {
    identity: Identity,
    tx: broadcast::Sender<AuthState>,
}

impl PinnedProvider {
    fn new(uid: &str) -> Self {
        let (tx, _) = broadcast::channel(4);
        Self {
            identity: Identity::new(uid),
            tx,
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for PinnedProvider {
    async fn sign_in(&self) -> Result<(), AuthError> {
        let _ = self.tx.send(Some(self.identity.clone()));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let _ = self.tx.send(None);
        Ok(())
    }

    fn current_identity(&self) -> AuthState {
        Some(self.identity.clone())
    }

    fn auth_state(&self) -> broadcast::Receiver<AuthState> {
        self.tx.subscribe()
    }
}

fn gateway_for(store: &Arc<MemoryStore>, uid: &str) -> TaskGateway<MemoryStore> {
    let session = Arc::new(SessionManager::new(Arc::new(PinnedProvider::new(uid))));
    TaskGateway::new(Arc::clone(store), session)
}

async fn drain_events(
    rx: &mut mpsc::UnboundedReceiver<AccountEvent>,
    hooks: &LifecycleHooks<MemoryStore>,
) {
    while let Ok(event) = rx.try_recv() {
        hooks.handle(event).await;
    }
}

#[tokio::test]
async fn account_creation_provisions_and_gateway_sees_it() {
    let store = Arc::new(MemoryStore::new());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let directory = Arc::new(MemoryDirectory::new().with_events(events_tx));
    let hooks = LifecycleHooks::new(Arc::clone(&store), sample_seed_tasks());

    directory.add_account("fresh-user", chrono::Utc::now());
    drain_events(&mut events_rx, &hooks).await;

    let gateway = gateway_for(&store, "fresh-user");
    let tasks = gateway.fetch_tasks().await.unwrap();
    assert_eq!(tasks.len(), sample_seed_tasks().len());
    for (key, record) in &tasks {
        assert_eq!(&record.id, key);
        assert!(!record.id.is_empty());
    }
}

#[tokio::test]
async fn account_deletion_tears_down_the_namespace() {
    let store = Arc::new(MemoryStore::new());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let directory = Arc::new(MemoryDirectory::new().with_events(events_tx));
    let hooks = LifecycleHooks::new(Arc::clone(&store), sample_seed_tasks());

    directory.add_account("doomed-user", chrono::Utc::now());
    drain_events(&mut events_rx, &hooks).await;

    // The user also wrote a task of their own.
    let gateway = gateway_for(&store, "doomed-user");
    gateway.add_task(task_fields("mine")).await.unwrap();

    directory.delete_identity("doomed-user").await.unwrap();
    drain_events(&mut events_rx, &hooks).await;

    // Whole namespace gone, not just the tasks child.
    assert_eq!(
        store.read_once(&StorePath::user("doomed-user")).await.unwrap(),
        None
    );
    let tasks = gateway.fetch_tasks().await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn cleanup_trigger_deletes_stale_accounts_and_their_data() {
    let store = Arc::new(MemoryStore::new());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let directory = Arc::new(MemoryDirectory::new().with_events(events_tx));
    let hooks = LifecycleHooks::new(Arc::clone(&store), sample_seed_tasks());

    directory.add_account("stale-user", chrono::Utc::now() - chrono::Duration::hours(2));
    directory.add_account("active-user", chrono::Utc::now());
    drain_events(&mut events_rx, &hooks).await;

    let cleanup = Arc::new(AccountCleanup::new(
        Arc::clone(&directory),
        CleanupConfig::default(),
    ));
    let route = cleanup_route(cleanup, Arc::from("cron-key"));

    let response = warp::test::request()
        .method("GET")
        .path("/accountcleanup?key=cron-key")
        .reply(&route)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Deletion events flow back through the hooks.
    drain_events(&mut events_rx, &hooks).await;

    assert!(!directory.contains("stale-user"));
    assert!(directory.contains("active-user"));
    assert_eq!(
        store.read_once(&StorePath::user("stale-user")).await.unwrap(),
        None
    );
    assert!(store
        .read_once(&StorePath::user("active-user"))
        .await
        .unwrap()
        .is_some());
}
