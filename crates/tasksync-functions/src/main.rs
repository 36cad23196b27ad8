//! Functions host: account-event loop plus the HTTP cleanup trigger

use anyhow::Context;
use clap::{value_parser, Arg, Command};
use std::net::SocketAddr;
use std::sync::Arc;
use tasksync_functions::{
    cleanup_route, AccountCleanup, FunctionsConfig, LifecycleHooks, MemoryDirectory,
};
use tasksync_store::MemoryStore;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("tasksync-functions")
        .version(env!("CARGO_PKG_VERSION"))
        .about("tasksync lifecycle hooks and cleanup trigger")
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_parser(value_parser!(SocketAddr))
                .help("Listen address, overriding TASKSYNC_BIND"),
        );
    let matches = cli.get_matches();

    let mut config = FunctionsConfig::from_env().context("reading configuration")?;
    if let Some(bind) = matches.get_one::<SocketAddr>("bind") {
        config.bind_addr = *bind;
    }

    let store = Arc::new(MemoryStore::new());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let directory = Arc::new(MemoryDirectory::new().with_events(events_tx));

    // Account events feed the hooks the way the hosted provider's
    // event source would.
    let hooks = LifecycleHooks::new(Arc::clone(&store), config.seed_tasks.clone());
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            hooks.handle(event).await;
        }
    });

    let cleanup = Arc::new(AccountCleanup::new(
        Arc::clone(&directory),
        config.cleanup.clone(),
    ));
    let route = cleanup_route(cleanup, Arc::from(config.cleanup_key.as_str()));

    tracing::info!(addr = %config.bind_addr, "cleanup trigger listening");
    warp::serve(route).run(config.bind_addr).await;
    Ok(())
}
