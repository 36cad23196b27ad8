//! Admin CLI: wipe a store or seed its test namespace
//!
//! The store lives in a JSON file; each run loads it, applies one
//! operation, and writes it back. Wiping requires a literal
//! confirmation unless `--yes` is passed.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use std::io::Write as _;
use std::path::PathBuf;
use tasksync_admin::{seed_test_namespace, wipe_root};
use tasksync_functions::parse_seed_tasks;
use tasksync_store::MemoryStore;
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED_TASKS: &str = include_str!("../data/seed-tasks.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("tasksync-admin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Administrative seed/wipe tooling for a tasksync store")
        .subcommand_required(true)
        .arg(
            Arg::new("db")
                .long("db")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON database file to operate on"),
        )
        .subcommand(
            Command::new("wipe")
                .about("Remove all data from the store")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
        .subcommand(
            Command::new("seed")
                .about("Clear the test namespace and repopulate it from a task list")
                .arg(
                    Arg::new("uid")
                        .long("uid")
                        .default_value("test-user")
                        .help("Identity whose test namespace receives the tasks"),
                )
                .arg(
                    Arg::new("tasks")
                        .long("tasks")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON task list, defaulting to the built-in set"),
                ),
        );

    let matches = cli.get_matches();
    let db_path = matches
        .get_one::<PathBuf>("db")
        .context("--db is required")?
        .clone();

    let store = load_store(&db_path)?;

    match matches.subcommand() {
        Some(("wipe", sub)) => {
            if !sub.get_flag("yes") {
                let prompt = format!(
                    "WARNING: This will remove all data from the store at {}.\nContinue? [y|N] ",
                    db_path.display()
                );
                if !confirm(&prompt)? {
                    println!("Aborting.");
                    return Ok(());
                }
            }
            println!("Ok. Removing db root...");
            wipe_root(&store).await.context("failed to remove db root")?;
            println!("Removed db root.");
        }
        Some(("seed", sub)) => {
            let uid = sub.get_one::<String>("uid").context("--uid has a default")?;
            let tasks = match sub.get_one::<PathBuf>("tasks") {
                Some(path) => {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("reading task list {}", path.display()))?;
                    parse_seed_tasks(&raw).context("parsing task list")?
                }
                None => parse_seed_tasks(DEFAULT_SEED_TASKS).context("built-in task list")?,
            };
            let written = seed_test_namespace(&store, uid, &tasks)
                .await
                .context("seeding test namespace")?;
            println!("DB setup complete: {written} tasks.");
        }
        _ => unreachable!("subcommand_required"),
    }

    persist_store(&store, &db_path)
}

fn load_store(path: &PathBuf) -> anyhow::Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading store file {}", path.display()))?;
    let tree = serde_json::from_str(&raw)
        .with_context(|| format!("parsing store file {}", path.display()))?;
    Ok(MemoryStore::import(tree))
}

fn persist_store(store: &MemoryStore, path: &PathBuf) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(&store.export()).context("serializing store")?;
    std::fs::write(path, raw).with_context(|| format!("writing store file {}", path.display()))
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush().context("flushing prompt")?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    Ok(is_affirmative(&answer))
}

// Anything other than an explicit yes declines.
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
