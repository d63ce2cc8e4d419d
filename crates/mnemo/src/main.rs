// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo - persistent memory and knowledge graph for a personal AI agent.
//!
//! This is the binary entry point for the Mnemo CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemo_core::MemoryCategory;

mod graph;
mod migrate;
mod query;
mod record;
mod snapshot;
mod status;
mod sweep;

/// Mnemo - persistent memory and knowledge graph for a personal AI agent.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show store status and record counts.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Store a fact under a key, replacing any previous fact for that key.
    Store {
        /// Globally unique key for the fact.
        key: String,
        /// The fact content.
        content: String,
        /// Retention category: core, daily, conversation, or custom.
        #[arg(long, default_value = "core")]
        category: MemoryCategory,
        /// Owner of the fact; omit for a shared record.
        #[arg(long, default_value = "")]
        owner: String,
    },
    /// Look up a fact by key.
    Get {
        key: String,
        /// Only match a record owned by exactly this owner.
        #[arg(long)]
        owner: Option<String>,
    },
    /// Delete a fact by key.
    Forget {
        key: String,
        /// Only delete when the record is shared or owned by this owner.
        #[arg(long)]
        owner: Option<String>,
    },
    /// List records, most recently updated first.
    List {
        /// Restrict to one retention category.
        #[arg(long)]
        category: Option<MemoryCategory>,
        /// Maximum number of records.
        #[arg(long, default_value_t = 20)]
        limit: i64,
        /// See shared records plus this owner's; omit to see everything.
        #[arg(long, default_value = "")]
        owner: String,
    },
    /// Full-text search over keys and content.
    Search {
        query: String,
        /// Restrict to one retention category.
        #[arg(long)]
        category: Option<MemoryCategory>,
        /// Maximum number of hits; defaults to the configured search limit.
        #[arg(long)]
        limit: Option<i64>,
        /// See shared records plus this owner's; omit to see everything.
        #[arg(long, default_value = "")]
        owner: String,
    },
    /// Walk the knowledge graph outward from seed entities.
    Graph {
        /// Seed entity names (case-insensitive).
        #[arg(required = true)]
        seeds: Vec<String>,
        /// Maximum traversal depth.
        #[arg(long, default_value_t = 2)]
        hops: usize,
        /// Maximum number of entities to visit.
        #[arg(long, default_value_t = 15)]
        nodes: usize,
        /// Hide edges backed by other owners' private records.
        #[arg(long, default_value = "")]
        owner: String,
    },
    /// Run the retention pipeline once, or periodically with --watch.
    Sweep {
        /// Keep sweeping on the configured interval until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },
    /// Export shared core records to a snapshot file.
    Export {
        /// Output path; defaults to MEMORY_SNAPSHOT.md under the workspace.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import records from a snapshot file.
    Import {
        /// Snapshot file to read.
        path: PathBuf,
    },
    /// One-time import of legacy markdown memory files.
    Migrate {
        /// Directory to scan; defaults to the workspace directory.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match mnemo_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            mnemo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        Some(Commands::Store {
            key,
            content,
            category,
            owner,
        }) => record::run_store(&config, &key, &content, category, &owner).await,
        Some(Commands::Get { key, owner }) => {
            record::run_get(&config, &key, owner.as_deref()).await
        }
        Some(Commands::Forget { key, owner }) => {
            record::run_forget(&config, &key, owner.as_deref()).await
        }
        Some(Commands::List {
            category,
            limit,
            owner,
        }) => query::run_list(&config, category, limit, &owner).await,
        Some(Commands::Search {
            query,
            category,
            limit,
            owner,
        }) => query::run_search(&config, &query, category, limit, &owner).await,
        Some(Commands::Graph {
            seeds,
            hops,
            nodes,
            owner,
        }) => graph::run_graph(&config, &seeds, hops, nodes, &owner).await,
        Some(Commands::Sweep { watch }) => sweep::run_sweep(&config, watch).await,
        Some(Commands::Export { output }) => snapshot::run_export(&config, output).await,
        Some(Commands::Import { path }) => snapshot::run_import(&config, &path).await,
        Some(Commands::Migrate { dir }) => migrate::run_migrate(&config, dir).await,
        None => {
            println!("mnemo: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("mnemo: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("mnemo={log_level},mnemo_store={log_level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = mnemo_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "mnemo");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
