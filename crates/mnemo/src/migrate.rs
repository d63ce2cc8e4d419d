// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo migrate` command implementation.

use std::path::PathBuf;

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryStore, MnemoError};
use mnemo_store::SqliteMemory;

/// Run the `mnemo migrate` command.
///
/// Imports legacy markdown memory files from `dir` (the workspace directory
/// when omitted). The import runs once per store; later invocations are
/// no-ops.
pub async fn run_migrate(config: &MnemoConfig, dir: Option<PathBuf>) -> Result<(), MnemoError> {
    let dir = dir.unwrap_or_else(|| config.workspace_dir());

    let store = SqliteMemory::open(&config.database_path()).await?;
    store.migrate_from_markdown(&dir).await?;
    store.close().await?;

    println!("legacy markdown migration complete");
    Ok(())
}
