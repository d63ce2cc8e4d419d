// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo export` and `mnemo import` command implementations.

use std::path::{Path, PathBuf};

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryStore, MnemoError};
use mnemo_store::SqliteMemory;

/// Run the `mnemo export` command.
///
/// Writes all shared core records to `output`, or to the workspace
/// snapshot path when omitted. No file is produced when the store has
/// nothing to export.
pub async fn run_export(config: &MnemoConfig, output: Option<PathBuf>) -> Result<(), MnemoError> {
    let path = output.unwrap_or_else(|| config.snapshot_path());

    let store = SqliteMemory::open(&config.database_path()).await?;
    store.export_snapshot(&path).await?;
    store.close().await?;

    println!("export complete: {}", path.display());
    Ok(())
}

/// Run the `mnemo import` command.
pub async fn run_import(config: &MnemoConfig, path: &Path) -> Result<(), MnemoError> {
    let store = SqliteMemory::open(&config.database_path()).await?;
    let imported = store.import_snapshot(path).await?;
    store.close().await?;

    println!("imported {imported} record(s) from {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use mnemo_core::MemoryCategory;

    use super::*;

    fn workspace_config(dir: &Path) -> MnemoConfig {
        let mut config = MnemoConfig::default();
        config.workspace.dir = dir.display().to_string();
        config
    }

    #[tokio::test]
    async fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let source = workspace_config(&dir.path().join("source"));
        let target = workspace_config(&dir.path().join("target"));
        let snapshot = dir.path().join("snapshot.md");

        let store = SqliteMemory::open(&source.database_path()).await.unwrap();
        store
            .store("user_name", "answers to Sam", MemoryCategory::Core, "")
            .await
            .unwrap();
        store.close().await.unwrap();

        run_export(&source, Some(snapshot.clone())).await.unwrap();
        assert!(snapshot.exists());

        run_import(&target, &snapshot).await.unwrap();
        let store = SqliteMemory::open(&target.database_path()).await.unwrap();
        let record = store.get("user_name").await.unwrap().unwrap();
        assert_eq!(record.content, "answers to Sam");
    }

    #[tokio::test]
    async fn export_of_empty_store_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace_config(dir.path());

        run_export(&config, None).await.unwrap();
        assert!(!config.snapshot_path().exists());
    }
}
