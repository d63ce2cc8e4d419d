// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-time import of legacy markdown memory files.
//!
//! Before the store existed, memory lived in a workspace of markdown
//! files: MEMORY.md for long-lived facts, dated notes under
//! subdirectories, and possibly an exported MEMORY_SNAPSHOT.md. The
//! import reads them all into the store and never deletes the originals.

use std::path::{Path, PathBuf};

use mnemo_core::{MemoryCategory, MnemoError};
use tracing::info;

use crate::database::{Database, map_tr_err};
use crate::queries::records;
use crate::repair;

fn legacy_error(message: String, source: std::io::Error) -> MnemoError {
    MnemoError::Snapshot {
        message,
        source: Some(Box::new(source)),
    }
}

/// Import legacy markdown files from `legacy_dir` into the store.
///
/// Paragraphs of MEMORY.md become shared core records keyed
/// `legacy_core_<n>`; every other markdown file in the tree becomes one
/// shared daily record keyed `legacy_daily_<stem>`; paragraphs of
/// MEMORY_SNAPSHOT.md become `snapshot_core_<n>`. Keys that already
/// exist are left alone, so re-running a partial import cannot resurrect
/// content the user has since deleted or changed. Gated by a metadata
/// flag written only after every file has been stored; the originals
/// are kept as backup.
pub async fn migrate_from_markdown(db: &Database, legacy_dir: &Path) -> Result<(), MnemoError> {
    let migrated = db
        .connection()
        .call(|conn| repair::metadata_get(conn, repair::META_MIGRATED_MARKDOWN))
        .await
        .map_err(map_tr_err)?;
    if migrated.as_deref() == Some("true") {
        return Ok(());
    }

    let mut imported = 0usize;

    let memory_file = legacy_dir.join("MEMORY.md");
    if let Ok(data) = std::fs::read_to_string(&memory_file) {
        for (i, paragraph) in split_paragraphs(&data).into_iter().enumerate() {
            let key = format!("legacy_core_{}", i + 1);
            if store_if_absent(db, &key, &paragraph, MemoryCategory::Core).await? {
                imported += 1;
            }
        }
    }

    for path in markdown_files(legacy_dir)? {
        let data = std::fs::read_to_string(&path)
            .map_err(|e| legacy_error(format!("read legacy file {}", path.display()), e))?;
        let content = data.trim();
        if content.is_empty() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let key = format!("legacy_daily_{stem}");
        if store_if_absent(db, &key, content, MemoryCategory::Daily).await? {
            imported += 1;
        }
    }

    let snapshot_file = legacy_dir.join("MEMORY_SNAPSHOT.md");
    if let Ok(data) = std::fs::read_to_string(&snapshot_file) {
        for (i, paragraph) in split_paragraphs(&data).into_iter().enumerate() {
            let key = format!("snapshot_core_{}", i + 1);
            if store_if_absent(db, &key, &paragraph, MemoryCategory::Core).await? {
                imported += 1;
            }
        }
    }

    db.connection()
        .call(|conn| repair::metadata_set(conn, repair::META_MIGRATED_MARKDOWN, "true"))
        .await
        .map_err(map_tr_err)?;

    if imported > 0 {
        info!(imported, dir = %legacy_dir.display(), "legacy markdown imported");
    }
    Ok(())
}

/// Store unless the key already holds a record.
async fn store_if_absent(
    db: &Database,
    key: &str,
    content: &str,
    category: MemoryCategory,
) -> Result<bool, MnemoError> {
    if records::get(db, key).await?.is_some() {
        return Ok(false);
    }
    records::store(db, key, content, category, "").await?;
    Ok(true)
}

/// Markdown files under `dir`, recursively, sorted by path.
///
/// MEMORY.md and MEMORY_SNAPSHOT.md are handled separately and skipped
/// here, wherever they appear.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, MnemoError> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_markdown(dir, &mut files)
            .map_err(|e| legacy_error(format!("walk legacy dir {}", dir.display()), e))?;
    }
    files.sort();
    Ok(files)
}

fn collect_markdown(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_markdown(&path, files)?;
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let lower = name.to_lowercase();
        if !lower.ends_with(".md") || lower == "memory.md" || lower == "memory_snapshot.md" {
            continue;
        }
        files.push(path);
    }
    Ok(())
}

/// Split text on blank-line boundaries, trimming and dropping empties.
fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "First fact.\n\nSecond fact\nspanning two lines.\n\n\n\nThird.";
        let paragraphs = split_paragraphs(text);
        assert_eq!(
            paragraphs,
            vec!["First fact.", "Second fact\nspanning two lines.", "Third."]
        );
        assert!(split_paragraphs("  \n\n ").is_empty());
    }

    #[tokio::test]
    async fn imports_core_daily_and_snapshot_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("MEMORY.md"), "Fact one.\n\nFact two.").unwrap();
        std::fs::write(dir.path().join("MEMORY_SNAPSHOT.md"), "Snap fact.").unwrap();
        let notes = dir.path().join("202608");
        std::fs::create_dir(&notes).unwrap();
        std::fs::write(notes.join("20260815.md"), "Met with the team.").unwrap();
        std::fs::write(notes.join("empty.md"), "   ").unwrap();

        let db = test_db().await;
        migrate_from_markdown(&db, dir.path()).await.unwrap();

        let core1 = records::get(&db, "legacy_core_1").await.unwrap().unwrap();
        assert_eq!(core1.content, "Fact one.");
        assert_eq!(core1.category, MemoryCategory::Core);
        assert_eq!(core1.owner, "");
        assert!(records::get(&db, "legacy_core_2").await.unwrap().is_some());

        let daily = records::get(&db, "legacy_daily_20260815")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(daily.category, MemoryCategory::Daily);

        assert!(records::get(&db, "snapshot_core_1").await.unwrap().is_some());
        assert!(records::get(&db, "legacy_daily_empty").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("MEMORY.md"), "Original.").unwrap();

        let db = test_db().await;
        migrate_from_markdown(&db, dir.path()).await.unwrap();

        // A second pass with changed files must not re-import.
        std::fs::write(dir.path().join("MEMORY.md"), "Changed.").unwrap();
        migrate_from_markdown(&db, dir.path()).await.unwrap();
        assert_eq!(
            records::get(&db, "legacy_core_1").await.unwrap().unwrap().content,
            "Original."
        );
    }

    #[tokio::test]
    async fn import_never_clobbers_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("MEMORY.md"), "Legacy text.").unwrap();

        let db = test_db().await;
        records::store(&db, "legacy_core_1", "user edited", MemoryCategory::Core, "")
            .await
            .unwrap();

        migrate_from_markdown(&db, dir.path()).await.unwrap();
        assert_eq!(
            records::get(&db, "legacy_core_1").await.unwrap().unwrap().content,
            "user edited"
        );
    }

    #[tokio::test]
    async fn missing_directory_is_fine() {
        let db = test_db().await;
        migrate_from_markdown(&db, Path::new("/nonexistent/legacy")).await.unwrap();
    }
}
