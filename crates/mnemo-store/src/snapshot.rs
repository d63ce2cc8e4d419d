// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable snapshot export and import.
//!
//! A snapshot is a markdown document of every shared core record. Each
//! entry is introduced by a separator token rather than a bare `---`
//! line: record content may legitimately contain markdown horizontal
//! rules, and an in-content `---` must survive a round trip.

use std::path::Path;

use mnemo_core::{MemoryCategory, MnemoError};
use tracing::info;

use crate::database::{Database, map_tr_err};
use crate::queries::records;

/// Separator token introducing each snapshot entry.
const ENTRY_SEPARATOR: &str = "@@MEMORY_ENTRY@@";

/// Document header line.
const HEADER: &str = "# Memory Snapshot";

/// Most records exported into one snapshot.
const EXPORT_LIMIT: i64 = 1000;

fn snapshot_error(message: String, source: std::io::Error) -> MnemoError {
    MnemoError::Snapshot {
        message,
        source: Some(Box::new(source)),
    }
}

/// Export all shared core records to a markdown document at `path`.
///
/// Owned records stay out of snapshots; the file is a workspace-level
/// artifact any user of the agent can read. Nothing to export means no
/// file is written.
pub async fn export_snapshot(db: &Database, path: &Path) -> Result<(), MnemoError> {
    let entries: Vec<(String, String)> = db
        .connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, content FROM memories
                 WHERE category = 'core' AND owner = ''
                 ORDER BY updated_at DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map([EXPORT_LIMIT], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    if entries.is_empty() {
        return Ok(());
    }

    let mut doc = String::from(HEADER);
    doc.push('\n');
    for (key, content) in &entries {
        doc.push('\n');
        doc.push_str(ENTRY_SEPARATOR);
        doc.push_str("\n\n## ");
        doc.push_str(key);
        doc.push_str("\n\n");
        doc.push_str(content);
        doc.push('\n');
    }

    std::fs::write(path, doc)
        .map_err(|e| snapshot_error(format!("write snapshot to {}", path.display()), e))?;
    info!(path = %path.display(), entries = entries.len(), "memory snapshot exported");
    Ok(())
}

/// Import a snapshot document, upserting each entry as a shared core
/// record. Returns the number of records stored.
///
/// Accepts the current separator and the legacy bare-`---` form.
/// Idempotent: re-importing the same file converges, it never duplicates.
pub async fn import_snapshot(db: &Database, path: &Path) -> Result<usize, MnemoError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| snapshot_error(format!("read snapshot from {}", path.display()), e))?;

    let entries = parse_snapshot(&data);
    let mut imported = 0;
    for (key, content) in entries {
        records::store(db, &key, &content, MemoryCategory::Core, "").await?;
        imported += 1;
    }
    if imported > 0 {
        info!(path = %path.display(), imported, "memory snapshot imported");
    }
    Ok(imported)
}

/// Split a snapshot document into (key, content) pairs.
///
/// Sections without a `## key` heading get a positional `imported_<n>`
/// key. The document header and empty sections are skipped.
fn parse_snapshot(data: &str) -> Vec<(String, String)> {
    let document = data.trim();
    if document.is_empty() {
        return Vec::new();
    }

    let sections: Vec<&str> = if document.contains(ENTRY_SEPARATOR) {
        document.split(ENTRY_SEPARATOR).collect()
    } else {
        document.split("\n---\n").collect()
    };

    let mut entries = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        let mut section = section.trim();

        // Drop a leading top-level heading (the document header).
        if section.starts_with('#') && !section.starts_with("##") {
            section = match section.split_once('\n') {
                Some((_, rest)) => rest.trim(),
                None => "",
            };
        }
        if section.is_empty() {
            continue;
        }

        let (key, content) = match section.strip_prefix("## ") {
            Some(rest) => match rest.split_once('\n') {
                Some((heading, body)) => (heading.trim().to_string(), body.trim().to_string()),
                None => (rest.trim().to_string(), String::new()),
            },
            None => (format!("imported_{}", i + 1), section.to_string()),
        };
        if key.is_empty() || content.is_empty() {
            continue;
        }
        entries.push((key, content));
    }
    entries
}
