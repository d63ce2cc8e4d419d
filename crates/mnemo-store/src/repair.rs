// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-place schema upgrades and flag-gated data repairs.
//!
//! Everything here runs synchronously inside the bootstrap call and is
//! safe to re-run: upgrades introspect the live schema first, and repairs
//! set their completion flag in the same transaction as the repair, so a
//! crash partway through re-runs the repair instead of skipping it.

use rusqlite::{Connection, params};
use tracing::info;

use crate::schema;

/// Metadata flag set once the duplicate-key repair has completed.
pub(crate) const META_DEDUPLICATED_KEYS: &str = "deduplicated_keys";

/// Metadata flag set once the legacy markdown import has completed.
pub(crate) const META_MIGRATED_MARKDOWN: &str = "migrated_markdown";

/// Read a metadata value, or None if the key has never been set.
pub(crate) fn metadata_get(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        params![key],
        |row| row.get(0),
    );
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Set a metadata value, replacing any previous one.
pub(crate) fn metadata_set(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// Rebuild a pre-owner memories table in place.
///
/// Old database files carry a memories table without the owner column and
/// with UNIQUE on key alone. SQLite cannot add a column into a UNIQUE
/// constraint, so the table is rebuilt: triggers and the FTS mirror are
/// dropped first so the row copy does not fire them, existing rows are
/// carried over as shared, and legacy `datetime('now')` timestamps are
/// normalized to the ISO format new rows use. One transaction end to end;
/// a crash leaves the old table untouched.
pub(crate) fn add_owner_column(conn: &mut Connection) -> rusqlite::Result<()> {
    let tables: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'memories'",
        [],
        |row| row.get(0),
    )?;
    if tables == 0 {
        // Fresh database, schema bootstrap creates the table with owner.
        return Ok(());
    }

    let mut has_owner = false;
    {
        let mut stmt = conn.prepare("PRAGMA table_info(memories)")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            if name == "owner" {
                has_owner = true;
            }
        }
    }
    if has_owner {
        return Ok(());
    }

    info!("rebuilding memories table to add the owner column");
    let tx = conn.transaction()?;
    tx.execute_batch(
        "DROP TRIGGER IF EXISTS memories_ai;
         DROP TRIGGER IF EXISTS memories_ad;
         DROP TRIGGER IF EXISTS memories_au;
         DROP TABLE IF EXISTS memories_fts;
         ALTER TABLE memories RENAME TO memories_old;",
    )?;
    tx.execute_batch(schema::RECORDS_TABLE)?;
    tx.execute(
        "INSERT INTO memories (id, key, content, category, owner, created_at, updated_at)
         SELECT id, key, content, category, '',
                COALESCE(strftime('%Y-%m-%dT%H:%M:%fZ', created_at), created_at),
                COALESCE(strftime('%Y-%m-%dT%H:%M:%fZ', updated_at), updated_at)
         FROM memories_old",
        [],
    )?;
    tx.execute_batch("DROP TABLE memories_old;")?;
    tx.commit()?;
    Ok(())
}

/// Drop and rebuild the FTS mirror from the records table.
///
/// Runs on every open. An external-content FTS table desyncs silently if
/// it ever misses a trigger firing (crash mid-write, manual edits, a
/// dropped table); reindexing at startup restores it without trusting
/// prior state.
pub(crate) fn rebuild_fts_index(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "DROP TRIGGER IF EXISTS memories_ai;
         DROP TRIGGER IF EXISTS memories_ad;
         DROP TRIGGER IF EXISTS memories_au;
         DROP TABLE IF EXISTS memories_fts;",
    )?;
    tx.execute_batch(schema::FTS_TABLE)?;
    tx.execute(
        "INSERT INTO memories_fts (rowid, key, content, category)
         SELECT id, key, content, category FROM memories",
        [],
    )?;
    tx.execute_batch(schema::FTS_TRIGGERS)?;
    tx.commit()?;
    Ok(())
}

/// One-time repair: collapse historical duplicate keys to the newest row.
///
/// UNIQUE(key, owner) allows a shared row and an owned row under the same
/// key, and older versions of the write path created exactly that. Keeps
/// the row with the most recent updated_at per key.
pub(crate) fn deduplicate_keys(conn: &mut Connection) -> rusqlite::Result<()> {
    if metadata_get(conn, META_DEDUPLICATED_KEYS)?.as_deref() == Some("true") {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let removed = tx.execute(
        "DELETE FROM memories WHERE id NOT IN (
             SELECT id FROM (
                 SELECT id, ROW_NUMBER() OVER (
                     PARTITION BY key ORDER BY updated_at DESC, id DESC
                 ) AS rn FROM memories
             ) WHERE rn = 1
         )",
        [],
    )?;
    metadata_set(&tx, META_DEDUPLICATED_KEYS, "true")?;
    tx.commit()?;

    if removed > 0 {
        info!(removed, "removed duplicate memory keys");
    }
    Ok(())
}
