// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema bootstrap for the memory store.
//!
//! All DDL here is idempotent (`IF NOT EXISTS`) and runs on every open.
//! Repairs that rewrite existing data live in [`crate::repair`].

use rusqlite::Connection;

/// Primary records table.
///
/// UNIQUE(key, owner) is weaker than the invariant the store maintains:
/// at most one row per key across all owners. The stronger guarantee is
/// enforced by the delete-then-insert write path in `queries::records`.
pub(crate) const RECORDS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS memories (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        key        TEXT NOT NULL,
        content    TEXT NOT NULL,
        category   TEXT NOT NULL DEFAULT 'core',
        owner      TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE(key, owner)
    );";

/// Lookup indexes for the records table plus the metadata side table
/// holding one-time repair flags.
pub(crate) const RECORD_INDEXES: &str = "
    CREATE INDEX IF NOT EXISTS idx_memories_owner ON memories(owner);
    CREATE INDEX IF NOT EXISTS idx_memories_updated_at ON memories(updated_at);
    CREATE INDEX IF NOT EXISTS idx_memories_category ON memories(category);

    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );";

/// External-content FTS5 mirror of the records table.
pub(crate) const FTS_TABLE: &str = "
    CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
        key,
        content,
        category,
        content='memories',
        content_rowid='id'
    );";

/// Triggers keeping the FTS mirror in sync with the records table.
///
/// The update trigger deletes the old row before inserting the new one;
/// external-content FTS5 corrupts silently if a stale row is left behind.
pub(crate) const FTS_TRIGGERS: &str = "
    CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
        INSERT INTO memories_fts(rowid, key, content, category)
        VALUES (new.id, new.key, new.content, new.category);
    END;

    CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
        INSERT INTO memories_fts(memories_fts, rowid, key, content, category)
        VALUES ('delete', old.id, old.key, old.content, old.category);
    END;

    CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE ON memories BEGIN
        INSERT INTO memories_fts(memories_fts, rowid, key, content, category)
        VALUES ('delete', old.id, old.key, old.content, old.category);
        INSERT INTO memories_fts(rowid, key, content, category)
        VALUES (new.id, new.key, new.content, new.category);
    END;";

/// Entity and relation tables for the knowledge graph layer.
///
/// `memory_key` is a soft link to `memories.key`, deliberately not a
/// foreign key: the record may be deleted independently and the sweeper
/// reaps the stale edge afterwards.
pub(crate) const GRAPH_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entities (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        type TEXT NOT NULL DEFAULT 'thing'
    );

    CREATE TABLE IF NOT EXISTS relations (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        source_id  INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
        relation   TEXT NOT NULL,
        target_id  INTEGER NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
        memory_key TEXT,
        weight     REAL NOT NULL DEFAULT 1.0,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE(source_id, relation, target_id)
    );

    CREATE INDEX IF NOT EXISTS idx_rel_source ON relations(source_id);
    CREATE INDEX IF NOT EXISTS idx_rel_target ON relations(target_id);
    CREATE INDEX IF NOT EXISTS idx_rel_memory ON relations(memory_key);";

/// Create every table, index, and trigger that does not exist yet.
pub(crate) fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(RECORDS_TABLE)?;
    conn.execute_batch(RECORD_INDEXES)?;
    conn.execute_batch(FTS_TABLE)?;
    conn.execute_batch(FTS_TRIGGERS)?;
    conn.execute_batch(GRAPH_SCHEMA)?;
    Ok(())
}
