// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! Opening a database runs the full bootstrap sequence: pragmas, the
//! owner-column rebuild for old files, idempotent schema creation, a
//! full-text reindex, and the one-time duplicate-key repair. The reindex
//! must come before the duplicate repair: the repair deletes rows, and
//! deleting through a desynced external-content FTS table corrupts it
//! further. By the time `open` returns, every table, index, and trigger
//! exists and the full-text mirror matches the records.

use std::path::Path;

use mnemo_core::MnemoError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::repair;
use crate::schema;

/// Timestamp format used for every stored timestamp and cutoff comparison.
///
/// ISO 8601 with millisecond precision, always UTC. Chosen so that
/// lexicographic string comparison orders the same way as time.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub(crate) fn now_utc() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// UTC time `days` days ago in [`TIMESTAMP_FORMAT`].
pub(crate) fn days_ago_utc(days: i64) -> String {
    (chrono::Utc::now() - chrono::Duration::days(days))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Convert a tokio-rusqlite error into MnemoError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite memory store.
///
/// All operations go through the single tokio-rusqlite background thread,
/// so concurrent callers serialize on writes while WAL keeps readers from
/// blocking behind them. Clones share that thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and run the bootstrap sequence.
    ///
    /// Parent directories are created as needed.
    pub async fn open(path: &Path) -> Result<Self, MnemoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MnemoError::Storage {
                source: Box::new(e),
            })?;
        }
        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        let db = Self { conn };
        db.bootstrap().await?;
        debug!(path = %path.display(), "memory database opened");
        Ok(db)
    }

    /// Open an in-memory database with the full bootstrap applied.
    pub async fn open_in_memory() -> Result<Self, MnemoError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| map_tr_err(e.into()))?;
        let db = Self { conn };
        db.bootstrap().await?;
        Ok(db)
    }

    async fn bootstrap(&self) -> Result<(), MnemoError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )?;
                repair::add_owner_column(conn)?;
                schema::create_schema(conn)?;
                repair::rebuild_fts_index(conn)?;
                repair::deduplicate_keys(conn)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Borrow the underlying connection for the query modules.
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    ///
    /// Called once at shutdown; the connection itself is released when
    /// the handle drops.
    pub async fn close(&self) -> Result<(), MnemoError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
