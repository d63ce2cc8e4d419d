// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record CRUD, listing, and counting.

use mnemo_core::{MemoryCategory, MemoryRecord, MnemoError};
use rusqlite::params;
use tracing::debug;

use crate::database::{Database, days_ago_utc, map_tr_err, now_utc};

/// Map a row of `id, key, content, category, owner, created_at, updated_at`.
pub(crate) fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let category: String = row.get(3)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        key: row.get(1)?,
        content: row.get(2)?,
        category: MemoryCategory::from_str_value(&category),
        owner: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Store a record under `key`, replacing any record already held under
/// that key regardless of owner.
///
/// UNIQUE(key, owner) alone would let a shared row and an owned row
/// coexist under one key, so the write deletes every row for the key and
/// inserts exactly one, in a single transaction. `created_at` carries
/// over from the replaced record so the first-stored time survives
/// updates, including updates that change the owner.
pub async fn store(
    db: &Database,
    key: &str,
    content: &str,
    category: MemoryCategory,
    owner: &str,
) -> Result<(), MnemoError> {
    if key.trim().is_empty() {
        return Err(MnemoError::InvalidInput(
            "memory key must not be empty".into(),
        ));
    }
    if content.trim().is_empty() {
        return Err(MnemoError::InvalidInput(
            "memory content must not be empty".into(),
        ));
    }

    let key = key.to_string();
    let content = content.to_string();
    let owner = owner.to_string();
    let now = now_utc();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let created_at = match tx.query_row(
                "SELECT created_at FROM memories WHERE key = ?1 LIMIT 1",
                params![key],
                |row| row.get::<_, String>(0),
            ) {
                Ok(ts) => ts,
                Err(rusqlite::Error::QueryReturnedNoRows) => now.clone(),
                Err(e) => return Err(e),
            };
            tx.execute("DELETE FROM memories WHERE key = ?1", params![key])?;
            tx.execute(
                "INSERT INTO memories (key, content, category, owner, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![key, content, category.as_str(), owner, created_at, now],
            )?;
            tx.commit()?;
            debug!(key = %key, category = %category, "memory stored");
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Exact-key lookup, regardless of owner.
pub async fn get(db: &Database, key: &str) -> Result<Option<MemoryRecord>, MnemoError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, key, content, category, owner, created_at, updated_at
                 FROM memories WHERE key = ?1",
                params![key],
                record_from_row,
            );
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Exact-key lookup requiring an exact owner match.
///
/// A shared record is only returned for the empty owner; there is no
/// shared fallback here, unlike list and search.
pub async fn get_by_owner(
    db: &Database,
    key: &str,
    owner: &str,
) -> Result<Option<MemoryRecord>, MnemoError> {
    let key = key.to_string();
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, key, content, category, owner, created_at, updated_at
                 FROM memories WHERE key = ?1 AND owner = ?2",
                params![key, owner],
                record_from_row,
            );
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Delete by key regardless of owner. Returns true if a record existed.
pub async fn delete(db: &Database, key: &str) -> Result<bool, MnemoError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM memories WHERE key = ?1", params![key])?;
            if removed > 0 {
                debug!(key = %key, "memory deleted");
            }
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete by key only when the stored owner matches exactly.
///
/// An empty owner targets shared records only.
pub async fn delete_by_owner(db: &Database, key: &str, owner: &str) -> Result<bool, MnemoError> {
    let key = key.to_string();
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM memories WHERE key = ?1 AND owner = ?2",
                params![key, owner],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete by key when the record is shared or owned by `owner`.
///
/// Refuses without mutating when the record belongs to someone else;
/// the refusal is an expected outcome, not an error.
pub async fn delete_accessible(db: &Database, key: &str, owner: &str) -> Result<bool, MnemoError> {
    let key = key.to_string();
    let owner = owner.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM memories WHERE key = ?1 AND (owner = '' OR owner = ?2)",
                params![key, owner],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// List records ordered by most recently updated.
///
/// A non-empty owner sees shared records plus their own; an empty owner
/// sees everything. Non-positive limits fall back to 20.
pub async fn list(
    db: &Database,
    category: Option<MemoryCategory>,
    limit: i64,
    owner: &str,
) -> Result<Vec<MemoryRecord>, MnemoError> {
    let limit = if limit <= 0 { 20 } else { limit };
    let category = category.map(|c| c.as_str().to_string());
    let owner = owner.to_string();

    db.connection()
        .call(move |conn| {
            let mut sql = String::from(
                "SELECT id, key, content, category, owner, created_at, updated_at FROM memories",
            );
            let mut clauses: Vec<&str> = Vec::new();
            let mut args: Vec<&dyn rusqlite::ToSql> = Vec::new();
            if let Some(category) = &category {
                clauses.push("category = ?");
                args.push(category);
            }
            if !owner.is_empty() {
                clauses.push("(owner = '' OR owner = ?)");
                args.push(&owner);
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY updated_at DESC LIMIT ?");
            args.push(&limit);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(args.as_slice(), record_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// List records updated within the last `days` days across a set of
/// categories, newest first.
///
/// An empty category set yields an empty result. Non-positive limits
/// fall back to 10.
pub async fn list_recent(
    db: &Database,
    categories: &[MemoryCategory],
    days: i64,
    limit: i64,
    owner: &str,
) -> Result<Vec<MemoryRecord>, MnemoError> {
    if categories.is_empty() {
        return Ok(Vec::new());
    }
    let limit = if limit <= 0 { 10 } else { limit };
    let cutoff = days_ago_utc(days);
    let categories: Vec<String> = categories.iter().map(|c| c.as_str().to_string()).collect();
    let owner = owner.to_string();

    db.connection()
        .call(move |conn| {
            let placeholders = vec!["?"; categories.len()].join(", ");
            let mut sql = format!(
                "SELECT id, key, content, category, owner, created_at, updated_at
                 FROM memories WHERE category IN ({placeholders}) AND updated_at >= ?"
            );
            let mut args: Vec<&dyn rusqlite::ToSql> = Vec::new();
            for category in &categories {
                args.push(category);
            }
            args.push(&cutoff);
            if !owner.is_empty() {
                sql.push_str(" AND (owner = '' OR owner = ?)");
                args.push(&owner);
            }
            sql.push_str(" ORDER BY updated_at DESC LIMIT ?");
            args.push(&limit);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(args.as_slice(), record_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of records.
pub async fn count(db: &Database) -> Result<i64, MnemoError> {
    db.connection()
        .call(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

/// Number of records in a category.
pub async fn count_by_category(db: &Database, category: MemoryCategory) -> Result<i64, MnemoError> {
    let category = category.as_str().to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM memories WHERE category = ?1",
                params![category],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}
