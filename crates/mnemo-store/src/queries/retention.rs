// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention pipeline: expire records, then repair the graph.

use std::collections::HashMap;

use mnemo_core::{MemoryCategory, MnemoError};
use rusqlite::params;
use tracing::info;

use crate::database::{Database, days_ago_utc, map_tr_err};
use crate::queries::graph::{delete_orphaned_entities, delete_stale_relations};

/// Delete expired records, then stale relations, then orphaned entities.
///
/// Core records never expire, nor does any category with a non-positive
/// window. All three stages run in one transaction, in order: the stale
/// pass only makes sense after the deletes, and the orphan pass only
/// after the stale pass. Skipping a stage would leave relations pointing
/// at vanished records between sweeps. Returns the number of expired
/// records.
pub async fn run_retention(
    db: &Database,
    retention_days: &HashMap<MemoryCategory, i64>,
) -> Result<usize, MnemoError> {
    let mut windows: Vec<(String, String)> = retention_days
        .iter()
        .filter(|(category, days)| **category != MemoryCategory::Core && **days > 0)
        .map(|(category, days)| (category.as_str().to_string(), days_ago_utc(*days)))
        .collect();
    windows.sort();

    let (expired, stale, orphaned) = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut expired = 0usize;
            for (category, cutoff) in &windows {
                expired += tx.execute(
                    "DELETE FROM memories WHERE category = ?1 AND updated_at < ?2",
                    params![category, cutoff],
                )?;
            }
            let stale = delete_stale_relations(&tx)?;
            let orphaned = delete_orphaned_entities(&tx)?;
            tx.commit()?;
            Ok((expired, stale, orphaned))
        })
        .await
        .map_err(map_tr_err)?;

    if expired > 0 || stale > 0 || orphaned > 0 {
        info!(expired, stale, orphaned, "retention sweep finished");
    }
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::queries::{graph, records};

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn backdate(db: &Database, key: &str, timestamp: &str) {
        let key = key.to_string();
        let timestamp = timestamp.to_string();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE memories SET updated_at = ?1 WHERE key = ?2",
                    params![timestamp, key],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn expires_old_records_per_category() {
        let db = test_db().await;
        records::store(&db, "old_note", "stale", MemoryCategory::Conversation, "")
            .await
            .unwrap();
        records::store(&db, "new_note", "fresh", MemoryCategory::Conversation, "")
            .await
            .unwrap();
        records::store(&db, "old_daily", "kept", MemoryCategory::Daily, "")
            .await
            .unwrap();
        backdate(&db, "old_note", "2020-01-01T00:00:00.000Z").await;
        backdate(&db, "old_daily", "2020-01-01T00:00:00.000Z").await;

        let mut windows = HashMap::new();
        windows.insert(MemoryCategory::Conversation, 7);
        let expired = run_retention(&db, &windows).await.unwrap();

        assert_eq!(expired, 1);
        assert!(records::get(&db, "old_note").await.unwrap().is_none());
        assert!(records::get(&db, "new_note").await.unwrap().is_some());
        // No window configured for daily, so it stays.
        assert!(records::get(&db, "old_daily").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn core_and_non_positive_windows_never_expire() {
        let db = test_db().await;
        records::store(&db, "core_fact", "keep", MemoryCategory::Core, "")
            .await
            .unwrap();
        records::store(&db, "custom_fact", "keep", MemoryCategory::Custom, "")
            .await
            .unwrap();
        backdate(&db, "core_fact", "2020-01-01T00:00:00.000Z").await;
        backdate(&db, "custom_fact", "2020-01-01T00:00:00.000Z").await;

        let mut windows = HashMap::new();
        windows.insert(MemoryCategory::Core, 1);
        windows.insert(MemoryCategory::Custom, -1);
        let expired = run_retention(&db, &windows).await.unwrap();

        assert_eq!(expired, 0);
        assert_eq!(records::count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn sweep_cascades_into_graph_cleanup() {
        let db = test_db().await;
        records::store(&db, "temp_fact", "Alice is here", MemoryCategory::Conversation, "")
            .await
            .unwrap();
        graph::add_relation(&db, "Alice", "mentioned_in", "TempChat", "temp_fact")
            .await
            .unwrap();
        backdate(&db, "temp_fact", "2020-01-01T00:00:00.000Z").await;

        let mut windows = HashMap::new();
        windows.insert(MemoryCategory::Conversation, 1);
        let expired = run_retention(&db, &windows).await.unwrap();

        assert_eq!(expired, 1);
        let names = graph::all_entity_names(&db).await.unwrap();
        assert!(names.is_empty(), "expected orphan cleanup, got {names:?}");
    }

    #[tokio::test]
    async fn graph_cleanup_runs_even_without_expiry() {
        let db = test_db().await;
        graph::add_relation(&db, "A", "links", "B", "never_existed")
            .await
            .unwrap();

        let expired = run_retention(&db, &HashMap::new()).await.unwrap();
        assert_eq!(expired, 0);
        // The dangling edge and both its endpoints are still reaped.
        assert!(graph::all_entity_names(&db).await.unwrap().is_empty());
    }
}
