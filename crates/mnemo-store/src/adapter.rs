// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MemoryStore trait.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use mnemo_core::{
    Entity, GraphNode, MemoryCategory, MemoryRecord, MemoryStore, MnemoError, SearchHit,
};

use crate::database::Database;
use crate::{legacy, queries, snapshot};

/// SQLite-backed memory store.
///
/// Wraps a [`Database`] handle and delegates every operation to the typed
/// query modules. Opening runs the full bootstrap sequence (pragmas, schema,
/// self-repair), so a freshly constructed store is ready for use.
pub struct SqliteMemory {
    db: Database,
}

impl SqliteMemory {
    /// Open (or create) the store at `path`.
    pub async fn open(path: &Path) -> Result<Self, MnemoError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Open an in-memory store. State is lost when the handle drops.
    pub async fn open_in_memory() -> Result<Self, MnemoError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }
}

#[async_trait]
impl MemoryStore for SqliteMemory {
    // --- Record operations ---

    async fn store(
        &self,
        key: &str,
        content: &str,
        category: MemoryCategory,
        owner: &str,
    ) -> Result<(), MnemoError> {
        queries::records::store(&self.db, key, content, category, owner).await
    }

    async fn get(&self, key: &str) -> Result<Option<MemoryRecord>, MnemoError> {
        queries::records::get(&self.db, key).await
    }

    async fn get_by_owner(
        &self,
        key: &str,
        owner: &str,
    ) -> Result<Option<MemoryRecord>, MnemoError> {
        queries::records::get_by_owner(&self.db, key, owner).await
    }

    async fn delete(&self, key: &str) -> Result<bool, MnemoError> {
        queries::records::delete(&self.db, key).await
    }

    async fn delete_by_owner(&self, key: &str, owner: &str) -> Result<bool, MnemoError> {
        queries::records::delete_by_owner(&self.db, key, owner).await
    }

    async fn delete_accessible(&self, key: &str, owner: &str) -> Result<bool, MnemoError> {
        queries::records::delete_accessible(&self.db, key, owner).await
    }

    async fn list(
        &self,
        category: Option<MemoryCategory>,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<MemoryRecord>, MnemoError> {
        queries::records::list(&self.db, category, limit, owner).await
    }

    async fn list_recent(
        &self,
        categories: &[MemoryCategory],
        days: i64,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<MemoryRecord>, MnemoError> {
        queries::records::list_recent(&self.db, categories, days, limit, owner).await
    }

    async fn count(&self) -> Result<i64, MnemoError> {
        queries::records::count(&self.db).await
    }

    async fn count_by_category(&self, category: MemoryCategory) -> Result<i64, MnemoError> {
        queries::records::count_by_category(&self.db, category).await
    }

    // --- Full-text search ---

    async fn search(
        &self,
        query: &str,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<SearchHit>, MnemoError> {
        queries::search::search(&self.db, query, limit, owner).await
    }

    async fn search_by_category(
        &self,
        query: &str,
        category: MemoryCategory,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<SearchHit>, MnemoError> {
        queries::search::search_by_category(&self.db, query, category, limit, owner).await
    }

    // --- Knowledge graph ---

    async fn upsert_entity(&self, name: &str, entity_type: &str) -> Result<i64, MnemoError> {
        queries::graph::upsert_entity(&self.db, name, entity_type).await
    }

    async fn add_relation(
        &self,
        source: &str,
        relation: &str,
        target: &str,
        memory_key: &str,
    ) -> Result<(), MnemoError> {
        queries::graph::add_relation(&self.db, source, relation, target, memory_key).await
    }

    async fn remove_relations_by_memory_key(
        &self,
        memory_key: &str,
    ) -> Result<usize, MnemoError> {
        queries::graph::remove_relations_by_memory_key(&self.db, memory_key).await
    }

    async fn find_entities(&self, names: &[String]) -> Result<Vec<Entity>, MnemoError> {
        queries::graph::find_entities(&self.db, names).await
    }

    async fn all_entity_names(&self) -> Result<Vec<String>, MnemoError> {
        queries::graph::all_entity_names(&self.db).await
    }

    async fn walk_graph(
        &self,
        seeds: &[String],
        max_hops: usize,
        max_nodes: usize,
    ) -> Result<Vec<GraphNode>, MnemoError> {
        queries::graph::walk_graph(&self.db, seeds, max_hops, max_nodes).await
    }

    async fn walk_graph_for_owner(
        &self,
        seeds: &[String],
        max_hops: usize,
        max_nodes: usize,
        owner: &str,
    ) -> Result<Vec<GraphNode>, MnemoError> {
        queries::graph::walk_graph_for_owner(&self.db, seeds, max_hops, max_nodes, owner).await
    }

    // --- Maintenance ---

    async fn clean_stale_relations(&self) -> Result<usize, MnemoError> {
        queries::graph::clean_stale_relations(&self.db).await
    }

    async fn clean_orphaned_entities(&self) -> Result<usize, MnemoError> {
        queries::graph::clean_orphaned_entities(&self.db).await
    }

    async fn run_retention(
        &self,
        retention_days: &HashMap<MemoryCategory, i64>,
    ) -> Result<usize, MnemoError> {
        queries::retention::run_retention(&self.db, retention_days).await
    }

    // --- Migration & snapshots ---

    async fn migrate_from_markdown(&self, legacy_dir: &Path) -> Result<(), MnemoError> {
        legacy::migrate_from_markdown(&self.db, legacy_dir).await
    }

    async fn export_snapshot(&self, path: &Path) -> Result<(), MnemoError> {
        snapshot::export_snapshot(&self.db, path).await
    }

    async fn import_snapshot(&self, path: &Path) -> Result<usize, MnemoError> {
        snapshot::import_snapshot(&self.db, path).await
    }

    async fn close(&self) -> Result<(), MnemoError> {
        self.db.close().await
    }
}
