// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory-store trait consumed by context assembly and tool layers.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::{Entity, GraphNode, MemoryCategory, MemoryRecord, SearchHit};

/// Persistent memory and knowledge-graph store.
///
/// A single shared instance is used concurrently by request tasks and the
/// background retention sweeper; every method is safe under concurrent
/// invocation. Lookup misses and refused scoped deletes are expected
/// outcomes (`Ok(None)` / `Ok(false)`), not errors.
#[async_trait]
pub trait MemoryStore: Send + Sync + 'static {
    /// Store a fact under `key`, replacing any existing record for that key
    /// across all owners. `created_at` is carried over from the record it
    /// replaces. Empty `key` or `content` is rejected.
    async fn store(
        &self,
        key: &str,
        content: &str,
        category: MemoryCategory,
        owner: &str,
    ) -> Result<(), MnemoError>;

    /// Exact lookup by key, ignoring ownership.
    async fn get(&self, key: &str) -> Result<Option<MemoryRecord>, MnemoError>;

    /// Exact lookup by key and owner. No shared fallback: returns `None`
    /// unless the stored owner matches exactly.
    async fn get_by_owner(&self, key: &str, owner: &str)
    -> Result<Option<MemoryRecord>, MnemoError>;

    /// Unconditional delete. Returns whether a record was removed.
    async fn delete(&self, key: &str) -> Result<bool, MnemoError>;

    /// Delete only if the stored owner equals `owner` exactly (empty owner
    /// targets shared records only).
    async fn delete_by_owner(&self, key: &str, owner: &str) -> Result<bool, MnemoError>;

    /// Delete if the record is shared or owned by `owner`; refuses (returns
    /// `false`, no mutation) when it belongs to a different owner.
    async fn delete_accessible(&self, key: &str, owner: &str) -> Result<bool, MnemoError>;

    /// List records, newest update first. Non-empty `owner` sees shared
    /// records plus their own; empty `owner` sees everything. `limit <= 0`
    /// falls back to 20.
    async fn list(
        &self,
        category: Option<MemoryCategory>,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<MemoryRecord>, MnemoError>;

    /// List records in any of `categories` updated within the last `days`
    /// days, newest first. Empty `categories` yields nothing. `limit <= 0`
    /// falls back to 10.
    async fn list_recent(
        &self,
        categories: &[MemoryCategory],
        days: i64,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<MemoryRecord>, MnemoError>;

    /// Total number of live records.
    async fn count(&self) -> Result<i64, MnemoError>;

    /// Number of live records in `category`.
    async fn count_by_category(&self, category: MemoryCategory) -> Result<i64, MnemoError>;

    /// Full-text search over key and content. Hits carry a BM25 rank
    /// (negative; more negative = more relevant). Owner filtering matches
    /// [`list`](MemoryStore::list). `limit <= 0` falls back to 20.
    async fn search(&self, query: &str, limit: i64, owner: &str)
    -> Result<Vec<SearchHit>, MnemoError>;

    /// Full-text search restricted to one category.
    async fn search_by_category(
        &self,
        query: &str,
        category: MemoryCategory,
        limit: i64,
        owner: &str,
    ) -> Result<Vec<SearchHit>, MnemoError>;

    /// Insert or update an entity, returning its id. Upserting with type
    /// "thing" never downgrades an already-typed entity; any other type
    /// overwrites.
    async fn upsert_entity(&self, name: &str, entity_type: &str) -> Result<i64, MnemoError>;

    /// Upsert the directed edge (source, relation, target). Missing entities
    /// are created as "thing"; re-adding an existing triple updates its
    /// `memory_key` instead of duplicating.
    async fn add_relation(
        &self,
        source: &str,
        relation: &str,
        target: &str,
        memory_key: &str,
    ) -> Result<(), MnemoError>;

    /// Remove every relation backed by `memory_key`. Returns the number
    /// removed.
    async fn remove_relations_by_memory_key(&self, memory_key: &str)
    -> Result<usize, MnemoError>;

    /// Case-insensitive bulk lookup of entities by name.
    async fn find_entities(&self, names: &[String]) -> Result<Vec<Entity>, MnemoError>;

    /// All entity names, sorted ascending.
    async fn all_entity_names(&self) -> Result<Vec<String>, MnemoError>;

    /// Bounded breadth-first traversal from `seeds` (case-insensitive,
    /// depth 0). Edges are bidirectional for traversal. Never visits deeper
    /// than `max_hops` nor returns more than `max_nodes` entities; output
    /// order is deterministic (depth, then entity id).
    async fn walk_graph(
        &self,
        seeds: &[String],
        max_hops: usize,
        max_nodes: usize,
    ) -> Result<Vec<GraphNode>, MnemoError>;

    /// [`walk_graph`](MemoryStore::walk_graph) with owner filtering: an edge
    /// is traversable only when its `memory_key` is empty or resolves to a
    /// record that is shared or owned by `owner`. Empty `owner` disables
    /// filtering.
    async fn walk_graph_for_owner(
        &self,
        seeds: &[String],
        max_hops: usize,
        max_nodes: usize,
        owner: &str,
    ) -> Result<Vec<GraphNode>, MnemoError>;

    /// Delete relations whose non-empty `memory_key` no longer matches any
    /// live record. Returns the number removed.
    async fn clean_stale_relations(&self) -> Result<usize, MnemoError>;

    /// Delete entities that are neither source nor target of any relation.
    /// Returns the number removed.
    async fn clean_orphaned_entities(&self) -> Result<usize, MnemoError>;

    /// Run the retention pipeline: expire aged records per category window
    /// (days <= 0 and `Core` never expire), then sweep stale relations and
    /// orphaned entities. The three stages run as one atomic unit. Returns
    /// the number of records expired.
    async fn run_retention(
        &self,
        retention_days: &HashMap<MemoryCategory, i64>,
    ) -> Result<usize, MnemoError>;

    /// One-time import of legacy markdown memory files from `legacy_dir`.
    /// Gated by a persisted flag; never overwrites keys already present.
    async fn migrate_from_markdown(&self, legacy_dir: &Path) -> Result<(), MnemoError>;

    /// Export all shared core records to a human-readable snapshot file.
    /// No file is written when there is nothing to export.
    async fn export_snapshot(&self, path: &Path) -> Result<(), MnemoError>;

    /// Import a snapshot file (current or legacy `---` format), upserting
    /// by key. Returns the number of records imported.
    async fn import_snapshot(&self, path: &Path) -> Result<usize, MnemoError>;

    /// Flush and close the store. Safe to call once at shutdown; the store
    /// is unusable afterwards.
    async fn close(&self) -> Result<(), MnemoError>;
}
