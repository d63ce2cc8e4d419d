// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Mnemo workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Retention category of a memory record.
///
/// Category determines retention policy, never visibility. `Core` records
/// are never expired by the retention sweep.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    Core,
    Daily,
    Conversation,
    Custom,
}

impl MemoryCategory {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Core => "core",
            MemoryCategory::Daily => "daily",
            MemoryCategory::Conversation => "conversation",
            MemoryCategory::Custom => "custom",
        }
    }

    /// Parse from a caller-supplied string. Unknown or empty values
    /// normalize to `Core`.
    pub fn from_str_value(s: &str) -> Self {
        s.trim().parse().unwrap_or(MemoryCategory::Core)
    }
}

/// A single durable fact.
///
/// At most one live record exists per `key`, regardless of owner. An empty
/// `owner` marks the record as shared (visible to every caller); a non-empty
/// owner restricts visibility to that owner plus shared records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned identifier, monotonically increasing, never reused.
    pub id: i64,
    /// Caller-supplied key, globally unique among live records.
    pub key: String,
    /// The fact content.
    pub content: String,
    /// Retention category.
    pub category: MemoryCategory,
    /// Owning user; empty string means shared.
    pub owner: String,
    /// ISO 8601 creation timestamp; preserved across updates to the same key.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
}

/// A record matched by full-text search, with its BM25 rank.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matched record.
    pub record: MemoryRecord,
    /// BM25 rank as reported by the index: negative, and more negative
    /// means more relevant. Callers threshold with `rank < -min_relevance`.
    pub rank: f64,
}

/// A knowledge-graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Store-assigned identifier.
    pub id: i64,
    /// Globally unique name. Stored case-sensitively, looked up
    /// case-insensitively.
    pub name: String,
    /// Free-form type label ("person", "project", ...); defaults to "thing".
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// A directed, typed edge between two entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Store-assigned identifier.
    pub id: i64,
    /// Source entity id.
    pub source_id: i64,
    /// Edge label ("works_on", "lives_in", ...).
    pub relation: String,
    /// Target entity id.
    pub target_id: i64,
    /// Soft link to the memory record backing this edge; empty when the
    /// edge carries no record-scoped payload. Never a foreign key: the
    /// record may be deleted first and the edge swept later.
    pub memory_key: String,
    /// Edge weight.
    pub weight: f64,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// One entity visited by a graph walk, with its traversal depth and the
/// relations discovered when the node was expanded.
///
/// Nodes sitting exactly at the hop limit are returned without relations:
/// they were reached but never expanded.
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    /// The visited entity.
    pub entity: Entity,
    /// Hops from the nearest seed (seeds are depth 0).
    pub depth: usize,
    /// Incoming and outgoing relations recorded at expansion time.
    pub relations: Vec<Relation>,
}
