// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge graph: entities, relations, and bounded traversal.
//!
//! Traversal runs entirely on the connection thread. It is synchronous
//! and bounded by `max_hops`/`max_nodes`, so it terminates even on a
//! fully connected graph; those bounds are the cancellation mechanism.

use std::collections::{HashMap, HashSet, VecDeque};

use mnemo_core::{Entity, GraphNode, MnemoError, Relation};
use rusqlite::{Connection, params};

use crate::database::{Database, map_tr_err};

/// Insert an entity or update its type, returning its id.
///
/// An empty type defaults to "thing". Upserting as "thing" never
/// downgrades an entity that already has a specific type; any other
/// type overwrites.
pub async fn upsert_entity(
    db: &Database,
    name: &str,
    entity_type: &str,
) -> Result<i64, MnemoError> {
    if name.trim().is_empty() {
        return Err(MnemoError::InvalidInput(
            "entity name must not be empty".into(),
        ));
    }
    let name = name.to_string();
    let entity_type = entity_type.to_string();
    db.connection()
        .call(move |conn| upsert_entity_sync(conn, &name, &entity_type))
        .await
        .map_err(map_tr_err)
}

fn upsert_entity_sync(
    conn: &Connection,
    name: &str,
    entity_type: &str,
) -> rusqlite::Result<i64> {
    let entity_type = if entity_type.is_empty() {
        "thing"
    } else {
        entity_type
    };
    conn.execute(
        "INSERT INTO entities (name, type) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET type = CASE
            WHEN excluded.type != 'thing' THEN excluded.type
            ELSE entities.type
         END",
        params![name, entity_type],
    )?;
    conn.query_row(
        "SELECT id FROM entities WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
}

/// Create or update a relation between two entities named by the caller.
///
/// Missing entities are auto-created as "thing". Re-adding an existing
/// (source, relation, target) triple updates its memory_key instead of
/// duplicating the edge. The two upserts and the edge write happen in
/// one transaction.
pub async fn add_relation(
    db: &Database,
    source: &str,
    relation: &str,
    target: &str,
    memory_key: &str,
) -> Result<(), MnemoError> {
    if source.trim().is_empty() || target.trim().is_empty() {
        return Err(MnemoError::InvalidInput(
            "relation endpoints must not be empty".into(),
        ));
    }
    let source = source.to_string();
    let relation = relation.to_string();
    let target = target.to_string();
    let memory_key = memory_key.to_string();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let source_id = upsert_entity_sync(&tx, &source, "thing")?;
            let target_id = upsert_entity_sync(&tx, &target, "thing")?;
            tx.execute(
                "INSERT INTO relations (source_id, relation, target_id, memory_key)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(source_id, relation, target_id) DO UPDATE SET
                    memory_key = excluded.memory_key",
                params![source_id, relation, target_id, memory_key],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every relation linked to a memory key. Returns the count removed.
pub async fn remove_relations_by_memory_key(
    db: &Database,
    memory_key: &str,
) -> Result<usize, MnemoError> {
    let memory_key = memory_key.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM relations WHERE memory_key = ?1",
                params![memory_key],
            )?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up entities by name, case-insensitively.
pub async fn find_entities(db: &Database, names: &[String]) -> Result<Vec<Entity>, MnemoError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let names = names.to_vec();
    db.connection()
        .call(move |conn| find_entities_sync(conn, &names))
        .await
        .map_err(map_tr_err)
}

fn find_entities_sync(conn: &Connection, names: &[String]) -> rusqlite::Result<Vec<Entity>> {
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let placeholders = vec!["?"; lowered.len()].join(", ");
    let sql = format!(
        "SELECT id, name, type FROM entities WHERE LOWER(name) IN ({placeholders}) ORDER BY id"
    );
    let args: Vec<&dyn rusqlite::ToSql> =
        lowered.iter().map(|n| n as &dyn rusqlite::ToSql).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args.as_slice(), entity_from_row)?;
    rows.collect()
}

/// All entity names, alphabetically.
pub async fn all_entity_names(db: &Database) -> Result<Vec<String>, MnemoError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM entities ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Breadth-first traversal from the named seed entities.
///
/// Every relation is traversable in both directions. Nodes stop
/// expanding past `max_hops`; the walk stops entirely once `max_nodes`
/// entities are visited, seeds included. Each expanded node carries its
/// full relation list; nodes at the hop boundary keep an empty one.
/// Results are ordered by depth, then entity id, so repeated walks over
/// unchanged data return identical output.
pub async fn walk_graph(
    db: &Database,
    seeds: &[String],
    max_hops: usize,
    max_nodes: usize,
) -> Result<Vec<GraphNode>, MnemoError> {
    walk(db, seeds.to_vec(), max_hops, max_nodes, None).await
}

/// Owner-scoped traversal.
///
/// A relation is traversable only when its memory_key is empty (no
/// owner-scoped payload) or points to a record that is shared or owned
/// by `owner`. Node relation lists are filtered the same way, so one
/// owner's private edges never leak into another owner's walk. An empty
/// owner disables filtering.
pub async fn walk_graph_for_owner(
    db: &Database,
    seeds: &[String],
    max_hops: usize,
    max_nodes: usize,
    owner: &str,
) -> Result<Vec<GraphNode>, MnemoError> {
    let scope = if owner.is_empty() {
        None
    } else {
        Some(owner.to_string())
    };
    walk(db, seeds.to_vec(), max_hops, max_nodes, scope).await
}

async fn walk(
    db: &Database,
    seeds: Vec<String>,
    max_hops: usize,
    max_nodes: usize,
    owner: Option<String>,
) -> Result<Vec<GraphNode>, MnemoError> {
    if seeds.is_empty() {
        return Ok(Vec::new());
    }

    db.connection()
        .call(move |conn| {
            let seed_entities = find_entities_sync(conn, &seeds)?;
            if seed_entities.is_empty() {
                return Ok(Vec::new());
            }
            let accessible = match &owner {
                Some(owner) => Some(accessible_memory_keys(conn, owner)?),
                None => None,
            };

            let mut visited: HashMap<i64, GraphNode> = HashMap::new();
            let mut queue: VecDeque<(i64, usize)> = VecDeque::new();

            for entity in seed_entities {
                if visited.len() >= max_nodes {
                    break;
                }
                let id = entity.id;
                visited.insert(
                    id,
                    GraphNode {
                        entity,
                        depth: 0,
                        relations: Vec::new(),
                    },
                );
                queue.push_back((id, 0));
            }

            loop {
                if visited.len() >= max_nodes {
                    break;
                }
                let Some((id, depth)) = queue.pop_front() else {
                    break;
                };
                if depth >= max_hops {
                    continue;
                }

                let mut relations = relations_for_entity(conn, id)?;
                if let Some(keys) = &accessible {
                    relations
                        .retain(|r| r.memory_key.is_empty() || keys.contains(&r.memory_key));
                }

                for rel in &relations {
                    let neighbor_id = if rel.target_id == id {
                        rel.source_id
                    } else {
                        rel.target_id
                    };
                    if visited.contains_key(&neighbor_id) {
                        continue;
                    }
                    if visited.len() >= max_nodes {
                        break;
                    }
                    let Some(entity) = entity_by_id(conn, neighbor_id)? else {
                        continue;
                    };
                    visited.insert(
                        neighbor_id,
                        GraphNode {
                            entity,
                            depth: depth + 1,
                            relations: Vec::new(),
                        },
                    );
                    queue.push_back((neighbor_id, depth + 1));
                }

                if let Some(node) = visited.get_mut(&id) {
                    node.relations = relations;
                }
            }

            let mut nodes: Vec<GraphNode> = visited.into_values().collect();
            nodes.sort_by(|a, b| a.depth.cmp(&b.depth).then(a.entity.id.cmp(&b.entity.id)));
            Ok(nodes)
        })
        .await
        .map_err(map_tr_err)
}

/// Keys visible to an owner: shared records plus the owner's records.
fn accessible_memory_keys(conn: &Connection, owner: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT key FROM memories WHERE owner = '' OR owner = ?1")?;
    let rows = stmt.query_map(params![owner], |row| row.get(0))?;
    rows.collect()
}

fn relations_for_entity(conn: &Connection, entity_id: i64) -> rusqlite::Result<Vec<Relation>> {
    let mut stmt = conn.prepare(
        "SELECT id, source_id, relation, target_id, memory_key, weight, created_at
         FROM relations WHERE source_id = ?1 OR target_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![entity_id], |row| {
        Ok(Relation {
            id: row.get(0)?,
            source_id: row.get(1)?,
            relation: row.get(2)?,
            target_id: row.get(3)?,
            memory_key: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            weight: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;
    rows.collect()
}

fn entity_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Entity>> {
    let result = conn.query_row(
        "SELECT id, name, type FROM entities WHERE id = ?1",
        params![id],
        entity_from_row,
    );
    match result {
        Ok(entity) => Ok(Some(entity)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

fn entity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity> {
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        entity_type: row.get(2)?,
    })
}

/// Delete relations whose memory_key points at a record that no longer
/// exists. NULL and empty keys are never stale. Returns the count removed.
pub async fn clean_stale_relations(db: &Database) -> Result<usize, MnemoError> {
    db.connection()
        .call(|conn| {
            let removed = delete_stale_relations(conn)?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete entities that are neither source nor target of any relation.
/// Returns the count removed.
pub async fn clean_orphaned_entities(db: &Database) -> Result<usize, MnemoError> {
    db.connection()
        .call(|conn| {
            let removed = delete_orphaned_entities(conn)?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

pub(crate) fn delete_stale_relations(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM relations
         WHERE memory_key IS NOT NULL AND memory_key != ''
           AND memory_key NOT IN (SELECT key FROM memories)",
        [],
    )
}

pub(crate) fn delete_orphaned_entities(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM entities WHERE id NOT IN (
             SELECT source_id FROM relations
             UNION
             SELECT target_id FROM relations
         )",
        [],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn names(nodes: &[GraphNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.entity.name.as_str()).collect()
    }

    #[tokio::test]
    async fn upsert_entity_returns_stable_id() {
        let db = test_db().await;
        let id1 = upsert_entity(&db, "Alice", "person").await.unwrap();
        let id2 = upsert_entity(&db, "Alice", "person").await.unwrap();
        assert!(id1 > 0);
        assert_eq!(id1, id2);
    }

    #[tokio::test]
    async fn upsert_entity_defaults_and_preserves_type() {
        let db = test_db().await;
        upsert_entity(&db, "Something", "").await.unwrap();
        let found = find_entities(&db, &["something".to_string()])
            .await
            .unwrap();
        assert_eq!(found[0].entity_type, "thing");

        upsert_entity(&db, "Alice", "person").await.unwrap();
        upsert_entity(&db, "Alice", "thing").await.unwrap();
        let found = find_entities(&db, &["alice".to_string()]).await.unwrap();
        assert_eq!(found[0].entity_type, "person");

        upsert_entity(&db, "Alice", "concept").await.unwrap();
        let found = find_entities(&db, &["alice".to_string()]).await.unwrap();
        assert_eq!(found[0].entity_type, "concept");
    }

    #[tokio::test]
    async fn add_relation_auto_creates_and_upserts() {
        let db = test_db().await;
        add_relation(&db, "Alice", "works_on", "Halcyon", "key1")
            .await
            .unwrap();
        add_relation(&db, "Alice", "works_on", "Halcyon", "key2")
            .await
            .unwrap();

        let entities = find_entities(&db, &["alice".into(), "halcyon".into()])
            .await
            .unwrap();
        assert_eq!(entities.len(), 2);

        let nodes = walk_graph(&db, &["Alice".to_string()], 1, 10).await.unwrap();
        let alice = nodes.iter().find(|n| n.entity.name == "Alice").unwrap();
        assert_eq!(alice.relations.len(), 1);
        assert_eq!(alice.relations[0].memory_key, "key2");
    }

    #[tokio::test]
    async fn remove_relations_by_key_leaves_others() {
        let db = test_db().await;
        add_relation(&db, "Alice", "works_on", "Halcyon", "team_info")
            .await
            .unwrap();
        add_relation(&db, "Alice", "knows", "Bob", "team_info")
            .await
            .unwrap();
        add_relation(&db, "Bob", "lives_in", "Tokyo", "bob_location")
            .await
            .unwrap();

        let removed = remove_relations_by_memory_key(&db, "team_info")
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let nodes = walk_graph(&db, &["Bob".to_string()], 1, 10).await.unwrap();
        let bob = nodes.iter().find(|n| n.entity.name == "Bob").unwrap();
        assert_eq!(bob.relations.len(), 1);
        assert_eq!(bob.relations[0].memory_key, "bob_location");
    }

    #[tokio::test]
    async fn find_entities_is_case_insensitive() {
        let db = test_db().await;
        upsert_entity(&db, "Alice", "person").await.unwrap();
        upsert_entity(&db, "Halcyon", "project").await.unwrap();

        let found = find_entities(&db, &["ALICE".into(), "halcyon".into()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let none = find_entities(&db, &[]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn entity_names_are_sorted() {
        let db = test_db().await;
        upsert_entity(&db, "Bob", "person").await.unwrap();
        upsert_entity(&db, "Alice", "person").await.unwrap();
        upsert_entity(&db, "Halcyon", "project").await.unwrap();

        let names = all_entity_names(&db).await.unwrap();
        assert_eq!(names, vec!["Alice", "Bob", "Halcyon"]);
    }

    #[tokio::test]
    async fn walk_tracks_depth() {
        let db = test_db().await;
        add_relation(&db, "A", "knows", "B", "m1").await.unwrap();
        add_relation(&db, "B", "knows", "C", "m2").await.unwrap();

        let nodes = walk_graph(&db, &["A".to_string()], 2, 10).await.unwrap();
        let depth: HashMap<&str, usize> = nodes
            .iter()
            .map(|n| (n.entity.name.as_str(), n.depth))
            .collect();
        assert_eq!(depth["A"], 0);
        assert_eq!(depth["B"], 1);
        assert_eq!(depth["C"], 2);
    }

    #[tokio::test]
    async fn walk_respects_max_hops() {
        let db = test_db().await;
        add_relation(&db, "A", "knows", "B", "m1").await.unwrap();
        add_relation(&db, "B", "knows", "C", "m2").await.unwrap();
        add_relation(&db, "C", "knows", "D", "m3").await.unwrap();

        let nodes = walk_graph(&db, &["A".to_string()], 1, 10).await.unwrap();
        let found = names(&nodes);
        assert!(found.contains(&"A") && found.contains(&"B"));
        assert!(!found.contains(&"C") && !found.contains(&"D"));
    }

    #[tokio::test]
    async fn walk_respects_max_nodes() {
        let db = test_db().await;
        for i in 0..10 {
            add_relation(&db, "Center", "connects", &format!("N{i}"), "m")
                .await
                .unwrap();
        }

        let nodes = walk_graph(&db, &["Center".to_string()], 1, 3)
            .await
            .unwrap();
        assert!(nodes.len() <= 3);
    }

    #[tokio::test]
    async fn walk_is_bidirectional() {
        let db = test_db().await;
        add_relation(&db, "Alice", "works_on", "Halcyon", "m1")
            .await
            .unwrap();

        let nodes = walk_graph(&db, &["Halcyon".to_string()], 1, 10)
            .await
            .unwrap();
        let found = names(&nodes);
        assert!(found.contains(&"Halcyon") && found.contains(&"Alice"));
    }

    #[tokio::test]
    async fn walk_handles_multiple_seeds() {
        let db = test_db().await;
        add_relation(&db, "Alice", "works_on", "Halcyon", "m1")
            .await
            .unwrap();
        add_relation(&db, "Charlie", "lives_in", "Tokyo", "m2")
            .await
            .unwrap();

        let nodes = walk_graph(&db, &["Alice".to_string(), "Charlie".to_string()], 1, 10)
            .await
            .unwrap();
        let found = names(&nodes);
        for name in ["Alice", "Halcyon", "Charlie", "Tokyo"] {
            assert!(found.contains(&name), "missing {name}");
        }
    }

    #[tokio::test]
    async fn walk_unknown_seed_is_empty() {
        let db = test_db().await;
        let nodes = walk_graph(&db, &["NonExistent".to_string()], 2, 10)
            .await
            .unwrap();
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn walk_output_is_deterministic() {
        let db = test_db().await;
        add_relation(&db, "Hub", "links", "A", "m1").await.unwrap();
        add_relation(&db, "Hub", "links", "B", "m2").await.unwrap();
        add_relation(&db, "Hub", "links", "C", "m3").await.unwrap();

        let first = walk_graph(&db, &["Hub".to_string()], 2, 10).await.unwrap();
        for _ in 0..5 {
            let again = walk_graph(&db, &["Hub".to_string()], 2, 10).await.unwrap();
            let a: Vec<(i64, usize)> = first.iter().map(|n| (n.entity.id, n.depth)).collect();
            let b: Vec<(i64, usize)> = again.iter().map(|n| (n.entity.id, n.depth)).collect();
            assert_eq!(a, b);
        }
    }

    #[tokio::test]
    async fn owner_scoped_walk_skips_private_edges() {
        let db = test_db().await;
        crate::queries::records::store(
            &db,
            "bobs_secret",
            "private data",
            mnemo_core::MemoryCategory::Core,
            "bob",
        )
        .await
        .unwrap();
        crate::queries::records::store(
            &db,
            "shared_fact",
            "public data",
            mnemo_core::MemoryCategory::Core,
            "",
        )
        .await
        .unwrap();
        add_relation(&db, "Alice", "knows_about", "Secret", "bobs_secret")
            .await
            .unwrap();
        add_relation(&db, "Alice", "works_on", "Halcyon", "shared_fact")
            .await
            .unwrap();
        add_relation(&db, "Alice", "likes", "Coffee", "").await.unwrap();

        let nodes = walk_graph_for_owner(&db, &["Alice".to_string()], 2, 10, "carol")
            .await
            .unwrap();
        let found = names(&nodes);
        assert!(!found.contains(&"Secret"), "private edge leaked");
        assert!(found.contains(&"Halcyon"), "shared edge missing");
        assert!(found.contains(&"Coffee"), "unkeyed edge missing");

        // bob sees his own edge
        let nodes = walk_graph_for_owner(&db, &["Alice".to_string()], 2, 10, "bob")
            .await
            .unwrap();
        assert!(names(&nodes).contains(&"Secret"));

        // empty owner disables filtering
        let nodes = walk_graph_for_owner(&db, &["Alice".to_string()], 2, 10, "")
            .await
            .unwrap();
        assert!(names(&nodes).contains(&"Secret"));
    }

    #[tokio::test]
    async fn clean_stale_relations_spares_unkeyed() {
        let db = test_db().await;
        crate::queries::records::store(
            &db,
            "live_key",
            "content",
            mnemo_core::MemoryCategory::Core,
            "",
        )
        .await
        .unwrap();
        add_relation(&db, "A", "r1", "B", "live_key").await.unwrap();
        add_relation(&db, "A", "r2", "C", "gone_key").await.unwrap();
        add_relation(&db, "A", "r3", "D", "").await.unwrap();

        let removed = clean_stale_relations(&db).await.unwrap();
        assert_eq!(removed, 1);

        let nodes = walk_graph(&db, &["A".to_string()], 1, 10).await.unwrap();
        let a = nodes.iter().find(|n| n.entity.name == "A").unwrap();
        assert_eq!(a.relations.len(), 2);
    }

    #[tokio::test]
    async fn clean_orphaned_entities_removes_unconnected() {
        let db = test_db().await;
        add_relation(&db, "Alice", "works_on", "Halcyon", "m1")
            .await
            .unwrap();
        upsert_entity(&db, "Orphan", "thing").await.unwrap();

        assert_eq!(clean_orphaned_entities(&db).await.unwrap(), 1);
        assert!(
            find_entities(&db, &["orphan".to_string()])
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(clean_orphaned_entities(&db).await.unwrap(), 0);

        remove_relations_by_memory_key(&db, "m1").await.unwrap();
        assert_eq!(clean_orphaned_entities(&db).await.unwrap(), 2);
    }
}
