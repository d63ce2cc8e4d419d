// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo graph` command implementation.
//!
//! Walks the knowledge graph outward from seed entities and prints the
//! visited nodes grouped by depth, with each node's edges underneath.

use std::collections::HashMap;

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryStore, MnemoError, Relation};
use mnemo_store::SqliteMemory;

/// Run the `mnemo graph` command.
pub async fn run_graph(
    config: &MnemoConfig,
    seeds: &[String],
    hops: usize,
    nodes: usize,
    owner: &str,
) -> Result<(), MnemoError> {
    let store = SqliteMemory::open(&config.database_path()).await?;
    let walked = store
        .walk_graph_for_owner(seeds, hops, nodes, owner)
        .await?;
    store.close().await?;

    if walked.is_empty() {
        println!("no entities match the seeds");
        return Ok(());
    }

    let names: HashMap<i64, String> = walked
        .iter()
        .map(|node| (node.entity.id, node.entity.name.clone()))
        .collect();

    for node in &walked {
        println!(
            "[depth {}] {} ({})",
            node.depth, node.entity.name, node.entity.entity_type
        );
        for relation in &node.relations {
            println!("    {}", format_relation(relation, node.entity.id, &names));
        }
    }
    println!("{} entit(ies)", walked.len());
    Ok(())
}

/// Render an edge from the perspective of the node it is listed under.
///
/// Endpoints outside the visited set (cut off by the node budget) print
/// as `#id`.
fn format_relation(relation: &Relation, self_id: i64, names: &HashMap<i64, String>) -> String {
    let name = |id: i64| {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{id}"))
    };
    let key = if relation.memory_key.is_empty() {
        String::new()
    } else {
        format!("  [{}]", relation.memory_key)
    };
    if relation.source_id == self_id {
        format!("-[{}]-> {}{}", relation.relation, name(relation.target_id), key)
    } else {
        format!("<-[{}]- {}{}", relation.relation, name(relation.source_id), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source_id: i64, target_id: i64, memory_key: &str) -> Relation {
        Relation {
            id: 1,
            source_id,
            relation: "mentors".to_string(),
            target_id,
            memory_key: memory_key.to_string(),
            weight: 1.0,
            created_at: "2026-08-21T09:30:00.000Z".to_string(),
        }
    }

    #[test]
    fn outgoing_edge_points_right() {
        let names = HashMap::from([(1, "ada".to_string()), (2, "grace".to_string())]);
        let text = format_relation(&edge(1, 2, ""), 1, &names);
        assert_eq!(text, "-[mentors]-> grace");
    }

    #[test]
    fn incoming_edge_points_left_and_shows_key() {
        let names = HashMap::from([(1, "ada".to_string()), (2, "grace".to_string())]);
        let text = format_relation(&edge(1, 2, "mentorship"), 2, &names);
        assert_eq!(text, "<-[mentors]- ada  [mentorship]");
    }

    #[test]
    fn unknown_endpoint_prints_id() {
        let names = HashMap::from([(1, "ada".to_string())]);
        let text = format_relation(&edge(1, 99, ""), 1, &names);
        assert_eq!(text, "-[mentors]-> #99");
    }
}
