// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo list` and `mnemo search` command implementations.

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryCategory, MemoryStore, MnemoError, SearchHit};
use mnemo_store::SqliteMemory;

use crate::record;

/// Run the `mnemo list` command.
pub async fn run_list(
    config: &MnemoConfig,
    category: Option<MemoryCategory>,
    limit: i64,
    owner: &str,
) -> Result<(), MnemoError> {
    let store = SqliteMemory::open(&config.database_path()).await?;
    let records = store.list(category, limit, owner).await?;
    store.close().await?;

    if records.is_empty() {
        println!("no records");
        return Ok(());
    }
    for record in &records {
        println!("{}", record::format_record(record));
    }
    println!("{} record(s)", records.len());
    Ok(())
}

/// Run the `mnemo search` command.
///
/// Hits below the configured relevance threshold are dropped before
/// printing; BM25 ranks are negative and more negative means more relevant.
pub async fn run_search(
    config: &MnemoConfig,
    query: &str,
    category: Option<MemoryCategory>,
    limit: Option<i64>,
    owner: &str,
) -> Result<(), MnemoError> {
    let limit = limit.unwrap_or(config.memory.search_limit);

    let store = SqliteMemory::open(&config.database_path()).await?;
    let mut hits = match category {
        Some(category) => {
            store
                .search_by_category(query, category, limit, owner)
                .await?
        }
        None => store.search(query, limit, owner).await?,
    };
    store.close().await?;

    hits.retain(|hit| hit.rank < -config.memory.min_relevance);

    if hits.is_empty() {
        println!("no matches for '{query}'");
        return Ok(());
    }
    for hit in &hits {
        println!("{}", format_hit(hit));
    }
    println!("{} match(es)", hits.len());
    Ok(())
}

/// Header with the BM25 rank appended, plus indented content.
fn format_hit(hit: &SearchHit) -> String {
    format!(
        "{} (rank {:.2})\n    {}",
        record::format_header(&hit.record),
        hit.rank,
        hit.record.content
    )
}
