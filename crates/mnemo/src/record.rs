// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo store`, `mnemo get`, and `mnemo forget` command implementations.

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryCategory, MemoryRecord, MemoryStore, MnemoError};
use mnemo_store::SqliteMemory;

/// Header line for a record: key, category, owner, last update.
pub(crate) fn format_header(record: &MemoryRecord) -> String {
    let owner = if record.owner.is_empty() {
        String::new()
    } else {
        format!(" (owner: {})", record.owner)
    };
    format!(
        "{} [{}]{} updated {}",
        record.key,
        record.category.as_str(),
        owner,
        record.updated_at
    )
}

/// Header plus indented content, shared by `get` and `list`.
pub(crate) fn format_record(record: &MemoryRecord) -> String {
    format!("{}\n    {}", format_header(record), record.content)
}

/// Run the `mnemo store` command.
pub async fn run_store(
    config: &MnemoConfig,
    key: &str,
    content: &str,
    category: MemoryCategory,
    owner: &str,
) -> Result<(), MnemoError> {
    let store = SqliteMemory::open(&config.database_path()).await?;
    store.store(key, content, category, owner).await?;
    store.close().await?;

    println!("stored '{key}' [{}]", category.as_str());
    Ok(())
}

/// Run the `mnemo get` command.
///
/// With `--owner`, only a record owned by exactly that owner matches;
/// without it, any record under the key is returned.
pub async fn run_get(
    config: &MnemoConfig,
    key: &str,
    owner: Option<&str>,
) -> Result<(), MnemoError> {
    let store = SqliteMemory::open(&config.database_path()).await?;
    let record = match owner {
        Some(owner) => store.get_by_owner(key, owner).await?,
        None => store.get(key).await?,
    };
    store.close().await?;

    match record {
        Some(record) => println!("{}", format_record(&record)),
        None => println!("no record for '{key}'"),
    }
    Ok(())
}

/// Run the `mnemo forget` command.
///
/// With `--owner`, the delete is refused when the record belongs to a
/// different owner; without it, the record is removed unconditionally.
pub async fn run_forget(
    config: &MnemoConfig,
    key: &str,
    owner: Option<&str>,
) -> Result<(), MnemoError> {
    let store = SqliteMemory::open(&config.database_path()).await?;
    let removed = match owner {
        Some(owner) => store.delete_accessible(key, owner).await?,
        None => store.delete(key).await?,
    };
    store.close().await?;

    if removed {
        println!("forgot '{key}'");
    } else {
        println!("no accessible record for '{key}'");
    }
    Ok(())
}
