// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo status` command implementation.
//!
//! Opens the store and displays record counts per category, the entity
//! count, and the database location. Reports a not-initialized state
//! without creating the database file.

use std::io::IsTerminal;

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryCategory, MemoryStore, MnemoError};
use mnemo_store::SqliteMemory;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub initialized: bool,
    pub database_path: String,
    pub records: i64,
    pub core: i64,
    pub daily: i64,
    pub conversation: i64,
    pub custom: i64,
    pub entities: usize,
}

impl StatusResponse {
    fn uninitialized(database_path: String) -> Self {
        Self {
            initialized: false,
            database_path,
            records: 0,
            core: 0,
            daily: 0,
            conversation: 0,
            custom: 0,
            entities: 0,
        }
    }
}

/// Run the `mnemo status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
pub async fn run_status(config: &MnemoConfig, json: bool) -> Result<(), MnemoError> {
    let path = config.database_path();
    let database_path = path.display().to_string();

    if !path.exists() {
        let resp = StatusResponse::uninitialized(database_path);
        if json {
            print_json(&resp);
        } else {
            print_status_uninitialized(&resp, use_color());
        }
        return Ok(());
    }

    let store = SqliteMemory::open(&path).await?;
    let resp = StatusResponse {
        initialized: true,
        database_path,
        records: store.count().await?,
        core: store.count_by_category(MemoryCategory::Core).await?,
        daily: store.count_by_category(MemoryCategory::Daily).await?,
        conversation: store.count_by_category(MemoryCategory::Conversation).await?,
        custom: store.count_by_category(MemoryCategory::Custom).await?,
        entities: store.all_entity_names().await?.len(),
    };
    store.close().await?;

    if json {
        print_json(&resp);
    } else {
        print_status(&resp, use_color());
    }

    Ok(())
}

fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

fn print_json(resp: &StatusResponse) {
    println!(
        "{}",
        serde_json::to_string_pretty(resp).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Print store status with optional colors.
fn print_status(resp: &StatusResponse, use_color: bool) {
    println!();
    println!("  mnemo status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        println!("    State:    {} {}", "✓".green(), "ready".green());
    } else {
        println!("    State:    [OK] ready");
    }

    println!(
        "    Records:  {} (core {}, daily {}, conversation {}, custom {})",
        resp.records, resp.core, resp.daily, resp.conversation, resp.custom
    );
    println!("    Entities: {}", resp.entities);
    println!("    Database: {}", resp.database_path);
    println!();
}

/// Print not-initialized status with optional colors.
fn print_status_uninitialized(resp: &StatusResponse, use_color: bool) {
    println!();
    println!("  mnemo status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        println!("    State:    {} {}", "✗".red(), "not initialized".red());
    } else {
        println!("    State:    [FAIL] not initialized");
    }

    println!("    Database: {} (missing)", resp.database_path);
    println!();
    println!("  Create it with: mnemo store <key> <content>");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_response_is_all_zeroes() {
        let resp = StatusResponse::uninitialized("/tmp/missing.db".to_string());
        assert!(!resp.initialized);
        assert_eq!(resp.records, 0);
        assert_eq!(resp.entities, 0);
    }

    #[test]
    fn json_output_uses_snake_case_keys() {
        let resp = StatusResponse::uninitialized("/tmp/missing.db".to_string());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"database_path\""));
        assert!(json.contains("\"initialized\":false"));
    }
}
