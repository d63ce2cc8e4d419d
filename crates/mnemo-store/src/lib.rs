// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Mnemo memory engine.
//!
//! Provides WAL-mode SQLite storage with startup self-repair, an FTS5
//! full-text index kept in sync by triggers, a lightweight knowledge graph,
//! retention sweeping, and snapshot/legacy-markdown migration, all behind
//! the single-writer concurrency model of `tokio-rusqlite`.

mod repair;
mod schema;

pub mod adapter;
pub mod database;
pub mod legacy;
pub mod queries;
pub mod snapshot;
pub mod sweeper;

pub use adapter::SqliteMemory;
pub use database::Database;
pub use sweeper::Sweeper;
