// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo memory engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Mnemo workspace. The storage engine in
//! `mnemo-store` implements the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemoError;
pub use traits::MemoryStore;
pub use types::{Entity, GraphNode, MemoryCategory, MemoryRecord, Relation, SearchHit};
