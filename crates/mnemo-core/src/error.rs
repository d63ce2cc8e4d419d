// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemo memory engine.

use thiserror::Error;

/// The primary error type used across the Mnemo workspace.
///
/// Expected outcomes are not errors: a lookup miss is `Ok(None)`, a refused
/// owner-scoped delete is `Ok(false)`. Errors are reserved for states the
/// caller cannot reason about locally (storage failures, bad input, broken
/// snapshot files).
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, lock contention
    /// past the busy timeout).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Snapshot and legacy-import I/O errors (unreadable file, write failure).
    #[error("snapshot error: {message}")]
    Snapshot {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller-supplied input rejected before touching storage (empty key,
    /// empty content).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
