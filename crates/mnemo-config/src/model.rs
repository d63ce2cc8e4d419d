// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnemo memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;

use mnemo_core::types::MemoryCategory;
use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Workspace location settings.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Memory retention and search settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Background sweeper settings.
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent this store serves.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "mnemo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Workspace location configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Workspace directory. The database lives at `<dir>/memory/memory.db`,
    /// snapshots default to `<dir>/MEMORY_SNAPSHOT.md`. A leading `~` is
    /// expanded to the home directory.
    #[serde(default = "default_workspace_dir")]
    pub dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
        }
    }
}

fn default_workspace_dir() -> String {
    "~/.mnemo".to_string()
}

/// Memory retention and search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Retention windows per category, in days.
    #[serde(default)]
    pub retention_days: RetentionDaysConfig,

    /// Default result limit for full-text search.
    #[serde(default = "default_search_limit")]
    pub search_limit: i64,

    /// Minimum BM25 relevance magnitude for a hit to be considered useful.
    /// Hits are kept when `rank < -min_relevance`.
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,

    /// Export a snapshot of shared core records on shutdown.
    #[serde(default)]
    pub snapshot_on_exit: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            retention_days: RetentionDaysConfig::default(),
            search_limit: default_search_limit(),
            min_relevance: default_min_relevance(),
            snapshot_on_exit: false,
        }
    }
}

fn default_search_limit() -> i64 {
    20
}

fn default_min_relevance() -> f64 {
    0.1
}

/// Retention windows per category, in days. A window of 0 or less means
/// records in that category never expire. Core records never expire and
/// have no window here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionDaysConfig {
    /// Days to keep daily notes.
    #[serde(default = "default_daily_days")]
    pub daily: i64,

    /// Days to keep conversation summaries.
    #[serde(default = "default_conversation_days")]
    pub conversation: i64,

    /// Days to keep custom records.
    #[serde(default = "default_custom_days")]
    pub custom: i64,
}

impl Default for RetentionDaysConfig {
    fn default() -> Self {
        Self {
            daily: default_daily_days(),
            conversation: default_conversation_days(),
            custom: default_custom_days(),
        }
    }
}

impl RetentionDaysConfig {
    /// Build the per-category map consumed by the retention pipeline.
    pub fn as_map(&self) -> HashMap<MemoryCategory, i64> {
        HashMap::from([
            (MemoryCategory::Daily, self.daily),
            (MemoryCategory::Conversation, self.conversation),
            (MemoryCategory::Custom, self.custom),
        ])
    }
}

fn default_daily_days() -> i64 {
    30
}

fn default_conversation_days() -> i64 {
    7
}

fn default_custom_days() -> i64 {
    90
}

/// Background sweeper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweeperConfig {
    /// Enable the periodic retention sweeper in watch mode.
    #[serde(default = "default_sweeper_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_sweeper_enabled(),
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweeper_enabled() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl MnemoConfig {
    /// Workspace directory with a leading `~` expanded to the home directory.
    pub fn workspace_dir(&self) -> std::path::PathBuf {
        expand_home(&self.workspace.dir)
    }

    /// Path of the database file under the workspace.
    pub fn database_path(&self) -> std::path::PathBuf {
        self.workspace_dir().join("memory").join("memory.db")
    }

    /// Default snapshot path under the workspace.
    pub fn snapshot_path(&self) -> std::path::PathBuf {
        self.workspace_dir().join("MEMORY_SNAPSHOT.md")
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
fn expand_home(path: &str) -> std::path::PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("~"));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    std::path::PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MnemoConfig::default();
        assert_eq!(config.agent.name, "mnemo");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.workspace.dir, "~/.mnemo");
        assert_eq!(config.memory.retention_days.daily, 30);
        assert_eq!(config.memory.retention_days.conversation, 7);
        assert_eq!(config.memory.retention_days.custom, 90);
        assert_eq!(config.memory.search_limit, 20);
        assert!(!config.memory.snapshot_on_exit);
        assert!(config.sweeper.enabled);
        assert_eq!(config.sweeper.interval_secs, 3600);
    }

    #[test]
    fn retention_map_excludes_core() {
        let map = RetentionDaysConfig::default().as_map();
        assert_eq!(map.len(), 3);
        assert!(!map.contains_key(&MemoryCategory::Core));
        assert_eq!(map[&MemoryCategory::Daily], 30);
    }

    #[test]
    fn database_path_is_under_workspace() {
        let mut config = MnemoConfig::default();
        config.workspace.dir = "/tmp/mnemo-test".to_string();
        assert_eq!(
            config.database_path(),
            std::path::PathBuf::from("/tmp/mnemo-test/memory/memory.db")
        );
    }

    #[test]
    fn home_expansion_applies_to_tilde_prefix() {
        let config = MnemoConfig::default();
        let dir = config.workspace_dir();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(dir, home.join(".mnemo"));
        }
    }
}
