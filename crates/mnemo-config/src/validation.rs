// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and sane limits.

use crate::diagnostic::ConfigError;
use crate::model::MnemoConfig;

/// Log levels accepted by `agent.log_level`.
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.workspace.dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "workspace.dir must not be empty".to_string(),
        });
    }

    if !VALID_LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of {}",
                config.agent.log_level,
                VALID_LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.memory.search_limit <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.search_limit must be positive, got {}",
                config.memory.search_limit
            ),
        });
    }

    if config.memory.min_relevance < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.min_relevance must be non-negative, got {}",
                config.memory.min_relevance
            ),
        });
    }

    if config.sweeper.enabled && config.sweeper.interval_secs < 60 {
        errors.push(ConfigError::Validation {
            message: format!(
                "sweeper.interval_secs must be at least 60, got {}",
                config.sweeper.interval_secs
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = MnemoConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_workspace_dir_fails_validation() {
        let mut config = MnemoConfig::default();
        config.workspace.dir = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("workspace.dir"))));
    }

    #[test]
    fn bogus_log_level_fails_validation() {
        let mut config = MnemoConfig::default();
        config.agent.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("log_level"))));
    }

    #[test]
    fn zero_search_limit_fails_validation() {
        let mut config = MnemoConfig::default();
        config.memory.search_limit = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("search_limit"))));
    }

    #[test]
    fn negative_retention_window_is_allowed() {
        // Negative or zero windows mean "never expire"; they are not errors.
        let mut config = MnemoConfig::default();
        config.memory.retention_days.custom = -1;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn short_sweep_interval_fails_validation() {
        let mut config = MnemoConfig::default();
        config.sweeper.interval_secs = 5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("interval_secs"))));
    }

    #[test]
    fn disabled_sweeper_skips_interval_check() {
        let mut config = MnemoConfig::default();
        config.sweeper.enabled = false;
        config.sweeper.interval_secs = 5;
        assert!(validate_config(&config).is_ok());
    }
}
