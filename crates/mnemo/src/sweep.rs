// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo sweep` command implementation.
//!
//! Runs the retention pipeline once, or keeps it running on the configured
//! interval with `--watch` until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryStore, MnemoError};
use mnemo_store::{SqliteMemory, Sweeper};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Run the `mnemo sweep` command.
pub async fn run_sweep(config: &MnemoConfig, watch: bool) -> Result<(), MnemoError> {
    if watch {
        run_watch(config).await
    } else {
        let store = SqliteMemory::open(&config.database_path()).await?;
        let expired = store
            .run_retention(&config.memory.retention_days.as_map())
            .await?;
        store.close().await?;

        println!("sweep complete: {expired} record(s) expired");
        Ok(())
    }
}

/// Watch mode: periodic sweeps until a shutdown signal arrives.
async fn run_watch(config: &MnemoConfig) -> Result<(), MnemoError> {
    if !config.sweeper.enabled {
        println!("sweeper is disabled (sweeper.enabled = false)");
        return Ok(());
    }

    let store: Arc<dyn MemoryStore> =
        Arc::new(SqliteMemory::open(&config.database_path()).await?);
    let cancel = install_signal_handler();

    info!(
        interval_secs = config.sweeper.interval_secs,
        "retention sweeper watching"
    );
    let handle = Sweeper::spawn(
        store.clone(),
        config.memory.retention_days.as_map(),
        Duration::from_secs(config.sweeper.interval_secs),
        cancel.clone(),
    );

    handle
        .await
        .map_err(|e| MnemoError::Internal(format!("sweeper task failed: {e}")))?;

    if config.memory.snapshot_on_exit {
        store.export_snapshot(&config.snapshot_path()).await?;
    }
    store.close().await?;
    Ok(())
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_shot_sweep_initializes_and_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MnemoConfig::default();
        config.workspace.dir = dir.path().display().to_string();

        run_sweep(&config, false).await.unwrap();
        assert!(config.database_path().exists());
    }
}
