// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background retention sweeper.
//!
//! The [`Sweeper`] runs the retention pipeline on a fixed interval: expire
//! aged records per category window, then drop relations whose backing
//! record is gone and entities left without edges. A `try_lock` guard keeps
//! sweeps from overlapping when one pass outlasts the interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mnemo_core::{MemoryCategory, MemoryStore, MnemoError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodic retention runner over a shared memory store.
pub struct Sweeper {
    store: Arc<dyn MemoryStore>,
    windows: HashMap<MemoryCategory, i64>,
    /// Held for the duration of a pass; a tick that cannot take it is skipped.
    running: Mutex<()>,
}

impl Sweeper {
    /// Create a sweeper over `store` with per-category retention windows
    /// in days.
    pub fn new(store: Arc<dyn MemoryStore>, windows: HashMap<MemoryCategory, i64>) -> Self {
        Self {
            store,
            windows,
            running: Mutex::new(()),
        }
    }

    /// Run one retention pass unless another is still in flight.
    ///
    /// Returns `Ok(None)` when skipped, otherwise the number of records
    /// expired.
    pub async fn sweep(&self) -> Result<Option<usize>, MnemoError> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("retention sweep skipped: previous sweep still running");
            return Ok(None);
        };
        let expired = self.store.run_retention(&self.windows).await?;
        Ok(Some(expired))
    }

    /// Spawn the sweep loop on the current runtime.
    ///
    /// The first pass fires a full `interval` after spawning; the task exits
    /// when `cancel` is triggered. Sweep failures are logged and the loop
    /// keeps going.
    pub fn spawn(
        store: Arc<dyn MemoryStore>,
        windows: HashMap<MemoryCategory, i64>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let sweeper = Self::new(store, windows);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first immediate tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match sweeper.sweep().await {
                            Ok(Some(expired)) if expired > 0 => {
                                info!(expired, "retention sweep expired records");
                            }
                            Ok(Some(_)) => {
                                debug!("retention sweep found nothing to expire");
                            }
                            Ok(None) => {}
                            Err(e) => {
                                warn!(error = %e, "retention sweep failed (non-fatal)");
                            }
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("retention sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}
