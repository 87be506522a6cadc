//! Periodic link synchronization worker.
//!
//! A single long-lived tokio task: run one scan cycle across every
//! configured API token, log the outcome, sleep, repeat. Shutdown is an
//! explicit signal checked between cycles, never mid-cycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{error, info};

use margo_core::{defaults, Error, MargoConfig, Result};
use margo_paperless::PaperlessClient;

use crate::links::{FieldCache, LinkSync};

/// Configuration for the link synchronization worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Delay between scan cycles.
    pub interval: Duration,
    /// Whether scanning runs at all.
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(defaults::SYNC_INTERVAL_MINS * 60),
            enabled: true,
        }
    }
}

impl WorkerConfig {
    /// Set the delay between scan cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enable or disable scanning.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Handle for controlling a running worker.
pub struct SyncHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncHandle {
    /// Signal the worker to stop once the current cycle finishes.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".to_string()))?;
        Ok(())
    }
}

/// Background worker that keeps document links in sync.
pub struct LinkSyncWorker {
    config: WorkerConfig,
    margo: MargoConfig,
    /// API tokens of every user whose documents are scanned.
    tokens: Vec<String>,
    cache: Arc<FieldCache>,
}

impl LinkSyncWorker {
    /// Build a worker scanning under each of `tokens` in turn.
    pub fn new(margo: MargoConfig, tokens: Vec<String>) -> Self {
        let config = WorkerConfig {
            interval: margo.sync_interval,
            enabled: true,
        };
        Self {
            config,
            margo,
            tokens,
            cache: Arc::new(FieldCache::new()),
        }
    }

    /// Override the worker configuration.
    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one scan cycle across every configured token.
    ///
    /// The skip set accumulates across tokens, and the field cache is
    /// shared, so a document touched under one user is not rewritten under
    /// the next and the field is resolved once. Returns the number of
    /// documents touched.
    pub async fn run_cycle(&self) -> Result<usize> {
        let mut touched: HashSet<i64> = HashSet::new();
        for token in &self.tokens {
            let client = Arc::new(PaperlessClient::new(&self.margo.paperless_url, token)?);
            let sync = LinkSync::with_cache(client, &self.margo, self.cache.clone());
            let ids = sync.update_document_links(&touched).await?;
            touched.extend(ids);
        }
        Ok(touched.len())
    }

    /// Start the worker and return a handle for control.
    pub fn start(self) -> SyncHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        SyncHandle { shutdown_tx }
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("Link synchronization disabled");
            return;
        }
        info!(
            interval_secs = self.config.interval.as_secs(),
            users = self.tokens.len(),
            "Link synchronization worker started"
        );

        loop {
            match self.run_cycle().await {
                Ok(touched) => info!(touched, "Link update scan completed"),
                // One bad cycle never kills the loop.
                Err(e) => error!(error = %e, "Link update scan failed"),
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Link synchronization worker stopped");
                    return;
                }
                _ = sleep(self.config.interval) => {}
            }
        }
    }
}
