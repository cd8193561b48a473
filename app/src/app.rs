use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use discord_client::DiscordApiClient;
use score_db::Database;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::guard::SyncGuards;
use crate::sync::{ChannelSynchronizer, SyncError, SyncReport};

/// Explicit process context handed to every task: store, API client,
/// configuration and the per-channel sync bookkeeping.
#[derive(Clone)]
pub struct SyncContext {
    inner: Arc<SyncContextInner>,
}

struct SyncContextInner {
    db: Database,
    api: DiscordApiClient,
    config: AppConfig,
    guards: SyncGuards,
    /// Channels with a periodic monitor running.
    monitors: Mutex<HashSet<String>>,
    shutdown_token: CancellationToken,
}

impl SyncContext {
    pub fn new(db: Database, api: DiscordApiClient, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(SyncContextInner {
                db,
                api,
                config,
                guards: SyncGuards::new(),
                monitors: Mutex::new(HashSet::new()),
                shutdown_token: CancellationToken::new(),
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn api(&self) -> &DiscordApiClient {
        &self.inner.api
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn guards(&self) -> &SyncGuards {
        &self.inner.guards
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    pub fn synchronizer(&self) -> ChannelSynchronizer<DiscordApiClient> {
        ChannelSynchronizer::new(self.inner.api.clone(), self.inner.db.clone())
            .with_page_size(self.inner.config.page_size)
            .with_cancellation(self.inner.shutdown_token.child_token())
    }

    /// Mark a channel as monitored. Returns false if it already was.
    pub fn register_monitor(&self, channel_id: &str) -> bool {
        self.inner
            .monitors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel_id.to_string())
    }

    /// Incremental sync of one channel unless one is already running.
    ///
    /// Returns `None` when the trigger was dropped by the guard.
    pub async fn resync(&self, channel_id: &str) -> Option<Result<SyncReport, SyncError>> {
        let Some(_permit) = self.guards().try_acquire(channel_id) else {
            tracing::debug!(channel_id, "Sync already running, trigger dropped");
            return None;
        };
        let sync = self.synchronizer();
        let result = sync.sync_incremental(channel_id).await;
        match &result {
            Ok(report) => {
                tracing::info!(
                    channel_id,
                    pages = report.pages,
                    messages = report.messages,
                    scores = report.scores,
                    skipped = report.skipped,
                    "Channel sync finished"
                );
                if let Err(e) = sync.resolve_channel(channel_id).await {
                    tracing::warn!(channel_id, error = %e, "Failed to resolve channel info");
                }
            }
            Err(SyncError::Cancelled) => tracing::info!(channel_id, "Channel sync cancelled"),
            Err(e) => tracing::warn!(channel_id, error = %e, "Channel sync failed"),
        }
        Some(result)
    }
}
