//! Background task loops: startup catch-up and periodic channel resync.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::app::SyncContext;

pub(crate) async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Catch up every configured channel once, then keep each one monitored.
pub async fn startup_sync(ctx: SyncContext) {
    let channels = ctx.config().channels.clone();
    if channels.is_empty() {
        tracing::info!("No channels configured; waiting for live messages");
        return;
    }
    for channel_id in &channels {
        if ctx.shutdown_token().is_cancelled() {
            return;
        }
        ctx.resync(channel_id).await;
        ensure_channel_monitor(&ctx, channel_id);
    }
}

/// Start the periodic monitor for a channel unless one is running.
pub fn ensure_channel_monitor(ctx: &SyncContext, channel_id: &str) {
    if !ctx.register_monitor(channel_id) {
        return;
    }
    tracing::info!(
        channel_id,
        interval_secs = ctx.config().resync_interval.as_secs(),
        "Starting channel monitor"
    );
    let c = ctx.clone();
    let channel_id = channel_id.to_string();
    tokio::spawn(async move { channel_monitor_loop(c, channel_id).await });
}

/// Resync one channel every `resync_interval` until shutdown.
async fn channel_monitor_loop(ctx: SyncContext, channel_id: String) {
    let shutdown_token = ctx.shutdown_token().clone();
    let interval = ctx.config().resync_interval;

    loop {
        if sleep_or_cancel(&shutdown_token, interval).await {
            tracing::info!(channel_id = %channel_id, "Channel monitor stopped (shutdown)");
            return;
        }
        ctx.resync(&channel_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleep_or_cancel_reports_cancellation() {
        let token = CancellationToken::new();
        assert!(!sleep_or_cancel(&token, Duration::from_millis(1)).await);
        token.cancel();
        assert!(sleep_or_cancel(&token, Duration::from_secs(60)).await);
    }
}
