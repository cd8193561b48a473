//! Gateway message handler.
//!
//! Connects to the gateway, records every score posted in a watched
//! channel, then triggers a guarded resync of that channel so anything
//! the live connection missed is picked up.

use std::time::Duration;

use discord_client::Message;
use discord_client::gateway::{GatewayClient, GatewayConfig, GatewayExit};
use score_db::scores::Score;
use tokio::sync::mpsc;

use crate::app::SyncContext;
use crate::background::{ensure_channel_monitor, sleep_or_cancel};
use crate::sync::{SyncError, puzzle_for};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Start the gateway handler loop. Reconnects whenever the gateway
/// stream ends, until shutdown or rejected credentials.
pub async fn run(ctx: SyncContext) {
    let token = ctx.shutdown_token().clone();
    loop {
        tracing::info!("Starting gateway connection");
        let config = GatewayConfig::for_messages(ctx.config().authorization.clone());

        match GatewayClient::connect(config).await {
            Ok((messages, shutdown_tx, task)) => {
                tokio::select! {
                    _ = token.cancelled() => {
                        if shutdown_tx.send(()).await.is_err() {
                            tracing::debug!("Gateway already stopped");
                        }
                        tracing::info!("Gateway handler stopped (shutdown)");
                        return;
                    }
                    _ = process_messages(&ctx, messages) => {}
                }
                let exit = match task.await {
                    Ok(exit) => exit,
                    Err(e) => {
                        tracing::warn!("Gateway task failed: {e}");
                        GatewayExit::TooManyFailures
                    }
                };
                if !exit.should_restart() {
                    if exit == GatewayExit::AuthFailed {
                        tracing::error!("Gateway rejected the configured token; live updates stopped");
                    }
                    return;
                }
                tracing::warn!(?exit, "Gateway message stream ended, will reconnect");
            }
            Err(e) => {
                tracing::error!("Gateway connection failed: {e}");
            }
        }

        if sleep_or_cancel(&token, RECONNECT_DELAY).await {
            tracing::info!("Gateway handler stopped (shutdown)");
            return;
        }
    }
}

/// Process messages from the gateway channel until it closes.
async fn process_messages(ctx: &SyncContext, mut messages: mpsc::Receiver<Message>) {
    while let Some(message) = messages.recv().await {
        if !ctx.config().accepts_channel(&message.channel_id) {
            continue;
        }
        match record_message(ctx, &message) {
            Ok(Some(score)) => {
                tracing::info!(
                    channel_id = %score.channel_id,
                    username = %score.username,
                    game = %score.game,
                    game_number = %score.game_number,
                    score = %score.score,
                    "Added score from gateway"
                );
                let channel_id = message.channel_id.clone();
                let c = ctx.clone();
                tokio::spawn(async move { c.resync(&channel_id).await });
                ensure_channel_monitor(ctx, &message.channel_id);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(message_id = %message.id, error = %e, "Failed to record live message");
            }
        }
    }
}

/// Parse and store one live message. `Ok(None)` means it held no score.
pub fn record_message(ctx: &SyncContext, message: &Message) -> Result<Option<Score>, SyncError> {
    let score = match puzzle_parser::parse_message(message) {
        Ok(score) => score,
        Err(e) => {
            tracing::debug!(message_id = %message.id, error = %e, "Live message skipped");
            return Ok(None);
        }
    };
    let puzzle = puzzle_for(&score)?;
    ctx.db()
        .persist_page(std::slice::from_ref(&score), &[puzzle])?;
    Ok(Some(score))
}
