//! Gateway WebSocket client for real-time message delivery.
//!
//! Connects to wss://gateway.discord.gg, answers Hello with Identify,
//! keeps the heartbeat going, forwards MESSAGE_CREATE dispatches and
//! reconnects with exponential backoff.

mod connection;
#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Authorization, DiscordError, Message};

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);
const MAX_CONSECUTIVE_FAILURES_BEFORE_RESTART: u32 = 8;

/// Gateway intents.
pub const INTENT_GUILDS: u64 = 1 << 0;
pub const INTENT_GUILD_MESSAGES: u64 = 1 << 9;
pub const INTENT_MESSAGE_CONTENT: u64 = 1 << 15;

/// Gateway opcodes.
pub(crate) const OP_DISPATCH: u8 = 0;
pub(crate) const OP_HEARTBEAT: u8 = 1;
pub(crate) const OP_IDENTIFY: u8 = 2;
pub(crate) const OP_RECONNECT: u8 = 7;
pub(crate) const OP_INVALID_SESSION: u8 = 9;
pub(crate) const OP_HELLO: u8 = 10;
pub(crate) const OP_HEARTBEAT_ACK: u8 = 11;

/// Gateway client configuration.
pub struct GatewayConfig {
    pub authorization: Authorization,
    pub intents: u64,
}

impl GatewayConfig {
    /// Intents needed to read messages posted in guild channels.
    pub fn for_messages(authorization: Authorization) -> Self {
        Self {
            authorization,
            intents: INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_MESSAGE_CONTENT,
        }
    }
}

/// Gateway client with auto-reconnect.
///
/// Messages are delivered via `mpsc::Receiver<Message>`.
pub struct GatewayClient;

impl GatewayClient {
    /// Start the gateway loop. Returns a message receiver, a shutdown
    /// sender and the loop's task, which resolves to why it stopped.
    pub async fn connect(
        config: GatewayConfig,
    ) -> Result<
        (
            mpsc::Receiver<Message>,
            mpsc::Sender<()>,
            JoinHandle<GatewayExit>,
        ),
        DiscordError,
    > {
        let (message_tx, message_rx) = mpsc::channel::<Message>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(Self::run_loop(config, message_tx, shutdown_rx));
        Ok((message_rx, shutdown_tx, task))
    }

    async fn run_loop(
        config: GatewayConfig,
        message_tx: mpsc::Sender<Message>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> GatewayExit {
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("Gateway shutdown requested");
                return GatewayExit::Shutdown;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "Gateway failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            match Self::connect_once(&config, &message_tx, &mut shutdown_rx).await {
                Ok(SessionEnd::Reconnect) => {
                    failures = 0;
                    tracing::info!("Gateway asked for a reconnect");
                }
                Ok(SessionEnd::Shutdown) => {
                    tracing::info!("Gateway connection closed cleanly");
                    return GatewayExit::Shutdown;
                }
                Err(e) => {
                    if e.is_auth_error() {
                        tracing::error!(
                            error = %e,
                            "Gateway connection failed due to auth error; terminating loop"
                        );
                        return GatewayExit::AuthFailed;
                    }
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    if failures >= MAX_CONSECUTIVE_FAILURES_BEFORE_RESTART {
                        tracing::warn!(
                            failures,
                            "Gateway failures exceeded threshold; stopping so the caller can restart"
                        );
                        return GatewayExit::TooManyFailures;
                    }
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "Gateway connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Gateway shutdown requested during reconnect backoff");
                            return GatewayExit::Shutdown;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }
}

/// Why the gateway loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayExit {
    Shutdown,
    /// The credentials were rejected; reconnecting with them is pointless.
    AuthFailed,
    TooManyFailures,
}

impl GatewayExit {
    /// Whether a fresh `connect` with the same config can succeed.
    pub fn should_restart(self) -> bool {
        matches!(self, Self::TooManyFailures)
    }
}

/// How a single gateway session ended without error.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Reconnect,
    Shutdown,
}
