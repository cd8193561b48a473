use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

use super::*;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, Deserialize)]
pub(super) struct GatewayPayload {
    pub(super) op: u8,
    #[serde(default)]
    pub(super) d: serde_json::Value,
    #[serde(default)]
    pub(super) s: Option<u64>,
    #[serde(default)]
    pub(super) t: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelloPayload {
    heartbeat_interval: u64,
}

#[derive(Debug, Serialize)]
struct OutgoingPayload<T: Serialize> {
    op: u8,
    d: T,
}

#[derive(Debug, Serialize)]
struct IdentifyPayload<'a> {
    token: &'a str,
    intents: u64,
    properties: IdentifyProperties,
}

#[derive(Debug, Serialize)]
struct IdentifyProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum PayloadAction {
    Continue,
    HeartbeatNow,
    HeartbeatAcked,
    Reconnect,
    InvalidSession,
}

/// Tracks whether the last heartbeat was acknowledged. A beat that comes
/// due while the previous one is still unacknowledged means the
/// connection is dead.
#[derive(Debug, Default)]
pub(super) struct HeartbeatState {
    awaiting_ack: bool,
}

impl HeartbeatState {
    /// Called when the heartbeat timer fires, before sending.
    pub(super) fn beat(&mut self) -> Result<(), DiscordError> {
        if self.awaiting_ack {
            return Err(DiscordError::Timeout);
        }
        self.awaiting_ack = true;
        Ok(())
    }

    pub(super) fn ack(&mut self) {
        self.awaiting_ack = false;
    }
}

impl GatewayClient {
    pub(super) async fn connect_once(
        config: &GatewayConfig,
        message_tx: &mpsc::Sender<Message>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<SessionEnd, DiscordError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(url = GATEWAY_URL, "Connecting to Discord gateway");
        let (mut ws, _) = connect_async(GATEWAY_URL).await?;
        let interval = Self::wait_for_hello(&mut ws).await?;
        Self::identify(&mut ws, config).await?;

        let mut sequence: Option<u64> = None;
        let mut heartbeat_state = HeartbeatState::default();
        let mut heartbeat = tokio::time::interval(interval);
        // The first tick completes immediately.
        heartbeat.tick().await;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Gateway shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(SessionEnd::Shutdown);
                }
                _ = heartbeat.tick() => {
                    if let Err(e) = heartbeat_state.beat() {
                        tracing::warn!("Gateway heartbeat not acknowledged");
                        let _ = ws.close(None).await;
                        return Err(e);
                    }
                    Self::send_heartbeat(&mut ws, sequence).await?;
                }
                frame = ws.next() => {
                    match frame {
                        Some(Ok(Msg::Text(text))) => {
                            match Self::handle_payload(&text, &mut sequence, message_tx).await? {
                                PayloadAction::Continue => {}
                                PayloadAction::HeartbeatNow => {
                                    Self::send_heartbeat(&mut ws, sequence).await?;
                                }
                                PayloadAction::HeartbeatAcked => heartbeat_state.ack(),
                                PayloadAction::Reconnect => {
                                    let _ = ws.close(None).await;
                                    return Ok(SessionEnd::Reconnect);
                                }
                                PayloadAction::InvalidSession => {
                                    let _ = ws.close(None).await;
                                    // Re-identify only after the backoff delay.
                                    return Err(DiscordError::Gateway("Session invalidated".into()));
                                }
                            }
                        }
                        Some(Ok(Msg::Ping(data))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Some(Ok(Msg::Close(frame))) => {
                            let code = frame.as_ref().map(|f| u16::from(f.code));
                            tracing::warn!(?code, "Gateway WebSocket closed by server");
                            // 4004: authentication failed.
                            if code == Some(4004) {
                                return Err(DiscordError::AuthRequired);
                            }
                            return Err(DiscordError::Gateway("Server closed".into()));
                        }
                        None => {
                            return Err(DiscordError::Gateway("Stream ended".into()));
                        }
                        Some(Err(e)) => return Err(DiscordError::WebSocket(e)),
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    async fn wait_for_hello(ws: &mut WsStream) -> Result<Duration, DiscordError> {
        use tokio_tungstenite::tungstenite::Message as Msg;
        loop {
            match tokio::time::timeout(HELLO_TIMEOUT, ws.next()).await {
                Ok(Some(Ok(Msg::Text(text)))) => {
                    let payload: GatewayPayload = serde_json::from_str(&text)?;
                    if payload.op == OP_HELLO {
                        let hello: HelloPayload = serde_json::from_value(payload.d)?;
                        tracing::info!(
                            heartbeat_interval_ms = hello.heartbeat_interval,
                            "Gateway hello"
                        );
                        return Ok(Duration::from_millis(hello.heartbeat_interval.max(1)));
                    }
                }
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => return Err(DiscordError::WebSocket(e)),
                Ok(None) => return Err(DiscordError::Gateway("Connection closed".into())),
                Err(_) => return Err(DiscordError::Timeout),
            }
        }
    }

    async fn identify(ws: &mut WsStream, config: &GatewayConfig) -> Result<(), DiscordError> {
        use tokio_tungstenite::tungstenite::Message as Msg;
        let payload = OutgoingPayload {
            op: OP_IDENTIFY,
            d: IdentifyPayload {
                token: config.authorization.token(),
                intents: config.intents,
                properties: IdentifyProperties {
                    os: std::env::consts::OS,
                    browser: "wordgame-scores",
                    device: "wordgame-scores",
                },
            },
        };
        ws.send(Msg::Text(serde_json::to_string(&payload)?.into()))
            .await?;
        tracing::debug!(intents = config.intents, "Gateway identify sent");
        Ok(())
    }

    async fn send_heartbeat(ws: &mut WsStream, sequence: Option<u64>) -> Result<(), DiscordError> {
        use tokio_tungstenite::tungstenite::Message as Msg;
        let payload = OutgoingPayload {
            op: OP_HEARTBEAT,
            d: sequence,
        };
        ws.send(Msg::Text(serde_json::to_string(&payload)?.into()))
            .await?;
        tracing::trace!(?sequence, "Gateway heartbeat sent");
        Ok(())
    }

    pub(super) async fn handle_payload(
        text: &str,
        sequence: &mut Option<u64>,
        message_tx: &mpsc::Sender<Message>,
    ) -> Result<PayloadAction, DiscordError> {
        let payload: GatewayPayload = serde_json::from_str(text)?;
        if payload.s.is_some() {
            *sequence = payload.s;
        }
        match payload.op {
            OP_DISPATCH => {
                match payload.t.as_deref() {
                    Some("MESSAGE_CREATE") => {
                        if let Some(message) = Self::parse_message_create(&payload.d) {
                            tracing::debug!(
                                message_id = %message.id,
                                channel_id = %message.channel_id,
                                "Gateway MESSAGE_CREATE"
                            );
                            let _ = message_tx.send(message).await;
                        } else {
                            tracing::warn!("Gateway MESSAGE_CREATE with unexpected shape");
                        }
                    }
                    Some("READY") => tracing::info!("Gateway session ready"),
                    other => tracing::trace!(event = ?other, "Unhandled gateway dispatch"),
                }
                Ok(PayloadAction::Continue)
            }
            OP_HEARTBEAT => Ok(PayloadAction::HeartbeatNow),
            OP_HEARTBEAT_ACK => {
                tracing::trace!("Gateway heartbeat acknowledged");
                Ok(PayloadAction::HeartbeatAcked)
            }
            OP_RECONNECT => Ok(PayloadAction::Reconnect),
            OP_INVALID_SESSION => {
                tracing::warn!("Gateway session invalidated");
                Ok(PayloadAction::InvalidSession)
            }
            other => {
                tracing::debug!(op = other, "Unhandled gateway opcode");
                Ok(PayloadAction::Continue)
            }
        }
    }

    pub(super) fn parse_message_create(data: &serde_json::Value) -> Option<Message> {
        serde_json::from_value(data.clone()).ok()
    }
}
