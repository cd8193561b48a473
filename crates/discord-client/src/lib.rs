//! Discord integration client library.
//!
//! Provides the REST client used for paged channel history and channel
//! metadata, the gateway client for live message delivery, and the
//! snowflake codec that maps message ids to calendar dates.

pub mod api;
pub mod gateway;
pub mod snowflake;

use serde::{Deserialize, Serialize};

pub use api::DiscordApiClient;
pub use api::models::{Author, Channel, Message};

/// Credentials sent in the `Authorization` header.
///
/// User tokens are sent as `Bearer <token>`, bot tokens as `Bot <token>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    Bearer(String),
    Bot(String),
}

impl Authorization {
    /// Pick credentials from the `BEARER` / `BOT` values, bearer first.
    pub fn from_tokens(bearer: Option<&str>, bot: Option<&str>) -> Result<Self, DiscordError> {
        if let Some(token) = non_empty(bearer) {
            return Ok(Self::Bearer(token.to_string()));
        }
        if let Some(token) = non_empty(bot) {
            return Ok(Self::Bot(token.to_string()));
        }
        Err(DiscordError::AuthRequired)
    }

    pub fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Bot(token) => format!("Bot {token}"),
        }
    }

    /// Raw token as sent in a gateway identify payload.
    pub fn token(&self) -> &str {
        match self {
            Self::Bearer(token) | Self::Bot(token) => token,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Unified error type for the discord-client crate.
///
/// Every variant is a transport-level failure from the caller's point of
/// view: the request can be retried wholesale.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No authorization found in BEARER or BOT")]
    AuthRequired,

    #[error("Discord API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl DiscordError {
    /// Whether retrying with the same credentials is pointless.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::ApiError {
                status: 401 | 403,
                ..
            } | Self::AuthRequired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_takes_precedence_over_bot() {
        let auth = Authorization::from_tokens(Some("abc"), Some("def")).unwrap();
        assert_eq!(auth, Authorization::Bearer("abc".into()));
        assert_eq!(auth.header_value(), "Bearer abc");
    }

    #[test]
    fn bot_token_used_when_bearer_blank() {
        let auth = Authorization::from_tokens(Some("  "), Some("def")).unwrap();
        assert_eq!(auth.header_value(), "Bot def");
        assert_eq!(auth.token(), "def");
    }

    #[test]
    fn api_client_builds_from_crate_root() {
        let auth = Authorization::from_tokens(None, Some(" def ")).unwrap();
        assert_eq!(auth.token(), "def");
        let client = DiscordApiClient::new(auth, std::time::Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn missing_tokens_is_auth_error() {
        let err = Authorization::from_tokens(None, None).unwrap_err();
        assert!(err.is_auth_error());
    }
}
