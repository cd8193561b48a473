//! Discord REST API client.
//!
//! Provides typed access to the two endpoints the score tracker needs:
//! paged channel message history and channel metadata. Every request
//! carries the configured `Authorization` header and a bounded timeout.

mod channels;
mod messages;
mod request;

pub mod models;

pub use messages::{MAX_PAGE_SIZE, PageCursor};
pub use models::{Author, Channel, Message};

use crate::{Authorization, DiscordError};

const API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = "WordgameScores (https://github.com/wordgame-scores, 1.0)";

/// Discord REST client with automatic auth header injection.
#[derive(Clone)]
pub struct DiscordApiClient {
    pub(super) http: reqwest::Client,
    pub(super) authorization: Authorization,
    pub(super) base_url: String,
}
