use serde::{Deserialize, Serialize};

/// Message type of an ordinary user post.
pub const MESSAGE_TYPE_DEFAULT: i64 = 0;

/// Message object from GET /channels/{id}/messages and gateway
/// MESSAGE_CREATE dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// History responses include this; callers fill it in when absent.
    #[serde(default)]
    pub channel_id: String,
    #[serde(rename = "type", default)]
    pub kind: i64,
    #[serde(default)]
    pub content: String,
    pub author: Author,
}

impl Message {
    pub fn is_ordinary(&self) -> bool {
        self.kind == MESSAGE_TYPE_DEFAULT
    }
}

/// Author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
}

/// Channel object from GET /channels/{id}.
///
/// DM channels carry neither a guild nor a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
