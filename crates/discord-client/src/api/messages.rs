use super::*;

/// Largest page the history endpoint is asked for.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Position of a history page. A request carries at most one cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageCursor {
    /// Most recent messages in the channel.
    Latest,
    /// Messages strictly older than the given id.
    Before(String),
    /// Messages strictly newer than the given id.
    After(String),
}

impl PageCursor {
    fn query(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::Latest => None,
            Self::Before(id) => Some(("before", id.as_str())),
            Self::After(id) => Some(("after", id.as_str())),
        }
    }
}

impl DiscordApiClient {
    /// Get one page of channel history.
    ///
    /// Discord returns the page newest-first. Messages lacking a
    /// `channel_id` are stamped with the requested channel.
    pub async fn get_channel_messages(
        &self,
        channel_id: &str,
        cursor: &PageCursor,
        limit: u32,
    ) -> Result<Vec<Message>, DiscordError> {
        let url = self.messages_url(channel_id, cursor, limit)?;
        match cursor.query() {
            Some((direction, id)) => {
                tracing::debug!(channel_id, direction, id, "Fetching channel history page");
            }
            None => tracing::debug!(channel_id, "Fetching latest channel history page"),
        }
        let body = self.authenticated_get(url.as_str()).await?;
        let mut messages: Vec<Message> = serde_json::from_str(&body)?;
        for message in &mut messages {
            if message.channel_id.is_empty() {
                message.channel_id = channel_id.to_string();
            }
        }
        Ok(messages)
    }

    pub(super) fn messages_url(
        &self,
        channel_id: &str,
        cursor: &PageCursor,
        limit: u32,
    ) -> Result<url::Url, DiscordError> {
        let clamped = limit.clamp(1, MAX_PAGE_SIZE);
        let mut url = url::Url::parse(&format!(
            "{}/channels/{channel_id}/messages",
            self.base_url
        ))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &clamped.to_string());
            if let Some((key, id)) = cursor.query() {
                query.append_pair(key, id);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client() -> DiscordApiClient {
        DiscordApiClient::new(Authorization::Bot("t".into()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn latest_page_has_no_cursor() {
        let url = client()
            .messages_url("123", &PageCursor::Latest, 50)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://discord.com/api/v10/channels/123/messages?limit=50"
        );
    }

    #[test]
    fn single_cursor_and_clamped_limit() {
        let url = client()
            .messages_url("123", &PageCursor::Before("999".into()), 500)
            .unwrap();
        assert_eq!(url.query(), Some("limit=50&before=999"));

        let url = client()
            .messages_url("123", &PageCursor::After("5".into()), 0)
            .unwrap();
        assert_eq!(url.query(), Some("limit=1&after=5"));
    }

    #[test]
    fn history_page_deserializes() {
        let body = r#"[{
            "id": "1187654321098765432",
            "type": 0,
            "content": "Wordle 771 3/6*",
            "author": { "id": "42", "username": "alice", "global_name": "Alice" },
            "pinned": false
        }]"#;
        let messages: Vec<Message> = serde_json::from_str(body).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].author.username, "alice");
        assert!(messages[0].is_ordinary());
        assert!(messages[0].channel_id.is_empty());
    }
}
