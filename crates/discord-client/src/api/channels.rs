use super::*;

impl DiscordApiClient {
    /// Get channel metadata (guild and display name).
    pub async fn get_channel(&self, channel_id: &str) -> Result<Channel, DiscordError> {
        let url = format!("{}/channels/{channel_id}", self.base_url);
        let body = self.authenticated_get(&url).await?;
        let channel: Channel = serde_json::from_str(&body)?;
        Ok(channel)
    }
}
