//! Runtime configuration loaded from the process environment.

use std::path::PathBuf;
use std::time::Duration;

use discord_client::Authorization;
use discord_client::api::MAX_PAGE_SIZE;

use super::validation::{split_list, validate_setting};

const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 3600;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub authorization: Authorization,
    /// Channels caught up at startup. Empty means live messages from any
    /// channel are accepted.
    pub channels: Vec<String>,
    pub data_dir: PathBuf,
    pub resync_interval: Duration,
    pub fetch_timeout: Duration,
    pub page_size: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Invalid values fall back to
    /// their defaults with a warning; missing credentials are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { lookup(key).unwrap_or_default() };

        let authorization =
            Authorization::from_tokens(lookup("BEARER").as_deref(), lookup("BOT").as_deref())?;

        let channel_list = {
            let v = g("CHANNELS");
            if v.trim().is_empty() { g("CHANNEL") } else { v }
        };
        let mut channels = Vec::new();
        for id in split_list(&channel_list) {
            match validate_setting("CHANNELS", id) {
                Ok(()) if !channels.iter().any(|c| c == id) => channels.push(id.to_string()),
                Ok(()) => {}
                Err(e) => tracing::warn!(channel = id, "Ignoring channel: {e}"),
            }
        }

        let data_dir = match lookup("WORDGAME_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(),
        };

        Ok(Self {
            authorization,
            channels,
            data_dir,
            resync_interval: Duration::from_secs(parse_checked(
                "RESYNC_INTERVAL_SECS",
                &g("RESYNC_INTERVAL_SECS"),
                DEFAULT_RESYNC_INTERVAL_SECS,
            )),
            fetch_timeout: Duration::from_secs(parse_checked(
                "FETCH_TIMEOUT_SECS",
                &g("FETCH_TIMEOUT_SECS"),
                DEFAULT_FETCH_TIMEOUT_SECS,
            )),
            page_size: parse_page_size(&g("PAGE_SIZE")),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("scores.db")
    }

    /// Whether live messages from `channel_id` should be recorded.
    pub fn accepts_channel(&self, channel_id: &str) -> bool {
        self.channels.is_empty() || self.channels.iter().any(|c| c == channel_id)
    }
}

/// Priority: WORDGAME_DATA_DIR env var > ~/.wordgame-scores
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wordgame-scores")
}

fn parse_checked(key: &str, value: &str, default: u64) -> u64 {
    if value.trim().is_empty() {
        return default;
    }
    if let Err(e) = validate_setting(key, value) {
        tracing::warn!(key, value, "Invalid setting, using default {default}: {e}");
        return default;
    }
    value.trim().parse().unwrap_or(default)
}

fn parse_page_size(value: &str) -> u32 {
    if value.trim().is_empty() {
        return MAX_PAGE_SIZE;
    }
    match value.trim().parse::<i64>() {
        Ok(v) => v.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32,
        Err(_) => {
            tracing::warn!(value, "Invalid PAGE_SIZE, using {MAX_PAGE_SIZE}");
            MAX_PAGE_SIZE
        }
    }
}
