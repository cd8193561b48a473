//! Cached channel metadata.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub guild_id: String,
    pub name: String,
}

impl Database {
    pub fn upsert_channel(&self, channel: &ChannelInfo) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO channels (channel_id, guild_id, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(channel_id) DO UPDATE SET
                    guild_id = excluded.guild_id,
                    name = excluded.name",
                rusqlite::params![channel.channel_id, channel.guild_id, channel.name],
            )?;
            Ok(())
        })
    }

    pub fn get_channel(&self, channel_id: &str) -> Result<Option<ChannelInfo>, DbError> {
        self.with_conn(|conn| {
            let channel = conn
                .query_row(
                    "SELECT channel_id, guild_id, name FROM channels WHERE channel_id = ?1",
                    [channel_id],
                    |row| {
                        Ok(ChannelInfo {
                            channel_id: row.get(0)?,
                            guild_id: row.get(1)?,
                            name: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(channel)
        })
    }
}
