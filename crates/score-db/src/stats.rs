//! Distinct listings and per-user aggregates over a puzzle date window.

use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

/// Aggregate of one user's scores for a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub count: i64,
    pub lowest: f64,
    pub average: f64,
    pub highest: f64,
}

/// Narrows [`Database::list_games`]. Dates are inclusive `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub guild_id: Option<String>,
    pub username: Option<String>,
    pub from_date: String,
    pub to_date: String,
}

impl Database {
    /// Games with at least one score whose puzzle date is in the window.
    pub fn list_games(&self, filter: &GameFilter) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT p.game
                 FROM scores s
                 JOIN puzzles p
                    ON s.game = p.game AND s.game_number = p.game_number
                 LEFT JOIN channels c
                    ON c.channel_id = s.channel_id
                 WHERE p.date >= ?1 AND p.date <= ?2
                   AND (?3 IS NULL OR c.guild_id = ?3)
                   AND (?4 IS NULL OR s.username = ?4)
                 ORDER BY p.game",
            )?;
            let games = stmt
                .query_map(
                    rusqlite::params![
                        filter.from_date,
                        filter.to_date,
                        filter.guild_id,
                        filter.username
                    ],
                    |row| row.get(0),
                )?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(games)
        })
    }

    pub fn list_usernames(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT DISTINCT username FROM scores ORDER BY username")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(names)
        })
    }

    /// Channels with cached metadata.
    pub fn list_channel_ids(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT channel_id FROM channels ORDER BY channel_id")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(ids)
        })
    }

    /// Per-user count/min/mean/max of `game` scores, lowest average first.
    ///
    /// Scores are text; they are compared numerically here, so a grouped
    /// value such as `1,327` counts as its leading digits.
    pub fn get_stats(
        &self,
        game: &str,
        guild_id: Option<&str>,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<UserStats>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.username,
                        COUNT(s.id),
                        MIN(CAST(s.score AS REAL)),
                        AVG(CAST(s.score AS REAL)),
                        MAX(CAST(s.score AS REAL))
                 FROM scores s
                 JOIN puzzles p
                    ON s.game = p.game AND s.game_number = p.game_number
                 LEFT JOIN channels c
                    ON c.channel_id = s.channel_id
                 WHERE s.game = ?1 AND p.date >= ?2 AND p.date <= ?3
                   AND (?4 IS NULL OR c.guild_id = ?4)
                 GROUP BY s.username
                 ORDER BY 4 ASC, s.username ASC",
            )?;
            let stats = stmt
                .query_map(
                    rusqlite::params![game, from_date, to_date, guild_id],
                    |row| {
                        Ok(UserStats {
                            username: row.get(0)?,
                            count: row.get(1)?,
                            lowest: row.get(2)?,
                            average: row.get(3)?,
                            highest: row.get(4)?,
                        })
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(stats)
        })
    }
}
