//! Score rows keyed by source message id.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::puzzles::{INSERT_PUZZLE_SQL, Puzzle};
use crate::{Database, DbError};

/// One parsed result. `id` is the id of the message it came from.
///
/// `game_number` and `score` are kept exactly as the message wrote them
/// (`0597`, `1,327`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub id: String,
    pub channel_id: String,
    pub username: String,
    pub game: String,
    pub game_number: String,
    pub score: String,
    /// `None` when the game reports no outcome.
    pub win: Option<bool>,
    pub hardmode: bool,
}

const UPSERT_SCORE_SQL: &str =
    "INSERT INTO scores (id, channel_id, username, game, game_number, score, win, hardmode)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
     ON CONFLICT(id) DO UPDATE SET
        channel_id = excluded.channel_id,
        username = excluded.username,
        game = excluded.game,
        game_number = excluded.game_number,
        score = excluded.score,
        win = excluded.win,
        hardmode = excluded.hardmode";

const SELECT_SCORE_COLUMNS: &str =
    "s.id, s.channel_id, s.username, s.game, s.game_number, s.score, s.win, s.hardmode";

fn win_to_sql(win: Option<bool>) -> Option<&'static str> {
    win.map(|w| if w { "Y" } else { "N" })
}

fn win_from_sql(value: Option<String>) -> Option<bool> {
    match value.as_deref() {
        Some("Y") => Some(true),
        Some("N") => Some(false),
        _ => None,
    }
}

fn hardmode_to_sql(hardmode: bool) -> &'static str {
    if hardmode { "*" } else { "" }
}

pub(crate) fn score_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Score> {
    Ok(Score {
        id: row.get(0)?,
        channel_id: row.get(1)?,
        username: row.get(2)?,
        game: row.get(3)?,
        game_number: row.get(4)?,
        score: row.get(5)?,
        win: win_from_sql(row.get(6)?),
        hardmode: row.get::<_, String>(7)? == "*",
    })
}

fn execute_upsert(stmt: &mut rusqlite::Statement<'_>, score: &Score) -> rusqlite::Result<()> {
    stmt.execute(rusqlite::params![
        score.id,
        score.channel_id,
        score.username,
        score.game,
        score.game_number,
        score.score,
        win_to_sql(score.win),
        hardmode_to_sql(score.hardmode),
    ])?;
    Ok(())
}

/// Snowflake ids are compared as integers; the column holds text.
fn id_bound(id: u64) -> Result<i64, DbError> {
    i64::try_from(id).map_err(|_| DbError::InvalidData(format!("id out of range: {id}")))
}

impl Database {
    /// Insert a score, or overwrite every field of the row with the same id.
    pub fn upsert_score(&self, score: &Score) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(UPSERT_SCORE_SQL)?;
            execute_upsert(&mut stmt, score)?;
            Ok(())
        })
    }

    /// Persist one page of results in a single transaction.
    ///
    /// Scores are upserted; puzzles are only inserted when their
    /// (game, number) pair is new. Any failure rolls back the whole page.
    pub fn persist_page(&self, scores: &[Score], puzzles: &[Puzzle]) -> Result<(), DbError> {
        if scores.is_empty() && puzzles.is_empty() {
            return Ok(());
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut upsert = tx.prepare(UPSERT_SCORE_SQL)?;
                for score in scores {
                    execute_upsert(&mut upsert, score)?;
                }
                let mut insert = tx.prepare(INSERT_PUZZLE_SQL)?;
                for puzzle in puzzles {
                    insert.execute(rusqlite::params![
                        puzzle.game,
                        puzzle.game_number,
                        puzzle.date
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_score(&self, id: &str) -> Result<Option<Score>, DbError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SELECT_SCORE_COLUMNS} FROM scores s WHERE s.id = ?1");
            let score = conn.query_row(&sql, [id], score_from_row).optional()?;
            Ok(score)
        })
    }

    pub fn count_scores(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    /// Oldest and newest stored message ids for a channel.
    ///
    /// Returns `None` when the channel has no scores yet.
    pub fn score_id_range(&self, channel_id: &str) -> Result<Option<(String, String)>, DbError> {
        self.with_conn(|conn| {
            let range: (Option<i64>, Option<i64>) = conn.query_row(
                "SELECT MIN(CAST(id AS INTEGER)), MAX(CAST(id AS INTEGER))
                 FROM scores WHERE channel_id = ?1",
                [channel_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(match range {
                (Some(oldest), Some(newest)) => Some((oldest.to_string(), newest.to_string())),
                _ => None,
            })
        })
    }

    /// Scores whose message id lies in `[from_id, to_id)`, oldest first.
    ///
    /// With snowflake bounds this selects scores posted in a date window.
    pub fn get_scores_in_id_range(
        &self,
        channel_id: Option<&str>,
        from_id: u64,
        to_id: u64,
    ) -> Result<Vec<Score>, DbError> {
        let from = id_bound(from_id)?;
        let to = id_bound(to_id)?;
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SELECT_SCORE_COLUMNS} FROM scores s
                 WHERE CAST(s.id AS INTEGER) >= ?1 AND CAST(s.id AS INTEGER) < ?2
                   AND (?3 IS NULL OR s.channel_id = ?3)
                 ORDER BY CAST(s.id AS INTEGER) ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![from, to, channel_id], score_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Scores for `game` whose puzzle date lies in `[from_date, to_date]`.
    ///
    /// Dates are `YYYY-MM-DD`. Rows are ordered by puzzle date, then by the
    /// game number as written.
    pub fn get_scores_for_game(
        &self,
        game: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<Score>, DbError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SELECT_SCORE_COLUMNS} FROM scores s
                 JOIN puzzles p
                    ON s.game = p.game AND s.game_number = p.game_number
                 WHERE s.game = ?1 AND p.date >= ?2 AND p.date <= ?3
                 ORDER BY p.date ASC, s.game_number ASC, s.username ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![game, from_date, to_date], score_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
