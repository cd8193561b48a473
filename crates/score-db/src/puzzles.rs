//! Puzzle dates. The first score seen for a (game, number) pair fixes the
//! date; later writes are ignored.

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub game: String,
    pub game_number: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

pub(crate) const INSERT_PUZZLE_SQL: &str =
    "INSERT OR IGNORE INTO puzzles (game, game_number, date) VALUES (?1, ?2, ?3)";

impl Database {
    /// Returns true if the puzzle was new.
    pub fn upsert_or_ignore_puzzle(&self, puzzle: &Puzzle) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                INSERT_PUZZLE_SQL,
                rusqlite::params![puzzle.game, puzzle.game_number, puzzle.date],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn get_puzzle(&self, game: &str, game_number: &str) -> Result<Option<Puzzle>, DbError> {
        self.with_conn(|conn| {
            let puzzle = conn
                .query_row(
                    "SELECT game, game_number, date FROM puzzles
                     WHERE game = ?1 AND game_number = ?2",
                    [game, game_number],
                    |row| {
                        Ok(Puzzle {
                            game: row.get(0)?,
                            game_number: row.get(1)?,
                            date: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(puzzle)
        })
    }
}
