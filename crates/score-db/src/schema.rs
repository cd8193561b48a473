//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    migrate_legacy_scores_table(conn)?;
    conn.execute_batch(SCORES_TABLE)?;
    conn.execute_batch(TABLES)?;
    conn.execute_batch(INDEXES)?;
    Ok(())
}

/// Rebuild a scores table from the single-channel schema (no channel_id,
/// unique per username/game/number/score) into one keyed by message id.
fn migrate_legacy_scores_table(conn: &Connection) -> Result<(), DbError> {
    if !table_exists(conn, "scores")? || column_exists(conn, "scores", "channel_id")? {
        return Ok(());
    }
    tracing::info!("Migrating scores table from legacy schema");

    let column_or = |column: &str, fallback: &'static str| -> Result<String, DbError> {
        Ok(if column_exists(conn, "scores", column)? {
            format!("COALESCE(CAST({column} AS TEXT), {fallback})")
        } else {
            fallback.to_string()
        })
    };
    let game = column_or("game", "''")?;
    let game_number = column_or("game_number", "''")?;
    let win = if column_exists(conn, "scores", "win")? {
        "NULLIF(win, '')"
    } else {
        "NULL"
    };
    let hardmode = column_or("hardmode", "''")?;

    let sql = format!(
        "ALTER TABLE scores RENAME TO scores_legacy;
         {SCORES_TABLE}
         INSERT OR REPLACE INTO scores
             (id, channel_id, username, game, game_number, score, win, hardmode)
         SELECT
             CAST(id AS TEXT),
             '',
             COALESCE(username, ''),
             {game},
             {game_number},
             COALESCE(CAST(score AS TEXT), ''),
             {win},
             {hardmode}
         FROM scores_legacy
         WHERE id IS NOT NULL;
         DROP TABLE scores_legacy;"
    );
    conn.execute_batch(&format!("BEGIN;\n{sql}\nCOMMIT;"))?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, DbError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}

const SCORES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scores (
    id TEXT PRIMARY KEY,
    channel_id TEXT NOT NULL DEFAULT '',
    username TEXT NOT NULL,
    game TEXT NOT NULL,
    game_number TEXT NOT NULL,
    score TEXT NOT NULL,
    win TEXT,
    hardmode TEXT NOT NULL DEFAULT ''
);
"#;

const TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS puzzles (
    game TEXT NOT NULL,
    game_number TEXT NOT NULL,
    date TEXT NOT NULL,
    PRIMARY KEY (game, game_number)
);

CREATE TABLE IF NOT EXISTS channels (
    channel_id TEXT PRIMARY KEY,
    guild_id TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT ''
);
"#;

const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_scores_channel
    ON scores(channel_id);

CREATE INDEX IF NOT EXISTS idx_scores_game
    ON scores(game, game_number);

CREATE INDEX IF NOT EXISTS idx_scores_username
    ON scores(username);

CREATE INDEX IF NOT EXISTS idx_puzzles_date
    ON puzzles(date);
"#;
