//! Text renderings of per-user statistics.

use std::fmt::Write;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use discord_client::snowflake::{self, SnowflakeError, default_date_range, format_date};
use score_db::scores::Score;
use score_db::stats::UserStats;
use score_db::{Database, DbError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Store failure: {0}")]
    Store(#[from] DbError),

    #[error("Date out of range: {0}")]
    Codec(#[from] SnowflakeError),
}

/// Output layout for [`format_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Tab-separated, one header row.
    #[default]
    Tabs,
    /// Fenced markdown table sized for chat.
    Markdown,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "tabs" => Ok(Self::Tabs),
            "md" | "md-discord" | "markdown" => Ok(Self::Markdown),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Query and render statistics for one game.
///
/// Without an explicit window the last 30 days up to today are used.
pub fn render_stats(
    db: &Database,
    game: &str,
    guild_id: Option<&str>,
    window: Option<(NaiveDate, NaiveDate)>,
    format: ExportFormat,
) -> Result<String, DbError> {
    let (from, to) = window.unwrap_or_else(|| default_date_range(Utc::now().date_naive()));
    let stats = db.get_stats(game, guild_id, &format_date(from), &format_date(to))?;
    Ok(format_stats(&stats, format))
}

/// Scores posted on the UTC days `from..=to`, oldest first.
///
/// The window is matched against message ids, so it selects by when the
/// result was posted rather than by the puzzle's date.
pub fn scores_posted_between(
    db: &Database,
    channel_id: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Score>, ExportError> {
    let (start, end) = snowflake::id_window(from, to)?;
    Ok(db.get_scores_in_id_range(channel_id, start, end)?)
}

pub fn format_stats(stats: &[UserStats], format: ExportFormat) -> String {
    match format {
        ExportFormat::Tabs => format_tabs(stats),
        ExportFormat::Markdown => format_markdown(stats),
    }
}

pub fn format_tabs(stats: &[UserStats]) -> String {
    let mut out = String::from("Username\tCount\tLowest\tAverage\tHighest\n");
    for stat in stats {
        let _ = writeln!(
            out,
            "{}\t{}\t{:.0}\t{:.2}\t{:.0}",
            stat.username, stat.count, stat.lowest, stat.average, stat.highest
        );
    }
    out
}

pub fn format_markdown(stats: &[UserStats]) -> String {
    let title = "Username";
    let width = stats
        .iter()
        .map(|s| s.username.chars().count())
        .chain(std::iter::once(title.len()))
        .max()
        .unwrap_or(title.len());

    let mut out = String::from("```md\n");
    let _ = writeln!(out, "| {title:<width$} |  # | Min | Mean | Max |");
    let _ = writeln!(out, "| {} | -- | --- | ---- | --- |", "-".repeat(width));
    for stat in stats {
        let _ = writeln!(
            out,
            "| {:<width$} | {:>2} | {:>3.0} | {:>4.1} | {:>3.0} |",
            stat.username, stat.count, stat.lowest, stat.average, stat.highest
        );
    }
    out.push_str("```\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Vec<UserStats> {
        vec![
            UserStats {
                username: "bob".into(),
                count: 3,
                lowest: 2.0,
                average: 3.0,
                highest: 4.0,
            },
            UserStats {
                username: "annabelle".into(),
                count: 12,
                lowest: 3.0,
                average: 4.5,
                highest: 7.0,
            },
        ]
    }

    #[test]
    fn tabs_layout() {
        assert_eq!(
            format_tabs(&stats()),
            "Username\tCount\tLowest\tAverage\tHighest\n\
             bob\t3\t2\t3.00\t4\n\
             annabelle\t12\t3\t4.50\t7\n"
        );
    }

    #[test]
    fn markdown_pads_to_longest_name() {
        let expected = "```md\n\
| Username  |  # | Min | Mean | Max |\n\
| --------- | -- | --- | ---- | --- |\n\
| bob       |  3 |   2 |  3.0 |   4 |\n\
| annabelle | 12 |   3 |  4.5 |   7 |\n\
```\n";
        assert_eq!(format_markdown(&stats()), expected);
    }

    #[test]
    fn empty_markdown_keeps_header() {
        let out = format_markdown(&[]);
        assert!(out.starts_with("```md\n| Username |  # |"));
        assert!(out.ends_with("```\n"));
    }

    #[test]
    fn render_reads_the_store() {
        use score_db::puzzles::Puzzle;

        let db = Database::open_in_memory().unwrap();
        let score = Score {
            id: "1".into(),
            channel_id: "1100".into(),
            username: "bob".into(),
            game: "Wordle".into(),
            game_number: "900".into(),
            score: "4".into(),
            win: Some(true),
            hardmode: false,
        };
        let puzzle = Puzzle {
            game: "Wordle".into(),
            game_number: "900".into(),
            date: "2023-12-01".into(),
        };
        db.persist_page(&[score], &[puzzle]).unwrap();

        let day = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let out = render_stats(&db, "Wordle", None, Some((day, day)), ExportFormat::Tabs).unwrap();
        assert!(out.ends_with("bob\t1\t4\t4.00\t4\n"));

        let out = render_stats(&db, "Tradle", None, Some((day, day)), ExportFormat::Tabs).unwrap();
        assert_eq!(out, format_tabs(&[]));
    }

    #[test]
    fn posted_window_includes_the_whole_last_day() {
        use discord_client::snowflake::encode_str;

        let db = Database::open_in_memory().unwrap();
        let score = |posted: &str| Score {
            id: encode_str(posted).unwrap().to_string(),
            channel_id: "1100".into(),
            username: "bob".into(),
            game: "Wordle".into(),
            game_number: posted.into(),
            score: "3".into(),
            win: Some(true),
            hardmode: false,
        };
        let before = score("2024-03-01T23:59:59");
        let first = score("2024-03-02T00:00:00");
        let last = score("2024-03-03T23:59:00");
        let next_day = score("2024-03-04T00:00:00");
        db.persist_page(&[before, first.clone(), last.clone(), next_day], &[])
            .unwrap();

        let from = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let found = scores_posted_between(&db, Some("1100"), from, to).unwrap();
        assert_eq!(found, vec![first, last]);

        assert!(scores_posted_between(&db, Some("1200"), from, to).unwrap().is_empty());
    }

    #[test]
    fn posted_window_before_epoch_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let day = NaiveDate::from_ymd_opt(2014, 6, 1).unwrap();
        let err = scores_posted_between(&db, None, day, day).unwrap_err();
        assert!(matches!(err, ExportError::Codec(SnowflakeError::BeforeEpoch(_))));
    }

    #[test]
    fn format_names() {
        assert_eq!("md-discord".parse(), Ok(ExportFormat::Markdown));
        assert_eq!("".parse(), Ok(ExportFormat::Tabs));
        assert!("csv".parse::<ExportFormat>().is_err());
        assert_eq!(format_stats(&[], ExportFormat::Tabs), format_tabs(&[]));
    }
}
