//! Per-family score extraction.

use std::sync::LazyLock;

use regex::Regex;
use score_db::scores::Score;

use crate::ParseError;
use crate::classifier::{Classification, GameFamily};

/// Marker for a failed board in ratio grammars.
const FAILED_BOARD: &str = "X";

/// Connections shares at most this many tile runs worth looking at.
const MAX_TILE_ROWS: usize = 64;

static TILE_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[🟨🟩🟪🟦]+").unwrap());

/// Score extracted from message text, before it is tied to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScore {
    pub game: String,
    pub game_number: String,
    pub score: String,
    pub win: Option<bool>,
    pub hardmode: bool,
}

impl ParsedScore {
    pub fn into_score(self, id: String, channel_id: String, username: String) -> Score {
        Score {
            id,
            channel_id,
            username,
            game: self.game,
            game_number: self.game_number,
            score: self.score,
            win: self.win,
            hardmode: self.hardmode,
        }
    }
}

impl GameFamily {
    /// Turn a classified message into a score.
    ///
    /// A classified message always yields a score; only a capture that
    /// contradicts its own grammar is reported as an error.
    pub fn extract(
        &self,
        classification: &Classification,
        content: &str,
    ) -> Result<ParsedScore, ParseError> {
        let mut parsed = ParsedScore {
            game: classification.game.clone(),
            game_number: classification.game_number.clone(),
            score: first_line(content).to_string(),
            win: None,
            hardmode: classification.capture("hardmode") == Some("*"),
        };

        match *self {
            Self::Ratio { max_attempts } => {
                let captured = classification.capture("score").unwrap_or_default();
                let (value, failed) = board_value(classification, captured, max_attempts + 1)?;
                parsed.score = if failed {
                    value.to_string()
                } else {
                    captured.to_string()
                };
                parsed.win = Some(!failed);
            }
            Self::DualBoard { failure_value } => {
                let left = classification.capture("left").unwrap_or_default();
                let right = classification.capture("right").unwrap_or_default();
                let (left_value, left_failed) = board_value(classification, left, failure_value)?;
                let (right_value, right_failed) =
                    board_value(classification, right, failure_value)?;
                parsed.score = (left_value + right_value).to_string();
                parsed.win = Some(!left_failed && !right_failed);
            }
            Self::ScoreLabel { unsolved_glyph } => {
                if let Some(score) = classification.capture("score") {
                    parsed.score = score.to_string();
                }
                parsed.win = Some(!content.contains(unsolved_glyph));
            }
            Self::TileRows {
                tiles,
                groups,
                failure_value,
            } => {
                let rows: Vec<&str> = TILE_ROW
                    .find_iter(content)
                    .take(MAX_TILE_ROWS)
                    .map(|m| m.as_str())
                    .collect();
                let solved = rows
                    .iter()
                    .filter(|row| is_solved_group(row, tiles, groups))
                    .count();
                if solved == groups {
                    parsed.score = rows.len().to_string();
                    parsed.win = Some(true);
                } else {
                    parsed.score = failure_value.to_string();
                    parsed.win = Some(false);
                }
            }
            Self::GlyphCount { glyphs } => {
                parsed.score = count_glyphs(content, glyphs).to_string();
                parsed.win = Some(true);
            }
            Self::GlyphCountWithFailure {
                glyphs,
                failure_count,
            } => {
                let count = count_glyphs(content, glyphs);
                parsed.score = count.to_string();
                parsed.win = Some(count != failure_count);
            }
        }

        Ok(parsed)
    }
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or_default()
}

/// Value of one board: its attempt count, or `failure_value` for `X`.
fn board_value(
    classification: &Classification,
    captured: &str,
    failure_value: u32,
) -> Result<(u32, bool), ParseError> {
    if captured == FAILED_BOARD {
        return Ok((failure_value, true));
    }
    captured
        .parse::<u32>()
        .map(|value| (value, false))
        .map_err(|_| ParseError::ExtractionInconsistency {
            game: classification.game.clone(),
            detail: format!("board result {captured:?} is neither a count nor {FAILED_BOARD}"),
        })
}

/// A solved group is one full row in a single colour.
fn is_solved_group(row: &str, tiles: &[&str], groups: usize) -> bool {
    tiles.iter().any(|tile| *row == tile.repeat(groups))
}

fn count_glyphs(content: &str, glyphs: &[&str]) -> usize {
    glyphs
        .iter()
        .map(|glyph| content.matches(glyph).count())
        .sum()
}
