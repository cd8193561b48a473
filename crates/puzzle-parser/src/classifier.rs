//! Ordered game grammars.
//!
//! Rules are tried in order and the first match wins. Order matters:
//! the Animal grammar matches almost anything containing `Animal #n`,
//! so it runs last, and prefixed names (`Daily Sequence Octordle`) are
//! captured by the grammar of the game they qualify rather than by a
//! later, looser one.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub(crate) const UNSOLVED_BOARD: &str = "🟥";
pub(crate) const CONNECTIONS_TILES: &[&str] = &["🟨", "🟩", "🟪", "🟦"];
pub(crate) const STRANDS_HINT: &[&str] = &["💡"];
pub(crate) const ANIMAL_GUESSES: &[&str] = &["🟧", "🟩", "🟥"];

/// Animal shares 20 tiles when every guess missed.
pub(crate) const ANIMAL_TOTAL_FAILURE: usize = 20;

/// How a game encodes its result in the shared text.
///
/// The display name (`Daily Dordle`, `Wordle`) lives on the
/// [`Classification`]; the family only decides how to score it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameFamily {
    /// `3/6`, with `X` for a failed board.
    Ratio { max_attempts: u32 },
    /// `4&6/7`, two boards scored independently and summed.
    DualBoard { failure_value: u32 },
    /// `Score: 73`, lost if any board shows the unsolved glyph.
    ScoreLabel { unsolved_glyph: &'static str },
    /// Rows of coloured tiles; won when every group came out in one colour.
    TileRows {
        tiles: &'static [&'static str],
        groups: usize,
        failure_value: u32,
    },
    /// Number of marker glyphs; there is no losing outcome.
    GlyphCount { glyphs: &'static [&'static str] },
    /// Number of marker glyphs; one specific count means a total failure.
    GlyphCountWithFailure {
        glyphs: &'static [&'static str],
        failure_count: usize,
    },
}

/// Result of matching a message against the grammar list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub family: GameFamily,
    pub game: String,
    pub game_number: String,
    /// Every named capture of the matching grammar, including `game`
    /// and `game_number`.
    pub captures: HashMap<String, String>,
}

impl Classification {
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }
}

struct Rule {
    pattern: Regex,
    family: GameFamily,
}

fn rule(pattern: &str, family: GameFamily) -> Rule {
    Rule {
        pattern: Regex::new(pattern).unwrap(),
        family,
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            r"(?s)(?P<game>Wordle) (?P<game_number>[\d,]+) (?P<score>\w)/6(?P<hardmode>[*]?)",
            GameFamily::Ratio { max_attempts: 6 },
        ),
        rule(
            r"(?s)(?P<game>[A-Za-z ]*Dordle) (?P<game_number>\d+) (?P<left>\w)&(?P<right>\w)/7",
            GameFamily::DualBoard { failure_value: 7 },
        ),
        rule(
            r"(?s)(?P<game>[A-Za-z ]*Octordle) #(?P<game_number>\d+).*Score: (?P<score>\d+)",
            GameFamily::ScoreLabel {
                unsolved_glyph: UNSOLVED_BOARD,
            },
        ),
        rule(
            r"(?s)(?P<game>Connections).*Puzzle #(?P<game_number>\d+)",
            GameFamily::TileRows {
                tiles: CONNECTIONS_TILES,
                groups: 4,
                failure_value: 7,
            },
        ),
        rule(
            r"(?s)(?P<game>Tradle) #(?P<game_number>\d+).*(?P<score>[123456X])/6",
            GameFamily::Ratio { max_attempts: 6 },
        ),
        rule(
            r"(?s)(?P<game>Strands) #(?P<game_number>\d+)",
            GameFamily::GlyphCount {
                glyphs: STRANDS_HINT,
            },
        ),
        rule(
            r"(?s).*(?P<game>Animal) #(?P<game_number>\d+)",
            GameFamily::GlyphCountWithFailure {
                glyphs: ANIMAL_GUESSES,
                failure_count: ANIMAL_TOTAL_FAILURE,
            },
        ),
    ]
});

/// Match `content` against the grammars in order.
///
/// Grammars are unanchored, so commentary before or after the shared
/// result does not prevent a match.
pub fn classify(content: &str) -> Option<Classification> {
    RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(content)?;
        let captures: HashMap<String, String> = rule
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Some(Classification {
            family: rule.family,
            game: captures.get("game").cloned().unwrap_or_default(),
            game_number: captures.get("game_number").cloned().unwrap_or_default(),
            captures,
        })
    })
}
