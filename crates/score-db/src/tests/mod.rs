use crate::Database;
use crate::puzzles::Puzzle;
use crate::scores::Score;

fn test_db() -> Database {
    Database::open_in_memory().expect("Failed to create test DB")
}

fn score(id: &str, username: &str, game: &str, game_number: &str, value: &str) -> Score {
    Score {
        id: id.into(),
        channel_id: "100".into(),
        username: username.into(),
        game: game.into(),
        game_number: game_number.into(),
        score: value.into(),
        win: Some(true),
        hardmode: false,
    }
}

fn puzzle(game: &str, game_number: &str, date: &str) -> Puzzle {
    Puzzle {
        game: game.into(),
        game_number: game_number.into(),
        date: date.into(),
    }
}

mod channels;
