use discord_client::{Author, Message};

use super::*;

struct Case {
    input: &'static str,
    game: &'static str,
    game_number: &'static str,
    score: &'static str,
    win: Option<bool>,
    hardmode: bool,
}

fn assert_case(case: &Case) {
    let parsed = parse_content(case.input)
        .unwrap_or_else(|e| panic!("{:?} returned error: {e}", case.input));
    assert_eq!(parsed.game, case.game, "[game] {}", case.input);
    assert_eq!(parsed.game_number, case.game_number, "[game_number] {}", case.input);
    assert_eq!(parsed.score, case.score, "[score] {}", case.input);
    assert_eq!(parsed.win, case.win, "[win] {}", case.input);
    assert_eq!(parsed.hardmode, case.hardmode, "[hardmode] {}", case.input);
}

#[test]
fn wordle_scores() {
    let cases = [
        Case {
            input: "Wordle 771 3/6*\n\n⬛⬛⬛⬛🟩\n🟨🟩⬛⬛🟩\n🟩🟩🟩🟩🟩",
            game: "Wordle",
            game_number: "771",
            score: "3",
            win: Some(true),
            hardmode: true,
        },
        Case {
            input: "Wordle 771 3/6*\r\n\r\n⬛⬛⬛⬛🟩\r\n🟨🟩⬛⬛🟩\r\n🟩🟩🟩🟩🟩",
            game: "Wordle",
            game_number: "771",
            score: "3",
            win: Some(true),
            hardmode: true,
        },
        Case {
            input: "Wordle 733 X/6\r\n\r\n🟨⬛⬛⬛⬛\r\n⬛🟩⬛🟨⬛\r\n⬛🟩⬛🟨🟩\r\n⬛🟩🟩🟩🟩\r\n⬛🟩🟩🟩🟩\r\n⬛🟩🟩🟩🟩",
            game: "Wordle",
            game_number: "733",
            score: "7",
            win: Some(false),
            hardmode: false,
        },
        Case {
            input: "Wordle 1,327 4/6\n⬜🟩🟨⬜⬜\n⬜⬜🟨⬜⬜\n⬜⬜⬜⬜🟨\n🟩🟩🟩🟩🟩",
            game: "Wordle",
            game_number: "1,327",
            score: "4",
            win: Some(true),
            hardmode: false,
        },
    ];
    cases.iter().for_each(assert_case);
}

#[test]
fn dordle_scores() {
    let cases = [
        Case {
            input: "Daily Dordle 0597 4&6/7 🟨🟨⬜⬜⬜ 🟨⬜🟨⬜⬜ ⬜⬜⬜⬜⬜ ⬜⬜⬜⬜⬜ ⬜⬜🟨🟨⬜ ⬜⬜⬜⬜⬜ 🟩🟩🟩🟩🟩 ⬜🟨⬜⬜⬜ ⬛⬛⬛⬛⬛ ⬜🟩🟨🟩🟩 ⬛⬛⬛⬛⬛ 🟩🟩🟩🟩🟩 zaratustra.itch.io/dordle",
            game: "Daily Dordle",
            game_number: "0597",
            score: "10",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "Daily Dordle 1112 X&X/7\n⬜⬜⬜⬜⬜ ⬜🟨🟨⬜⬜\n⬜🟨🟩⬜⬜ ⬜⬜⬜🟨⬜\n⬜⬜⬜⬜⬜ ⬜⬜⬜⬜⬜\n🟨⬜⬜⬜⬜ ⬜🟨⬜🟨⬜\n⬜⬜⬜⬜⬜ ⬜⬜⬜⬜⬜\n🟩⬜⬜🟨⬜ ⬜⬜⬜⬜⬜\n🟨⬜⬜🟩⬜ ⬜🟨⬜⬜⬜\nzaratustra.itch.io/dordle",
            game: "Daily Dordle",
            game_number: "1112",
            score: "14",
            win: Some(false),
            hardmode: false,
        },
        Case {
            input: "Daily Dordle 1113 5&X/7",
            game: "Daily Dordle",
            game_number: "1113",
            score: "12",
            win: Some(false),
            hardmode: false,
        },
    ];
    cases.iter().for_each(assert_case);
}

#[test]
fn octordle_scores() {
    let cases = [
        Case {
            input: "Daily Octordle #553\r\n🔟7️⃣\r\n6️⃣8️⃣\r\n3️⃣5️⃣\r\n9️⃣🕚\r\nScore: 59",
            game: "Daily Octordle",
            game_number: "553",
            score: "59",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "Daily Octordle #501\r\n6️⃣🟥\r\n5️⃣8️⃣\r\n3️⃣🟥\r\n🕐🔟\r\nScore: 73",
            game: "Daily Octordle",
            game_number: "501",
            score: "73",
            win: Some(false),
            hardmode: false,
        },
        Case {
            input: "Daily Sequence Octordle #563 4️⃣5️⃣ 7️⃣8️⃣ 9️⃣🔟 🕚🕛 Score: 66",
            game: "Daily Sequence Octordle",
            game_number: "563",
            score: "66",
            win: Some(true),
            hardmode: false,
        },
    ];
    cases.iter().for_each(assert_case);
}

#[test]
fn connections_scores() {
    let cases = [
        Case {
            input: "Connections \nPuzzle #51\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟪🟪🟪🟪\n🟦🟦🟦🟦",
            game: "Connections",
            game_number: "51",
            score: "4",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "Connections\nPuzzle #60\n🟨🟩🟨🟨\n🟨🟨🟨🟨\n🟩🟩🟩🟩\n🟦🟪🟦🟦\n🟦🟦🟦🟦\n🟪🟪🟪🟪",
            game: "Connections",
            game_number: "60",
            score: "6",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "Connections Puzzle #59 🟦🟦🟩🟦 🟦🟦🟦🟩 🟦🟦🟨🟩 🟦🟦🟪🟩",
            game: "Connections",
            game_number: "59",
            score: "7",
            win: Some(false),
            hardmode: false,
        },
    ];
    cases.iter().for_each(assert_case);
}

#[test]
fn tradle_strands_and_animal_scores() {
    let cases = [
        Case {
            input: "#Tradle #527 2/6 🟩🟩🟩🟩🟨 🟩🟩🟩🟩🟩 https://oec.world/en/tradle",
            game: "Tradle",
            game_number: "527",
            score: "2",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "#Tradle #530 X/6 🟩🟨⬜⬜⬜ 🟩🟩🟨⬜⬜ https://oec.world/en/tradle",
            game: "Tradle",
            game_number: "530",
            score: "7",
            win: Some(false),
            hardmode: false,
        },
        Case {
            input: "Strands #120\n“Mind your manners”\n💡🔵🔵💡\n🔵🟡🔵🔵",
            game: "Strands",
            game_number: "120",
            score: "2",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "Animal #301\n🟥🟥🟧🟩",
            game: "Animal",
            game_number: "301",
            score: "4",
            win: Some(true),
            hardmode: false,
        },
        Case {
            input: "Animal #302\n🟥🟥🟥🟥🟥🟥🟥🟥🟥🟥\n🟥🟥🟥🟥🟥🟥🟥🟥🟥🟥",
            game: "Animal",
            game_number: "302",
            score: "20",
            win: Some(false),
            hardmode: false,
        },
    ];
    cases.iter().for_each(assert_case);
}

#[test]
fn parsing_is_deterministic() {
    let input = "Daily Octordle #501\r\n6️⃣🟥\r\n5️⃣8️⃣\r\n3️⃣🟥\r\n🕐🔟\r\nScore: 73";
    let first = parse_content(input).expect("first parse");
    for _ in 0..10 {
        assert_eq!(parse_content(input).expect("repeat parse"), first);
    }
}

#[test]
fn unmatched_and_blank_content_are_errors() {
    assert!(matches!(
        parse_content("anyone up for lunch?"),
        Err(ParseError::ClassificationMiss(_))
    ));
    assert_eq!(parse_content(" \n "), Err(ParseError::BlankContent));
}

#[test]
fn non_numeric_board_is_an_inconsistency() {
    let err = parse_content("Daily Dordle 12 a&3/7").unwrap_err();
    assert!(matches!(
        err,
        ParseError::ExtractionInconsistency { ref game, .. } if game == "Daily Dordle"
    ));
}

fn message(id: &str, kind: i64, content: &str) -> Message {
    Message {
        id: id.into(),
        channel_id: "1100".into(),
        kind,
        content: content.into(),
        author: Author {
            id: "42".into(),
            username: "alice".into(),
        },
    }
}

#[test]
fn parse_message_stamps_identity() {
    let score = parse_message(&message("1200", 0, "Wordle 771 3/6*")).expect("score");
    assert_eq!(score.id, "1200");
    assert_eq!(score.channel_id, "1100");
    assert_eq!(score.username, "alice");
    assert_eq!(score.game, "Wordle");
    assert_eq!(score.win, Some(true));
    assert!(score.hardmode);
}

#[test]
fn non_ordinary_messages_are_not_scores() {
    let err = parse_message(&message("1", 19, "Wordle 771 3/6")).unwrap_err();
    assert_eq!(err, ParseError::NotAScore { kind: 19 });
}

#[test]
fn parse_messages_skips_failures_and_keeps_the_rest() {
    let page = vec![
        message("3", 0, "Wordle 800 2/6"),
        message("2", 0, "nice one!"),
        message("1", 7, "joined the server"),
        message("0", 0, "Strands #5 💡"),
    ];
    let scores = parse_messages(&page);
    let ids: Vec<&str> = scores.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "0"]);
}
