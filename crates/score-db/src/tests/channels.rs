use super::test_db;
use crate::channels::ChannelInfo;

#[test]
fn test_channel_cache() {
    let db = test_db();
    assert!(db.get_channel("100").unwrap().is_none());

    let mut info = ChannelInfo {
        channel_id: "100".into(),
        guild_id: "7".into(),
        name: "wordle".into(),
    };
    db.upsert_channel(&info).unwrap();
    assert_eq!(db.get_channel("100").unwrap(), Some(info.clone()));

    info.name = "puzzles".into();
    db.upsert_channel(&info).unwrap();
    assert_eq!(db.get_channel("100").unwrap().unwrap().name, "puzzles");
    assert_eq!(db.list_channel_ids().unwrap(), vec!["100"]);
}
