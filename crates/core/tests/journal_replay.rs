use std::fs;
use std::path::Path;

use dungeon_core::journal_file::{JournalLoadError, JournalWriter, load_journal_from_file};
use dungeon_core::{Direction, DungeonConfig, Session, SessionInput, replay_to_end};

/// Plays a short session, mirroring every input into a JSONL journal file.
fn record_to_file(path: &Path, seed: u64) -> Session {
    let config = DungeonConfig::default();
    let mut session = Session::start(config.clone(), seed).expect("session");
    let mut writer = JournalWriter::create(path, seed, "test", &config).expect("create journal");

    let mut play = |session: &mut Session, input: SessionInput| {
        writer.append(session.flow().dungeon().now(), &input).expect("append");
        session.apply(input).expect("apply");
    };

    play(&mut session, SessionInput::Advance { frames: 15 });
    let start = session.flow().dungeon().start_room().expect("start").position();
    let direction = Direction::ALL
        .into_iter()
        .find(|&direction| session.flow().dungeon().door_at(start, direction).is_some())
        .expect("start has a door");
    play(&mut session, SessionInput::TouchDoor { room: start, direction });
    play(&mut session, SessionInput::Advance { frames: 75 });
    let neighbour = start.step(direction);
    play(&mut session, SessionInput::DefeatAllInRoom { room: neighbour });
    play(&mut session, SessionInput::TouchDoor { room: neighbour, direction: direction.opposite() });
    play(&mut session, SessionInput::Advance { frames: 40 });
    session
}

#[test]
fn file_journal_replays_to_the_live_result() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("session.jsonl");
    let session = record_to_file(&path, 4_242);

    let loaded = load_journal_from_file(&path).expect("load");
    assert_eq!(loaded.journal.inputs.len(), session.journal().inputs.len());
    assert_eq!(loaded.journal.inputs, session.journal().inputs);

    let replayed = replay_to_end(&loaded.journal).expect("replay");
    assert_eq!(replayed, session.result());
}

#[test]
fn corrupted_journal_refuses_to_load() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("session.jsonl");
    record_to_file(&path, 17);

    let content = fs::read_to_string(&path).expect("read");
    let corrupted = content.replacen("\"frames\":75", "\"frames\":76", 1);
    assert_ne!(corrupted, content);
    fs::write(&path, corrupted).expect("write");

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 4 })),
        "expected chain break on the edited record, got: {result:?}"
    );
}
