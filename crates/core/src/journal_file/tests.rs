use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tempfile::{TempDir, tempdir};

use super::*;
use crate::types::{Direction, EnemyHandle, GridPos};

fn journal_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join(name);
    (dir, path)
}

fn touch_right() -> SessionInput {
    SessionInput::TouchDoor { room: GridPos::ORIGIN, direction: Direction::Right }
}

#[test]
fn header_and_records_round_trip() {
    let (_dir, path) = journal_path("session.jsonl");
    let mut config = DungeonConfig::default();
    config.max_rooms = 9;

    let mut writer = JournalWriter::create(&path, 42, "test-build", &config).expect("create");
    writer.append(0, &SessionInput::Advance { frames: 30 }).expect("append");
    writer.append(30, &touch_right()).expect("append");
    writer.append(61, &SessionInput::DefeatEnemy { enemy: EnemyHandle(3) }).expect("append");

    let loaded = load_journal_from_file(&path).expect("load");
    assert_eq!(loaded.journal.format_version, JOURNAL_FORMAT_VERSION);
    assert_eq!(loaded.journal.build_id, "test-build");
    assert_eq!(loaded.journal.seed, 42);
    assert_eq!(loaded.journal.config, config);

    let inputs = &loaded.journal.inputs;
    assert_eq!(inputs.len(), 3);
    assert_eq!(inputs[1].input, touch_right());
    assert_eq!(inputs[2].tick, 61);
    assert_eq!(inputs.iter().map(|record| record.seq).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(loaded.next_seq, 3);
    assert_ne!(loaded.last_sha256_hex, INITIAL_HASH);
}

#[test]
fn tampered_record_breaks_the_chain() {
    let (_dir, path) = journal_path("tampered.jsonl");
    let mut writer =
        JournalWriter::create(&path, 1, "dev", &DungeonConfig::default()).expect("create");
    writer.append(0, &SessionInput::Advance { frames: 10 }).expect("append");
    writer.append(10, &touch_right()).expect("append");

    let content = fs::read_to_string(&path).expect("read");
    let tampered = content.replace("\"Right\"", "\"Left\"");
    assert_ne!(tampered, content);
    fs::write(&path, tampered).expect("write");

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::HashChainBroken { line: 3 })),
        "expected broken chain at line 3, got: {result:?}"
    );
}

#[test]
fn deleted_record_is_detected() {
    let (_dir, path) = journal_path("deleted.jsonl");
    let mut writer =
        JournalWriter::create(&path, 1, "dev", &DungeonConfig::default()).expect("create");
    for frames in 1..=3 {
        writer.append(u64::from(frames), &SessionInput::Advance { frames }).expect("append");
    }

    let content = fs::read_to_string(&path).expect("read");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    fs::write(&path, format!("{}\n{}\n{}\n", lines[0], lines[1], lines[3])).expect("write");

    let result = load_journal_from_file(&path);
    assert!(
        matches!(
            result,
            Err(JournalLoadError::InvalidRecord { line: 3, .. })
                | Err(JournalLoadError::HashChainBroken { line: 3 })
        ),
        "expected corruption at line 3, got: {result:?}"
    );
}

#[test]
fn truncated_tail_is_incomplete() {
    let (_dir, path) = journal_path("truncated.jsonl");
    let mut writer =
        JournalWriter::create(&path, 1, "dev", &DungeonConfig::default()).expect("create");
    writer.append(0, &SessionInput::TouchSpecialDoor).expect("append");
    drop(writer);

    let mut file = OpenOptions::new().append(true).open(&path).expect("open");
    write!(file, "{{\"seq\":1,\"tick").expect("write partial line");

    let result = load_journal_from_file(&path);
    assert!(
        matches!(result, Err(JournalLoadError::IncompleteLine { line: 3 })),
        "expected incomplete line 3, got: {result:?}"
    );
}

#[test]
fn empty_and_garbage_files_are_rejected() {
    let (_dir, path) = journal_path("empty.jsonl");
    fs::write(&path, "").expect("write");
    assert!(matches!(load_journal_from_file(&path), Err(JournalLoadError::EmptyFile)));

    fs::write(&path, "not json\n").expect("write");
    assert!(matches!(
        load_journal_from_file(&path),
        Err(JournalLoadError::InvalidHeader { line: 1, .. })
    ));
}

#[test]
fn resumed_writer_extends_the_chain() {
    let (_dir, path) = journal_path("resume.jsonl");
    let mut writer =
        JournalWriter::create(&path, 5, "dev", &DungeonConfig::default()).expect("create");
    writer.append(0, &SessionInput::Advance { frames: 4 }).expect("append");
    drop(writer);

    let loaded = load_journal_from_file(&path).expect("load");
    assert_eq!(loaded.next_seq, 1);
    let mut writer = JournalWriter::resume(&path, &loaded).expect("resume");
    writer.append(4, &SessionInput::PlayerDied).expect("append");
    drop(writer);

    let reloaded = load_journal_from_file(&path).expect("reload");
    assert_eq!(reloaded.journal.inputs.len(), 2);
    assert_eq!(reloaded.journal.inputs[1].input, SessionInput::PlayerDied);
    assert_eq!(reloaded.next_seq, 2);
}
