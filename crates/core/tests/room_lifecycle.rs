use dungeon_core::{
    Direction, Dungeon, DungeonConfig, DungeonEvent, DungeonLayout, EnemyDefeat, EnemyHandle,
    GridPos, RoomType, SimulatedHost,
};

fn three_enemy_config() -> DungeonConfig {
    let mut config = DungeonConfig::default();
    config.room.min_enemies = 3;
    config.room.max_enemies = 3;
    config
}

fn line_layout() -> DungeonLayout {
    DungeonLayout::from_placements(
        11,
        &[
            (GridPos::new(0, 0), RoomType::Start),
            (GridPos::new(1, 0), RoomType::Normal),
            (GridPos::new(1, 1), RoomType::Shop),
            (GridPos::new(2, 0), RoomType::SpecialEvent),
        ],
    )
}

fn run(dungeon: &mut Dungeon, host: &mut SimulatedHost, ticks: u64) {
    for _ in 0..ticks {
        dungeon.tick(host).expect("tick");
    }
}

#[test]
fn start_room_is_cleared_and_never_spawns() {
    let mut dungeon = Dungeon::new(DungeonConfig::default()).expect("config");
    dungeon.generate(5).expect("generate");
    let mut host = SimulatedHost::new();

    let start_id = dungeon.start_room_id().expect("start id");
    let start = dungeon.start_room().expect("start");
    assert_eq!(start.room_type(), RoomType::Start);
    assert!(start.enemies_cleared());
    assert!(!start.has_pending_spawn());

    dungeon.enter_room(start_id).expect("enter");
    run(&mut dungeon, &mut host, 200);
    assert!(host.spawned.is_empty());
}

#[test]
fn three_enemies_unblock_doors_only_on_the_last_defeat() {
    let mut dungeon = Dungeon::new(three_enemy_config()).expect("config");
    dungeon.install(&line_layout()).expect("install");
    let mut host = SimulatedHost::new();

    let normal = dungeon.room_id_at(GridPos::new(1, 0)).expect("normal");
    let delay = spawn_delay(&dungeon);
    dungeon.enter_room(normal).expect("enter");
    run(&mut dungeon, &mut host, delay);

    assert_eq!(host.spawned.len(), 3);
    let room = dungeon.room(normal).expect("room");
    assert_eq!(room.active_enemy_count(), 3);
    assert!(room.are_doors_blocked());
    assert!(!room.enemies_cleared());

    let handles: Vec<EnemyHandle> = host.spawned.iter().map(|enemy| enemy.handle).collect();
    assert_eq!(dungeon.defeat_enemy(handles[0]), EnemyDefeat::Remaining(2));
    assert_eq!(dungeon.defeat_enemy(handles[1]), EnemyDefeat::Remaining(1));
    assert!(dungeon.room(normal).expect("room").are_doors_blocked());

    assert_eq!(
        dungeon.defeat_enemy(handles[2]),
        EnemyDefeat::RoomCleared { floor_completed: false }
    );
    let room = dungeon.room(normal).expect("room");
    assert!(room.enemies_cleared());
    assert!(!room.are_doors_blocked());
    assert!(dungeon.log().contains(&DungeonEvent::RoomCleared { room: GridPos::new(1, 0) }));
}

fn spawn_delay(dungeon: &Dungeon) -> u64 {
    dungeon.config().room.spawn_delay_ticks
}

#[test]
fn enemies_spawn_around_the_room_center() {
    let mut dungeon = Dungeon::new(three_enemy_config()).expect("config");
    dungeon.install(&line_layout()).expect("install");
    let mut host = SimulatedHost::new();

    let normal = dungeon.room_id_at(GridPos::new(1, 0)).expect("normal");
    let delay = spawn_delay(&dungeon);
    dungeon.enter_room(normal).expect("enter");
    run(&mut dungeon, &mut host, delay);

    let center = dungeon.room_center(normal).expect("center");
    let config = dungeon.config().room.clone();
    for enemy in &host.spawned {
        assert!(config.enemy_templates.contains(&enemy.template));
        let offset = (enemy.at.x - center.x, enemy.at.y - center.y);
        assert!(
            config.spawn_points.iter().any(|point| (point.x, point.y) == offset),
            "{:?} is not a configured spawn point offset",
            offset
        );
    }
}

#[test]
fn re_entering_a_room_does_not_respawn() {
    let mut dungeon = Dungeon::new(three_enemy_config()).expect("config");
    dungeon.install(&line_layout()).expect("install");
    let mut host = SimulatedHost::new();

    let normal = dungeon.room_id_at(GridPos::new(1, 0)).expect("normal");
    assert!(dungeon.enter_room(normal).expect("first entry"));
    run(&mut dungeon, &mut host, 40);
    dungeon.defeat_all_in_room(normal).expect("defeat");

    assert!(!dungeon.enter_room(normal).expect("second entry"));
    run(&mut dungeon, &mut host, 40);
    assert_eq!(host.spawned.len(), 3);
    assert!(dungeon.room(normal).expect("room").enemies_cleared());
}

#[test]
fn visited_tracking_resets_with_each_generation() {
    let mut dungeon = Dungeon::new(DungeonConfig::default()).expect("config");
    dungeon.generate(31).expect("generate");

    let ids: Vec<_> = dungeon.rooms().map(|(id, _)| id).collect();
    for (index, &id) in ids.iter().enumerate() {
        assert!(!dungeon.are_all_rooms_visited(), "only {index} rooms visited so far");
        dungeon.enter_room(id).expect("enter");
    }
    assert!(dungeon.are_all_rooms_visited());

    dungeon.generate(32).expect("regenerate");
    assert!(!dungeon.are_all_rooms_visited());
    assert!(dungeon.room(ids[0]).is_none(), "old handles no longer resolve");
    assert!(dungeon.enter_room(ids[0]).is_err());
}

#[test]
fn pending_spawn_is_cancelled_by_regeneration() {
    let mut dungeon = Dungeon::new(three_enemy_config()).expect("config");
    dungeon.install(&line_layout()).expect("install");
    let mut host = SimulatedHost::new();

    let normal = dungeon.room_id_at(GridPos::new(1, 0)).expect("normal");
    let delay = spawn_delay(&dungeon);
    dungeon.enter_room(normal).expect("enter");
    run(&mut dungeon, &mut host, delay - 1);
    assert!(host.spawned.is_empty());

    dungeon.generate(64).expect("regenerate");
    run(&mut dungeon, &mut host, delay * 4);

    assert!(host.spawned.is_empty(), "the old room's spawn timer never fires");
    assert!(dungeon.rooms().all(|(_, room)| !room.are_doors_blocked()));
    assert!(dungeon.rooms().all(|(_, room)| room.active_enemy_count() == 0));
    assert!(!dungeon.log().iter().any(|event| matches!(event, DungeonEvent::EnemiesSpawned { .. })));
}

#[test]
fn clearing_the_event_room_last_completes_the_floor_once() {
    let mut dungeon = Dungeon::new(three_enemy_config()).expect("config");
    dungeon.install(&line_layout()).expect("install");
    let mut host = SimulatedHost::new();

    let ids: Vec<_> = dungeon.rooms().map(|(id, _)| id).collect();
    for &id in &ids {
        dungeon.enter_room(id).expect("enter");
    }
    run(&mut dungeon, &mut host, 40);

    let event = dungeon.room_id_at(GridPos::new(2, 0)).expect("event room");
    let outcomes = dungeon.defeat_all_in_room(event).expect("defeat");
    assert_eq!(outcomes.last(), Some(&EnemyDefeat::RoomCleared { floor_completed: true }));
    assert!(dungeon.take_floor_request());

    let completions = dungeon
        .log()
        .iter()
        .filter(|event| matches!(event, DungeonEvent::FloorCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    assert!(dungeon.door_at(GridPos::new(2, 0), Direction::Left).is_some());
}
