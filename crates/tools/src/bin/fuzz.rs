use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use dungeon_core::journal_file::JournalWriter;
use dungeon_core::{
    Direction, Dungeon, DungeonConfig, Session, SessionInput, replay_to_end,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 1000)]
    steps: u32,
    /// Also write the session to a hash-chained JSONL journal
    #[arg(short, long)]
    journal: Option<PathBuf>,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> Option<T> {
    if slice.is_empty() {
        return None;
    }
    let index = rng.next_u64() as usize % slice.len();
    slice.get(index).copied()
}

/// Picks the next input from what the current room allows.
fn next_input(rng: &mut ChaCha8Rng, dungeon: &Dungeon) -> SessionInput {
    let current = dungeon.current_room().and_then(|id| dungeon.room(id));
    let roll = rng.next_u64() % 10;

    if let Some(room) = current {
        let enemies: Vec<_> = room.active_enemies().collect();
        if roll < 3
            && let Some(enemy) = choose(rng, &enemies)
        {
            return SessionInput::DefeatEnemy { enemy };
        }
        if roll < 6 {
            let exits: Vec<Direction> =
                Direction::ALL.into_iter().filter(|&d| room.has_connection(d)).collect();
            if let Some(direction) = choose(rng, &exits) {
                return SessionInput::TouchDoor { room: room.position(), direction };
            }
        }
    }
    if roll == 9 {
        return SessionInput::TouchSpecialDoor;
    }
    SessionInput::Advance { frames: (rng.next_u64() % 30) as u32 + 1 }
}

fn check_invariants(session: &Session) -> Result<()> {
    let flow = session.flow();
    let dungeon = flow.dungeon();
    ensure!(flow.current_level() >= 1, "level counter dropped below 1");
    let start = dungeon.start_room().context("dungeon has no start room")?;
    ensure!(start.enemies_cleared(), "start room holds enemies");

    for (_, room) in dungeon.rooms() {
        let pos = room.position();
        for direction in Direction::ALL {
            let neighbour = dungeon.room_at(pos.step(direction)).is_some();
            ensure!(
                room.has_connection(direction) == neighbour,
                "room {pos:?} connection {direction:?} disagrees with adjacency"
            );
            ensure!(
                dungeon.door_at(pos, direction).is_some() == neighbour,
                "room {pos:?} door {direction:?} disagrees with adjacency"
            );
        }
        if room.are_doors_blocked() {
            ensure!(room.active_enemy_count() > 0, "room {pos:?} blocked with no enemies");
            ensure!(!room.enemies_cleared(), "room {pos:?} blocked after clearing");
        }
        if room.enemies_cleared() && room.active_enemy_count() > 0 {
            bail!("room {pos:?} cleared while enemies remain");
        }
    }

    let moving = dungeon.doors().filter(|(_, door)| door.is_transitioning()).count();
    ensure!(moving <= 1, "{moving} door transfers running at once");
    ensure!(
        session.host().input_enabled == (moving == 0),
        "input enabled = {} with {moving} transfers running",
        session.host().input_enabled
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("Starting fuzz harness on seed {} for {} steps...", args.seed, args.steps);

    let config = DungeonConfig::default();
    let mut session = Session::start(config.clone(), args.seed)?;
    let mut writer = match &args.journal {
        Some(path) => Some(
            JournalWriter::create(path, args.seed, "fuzz", &config)
                .with_context(|| format!("Failed to create journal: {}", path.display()))?,
        ),
        None => None,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for step in 0..args.steps {
        let input = next_input(&mut rng, session.flow().dungeon());
        if let Some(writer) = writer.as_mut() {
            writer.append(session.flow().dungeon().now(), &input)?;
        }
        session.apply(input).with_context(|| format!("step {step}: {input:?} failed"))?;
        check_invariants(&session).with_context(|| format!("after step {step}"))?;
    }

    let live = session.result();
    let replayed = replay_to_end(session.journal()).context("Replay of the fuzz session failed")?;
    ensure!(replayed == live, "replay diverged: live {live:?}, replayed {replayed:?}");

    println!(
        "Fuzzing completed: tick {}, level {}, hash {:#018x}",
        live.final_tick, live.final_level, live.final_snapshot_hash
    );
    Ok(())
}
