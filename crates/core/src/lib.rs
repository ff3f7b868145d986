pub mod config;
pub mod door;
pub mod dungeon;
pub mod error;
pub mod generator;
pub mod graph;
pub mod grid;
pub mod host;
pub mod journal;
pub mod journal_file;
pub mod layout;
pub mod level;
pub mod replay;
pub mod rng;
pub mod room;
pub mod schedule;
pub mod seed;
pub mod special_door;
pub mod types;

pub use config::{
    DoorConfig, DungeonConfig, LevelConfig, RoomConfig, SpecialDoorConfig, TICKS_PER_SECOND,
};
pub use door::{DoorContact, DoorController, DoorState, arrival_offset};
pub use dungeon::{Dungeon, EnemyDefeat};
pub use error::{ConfigError, DungeonError, Result};
pub use generator::DungeonGenerator;
pub use graph::DungeonGraph;
pub use host::{DungeonHost, EnemySpawner, PlayerTransport, SimulatedHost, SpawnedEnemy};
pub use journal::{InputJournal, InputRecord, SessionInput};
pub use layout::{DungeonLayout, LayoutRoom};
pub use level::LevelFlow;
pub use replay::{ReplayError, ReplayResult, Session, replay_to_end};
pub use rng::RandomSource;
pub use room::Room;
pub use special_door::{SpecialDoor, SpecialDoorContact, SpecialDoorState};
pub use types::*;
