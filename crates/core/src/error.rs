//! Error types surfaced by configuration, generation and room transitions.

use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error;

use crate::types::{Direction, GridPos};

pub type Result<T> = result::Result<T, DungeonError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("min_rooms must be at least 1")]
    ZeroMinRooms,

    #[error("min_rooms ({min}) exceeds max_rooms ({max})")]
    RoomRange { min: usize, max: usize },

    #[error("min_enemies ({min}) exceeds max_enemies ({max})")]
    EnemyRange { min: usize, max: usize },

    #[error("room size must be positive, got {x}x{y}")]
    RoomSize { x: f32, y: f32 },

    #[error("rooms can spawn enemies but no enemy templates are configured")]
    MissingEnemyTemplates,

    #[error("rooms can spawn enemies but no spawn points are configured")]
    MissingSpawnPoints,

    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum DungeonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("door {direction:?} of room {from:?} leads to {target:?}, where no room exists")]
    MissingNeighbour { from: GridPos, direction: Direction, target: GridPos },

    #[error("connection {direction:?} of room {room:?} was already set")]
    ConnectionAlreadySet { room: GridPos, direction: Direction },

    #[error("room handle does not belong to the current dungeon")]
    UnknownRoom,

    #[error("door handle does not belong to the current dungeon")]
    UnknownDoor,

    #[error("layout is invalid: {reason}")]
    InvalidLayout { reason: String },
}
