//! Tunables for generation, room encounters, door transitions and level flow.
//!
//! Every section deserializes with defaults, so a TOML file only needs the keys
//! it wants to override.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{EnemyTemplateId, WorldPos};

/// Host frame rate the tick-based delays are tuned for.
pub const TICKS_PER_SECOND: u64 = 60;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub min_rooms: usize,
    pub max_rooms: usize,
    /// World-space size of one grid cell.
    pub room_size: WorldPos,
    pub min_distance_for_shop: u32,
    pub min_distance_for_special_event: u32,
    /// 0 picks a runtime seed.
    pub seed: u64,
    pub room: RoomConfig,
    pub door: DoorConfig,
    pub special_door: SpecialDoorConfig,
    pub level: LevelConfig,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            min_rooms: 5,
            max_rooms: 15,
            room_size: WorldPos::new(20.0, 11.0),
            min_distance_for_shop: 2,
            min_distance_for_special_event: 3,
            seed: 0,
            room: RoomConfig::default(),
            door: DoorConfig::default(),
            special_door: SpecialDoorConfig::default(),
            level: LevelConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub min_enemies: usize,
    pub max_enemies: usize,
    pub spawn_delay_ticks: u64,
    /// Distance from the room edge to each door anchor.
    pub door_inset: f32,
    pub enemy_templates: Vec<EnemyTemplateId>,
    /// Offsets from the room center.
    pub spawn_points: Vec<WorldPos>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_enemies: 2,
            max_enemies: 5,
            spawn_delay_ticks: TICKS_PER_SECOND / 2,
            door_inset: 1.0,
            enemy_templates: vec![EnemyTemplateId(0), EnemyTemplateId(1)],
            spawn_points: vec![
                WorldPos::new(-5.0, 2.5),
                WorldPos::new(5.0, 2.5),
                WorldPos::new(-5.0, -2.5),
                WorldPos::new(5.0, -2.5),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub transition_ticks: u64,
    /// Applied at the arrival door, mirrored per entry side.
    pub player_offset: WorldPos,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self { transition_ticks: TICKS_PER_SECOND / 2, player_offset: WorldPos::new(0.0, 1.5) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialDoorConfig {
    pub poll_interval_ticks: u64,
    pub unlock_delay_ticks: u64,
}

impl Default for SpecialDoorConfig {
    fn default() -> Self {
        Self { poll_interval_ticks: TICKS_PER_SECOND, unlock_delay_ticks: TICKS_PER_SECOND }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub next_level_delay_ticks: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self { next_level_delay_ticks: TICKS_PER_SECOND }
    }
}

impl DungeonConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rooms == 0 {
            return Err(ConfigError::ZeroMinRooms);
        }
        if self.min_rooms > self.max_rooms {
            return Err(ConfigError::RoomRange { min: self.min_rooms, max: self.max_rooms });
        }
        if !(self.room_size.x > 0.0 && self.room_size.y > 0.0) {
            return Err(ConfigError::RoomSize { x: self.room_size.x, y: self.room_size.y });
        }
        let room = &self.room;
        if room.min_enemies > room.max_enemies {
            return Err(ConfigError::EnemyRange { min: room.min_enemies, max: room.max_enemies });
        }
        if room.max_enemies > 0 {
            if room.enemy_templates.is_empty() {
                return Err(ConfigError::MissingEnemyTemplates);
            }
            if room.spawn_points.is_empty() {
                return Err(ConfigError::MissingSpawnPoints);
            }
        }
        Ok(())
    }
}
