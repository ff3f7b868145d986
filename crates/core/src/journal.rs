//! In-memory record of a play session: the run seed, the config it ran with
//! and every host input in order. Replaying it reproduces the session.

use serde::{Deserialize, Serialize};

use crate::config::DungeonConfig;
use crate::types::{Direction, EnemyHandle, GridPos};

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionInput {
    Advance { frames: u32 },
    TouchDoor { room: GridPos, direction: Direction },
    TouchSpecialDoor,
    DefeatEnemy { enemy: EnemyHandle },
    DefeatAllInRoom { room: GridPos },
    PlayerDied,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    /// Dungeon clock when the input was applied.
    pub tick: u64,
    pub input: SessionInput,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub seed: u64,
    pub config: DungeonConfig,
    pub inputs: Vec<InputRecord>,
}

impl InputJournal {
    pub fn new(seed: u64, config: DungeonConfig) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            seed,
            config,
            inputs: Vec::new(),
        }
    }

    pub fn append(&mut self, tick: u64, input: SessionInput) {
        let seq = self.inputs.len() as u64;
        self.inputs.push(InputRecord { seq, tick, input });
    }
}
